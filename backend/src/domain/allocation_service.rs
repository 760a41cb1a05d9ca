//! Domain allocation use-cases.
//!
//! This module implements the driving ports for claiming, releasing and
//! listing domains plus catalogue administration. The store performs each
//! mutation atomically; this layer resolves entitlements, retries write
//! conflicts with jittered backoff and maps port failures onto [`Error`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AllocationStore, AllocationStoreError, CatalogueActor, ClaimOutcome, ClaimRequest,
    DomainAllocationCommand, DomainAllocationQuery, DomainCatalogueAdmin, MemberDirectory,
    MemberDirectoryError, ReleaseOutcome,
};
use crate::domain::retry::{BackoffJitter, RandomJitter, RetryPolicy, Sleeper, TokioSleeper};
use crate::domain::views::{project_assigned, project_available};
use crate::domain::{
    AssignedDomainView, CustomDomain, CustomDomainId, DomainAssignment, Entitlements, Error,
    NewCustomDomain, UserId,
};

/// Sleep and jitter strategies used between conflict retries.
#[derive(Clone)]
pub struct RetryRuntime {
    pub sleeper: Arc<dyn Sleeper>,
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for RetryRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }
}

/// Allocation service implementing the driving ports.
#[derive(Clone)]
pub struct DomainAllocationService<S, M> {
    store: Arc<S>,
    members: Arc<M>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    runtime: RetryRuntime,
}

impl<S, M> DomainAllocationService<S, M> {
    /// Create a service with the default retry policy and Tokio sleeper.
    pub fn new(store: Arc<S>, members: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            members,
            clock,
            retry: RetryPolicy::default(),
            runtime: RetryRuntime::default(),
        }
    }

    /// Replace the conflict retry budget.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the sleep and jitter strategies.
    #[must_use]
    pub fn with_retry_runtime(mut self, runtime: RetryRuntime) -> Self {
        self.runtime = runtime;
        self
    }
}

impl<S, M> DomainAllocationService<S, M>
where
    S: AllocationStore,
    M: MemberDirectory,
{
    fn map_store_error(error: AllocationStoreError) -> Error {
        match error {
            AllocationStoreError::Connection { message } => {
                Error::storage_unavailable(format!("allocation store unavailable: {message}"))
            }
            AllocationStoreError::Query { message } => {
                Error::internal(format!("allocation store error: {message}"))
            }
            AllocationStoreError::Conflict { .. } => {
                Error::conflict("Concurrent update, please retry")
            }
            AllocationStoreError::DuplicateDomain { message } => {
                Error::already_exists(format!("Domain already exists: {message}"))
            }
        }
    }

    fn map_member_error(error: MemberDirectoryError) -> Error {
        match error {
            MemberDirectoryError::Connection { message } => {
                Error::storage_unavailable(format!("member directory unavailable: {message}"))
            }
            MemberDirectoryError::Query { message } => {
                Error::internal(format!("member directory error: {message}"))
            }
        }
    }

    async fn entitlements(&self, user_id: &UserId) -> Result<Entitlements, Error> {
        self.members
            .entitlements(user_id)
            .await
            .map_err(Self::map_member_error)
    }

    /// Run `attempt_once` until it succeeds, fails with a non-conflict error
    /// or the retry budget is spent.
    async fn retry_conflicts<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt_once: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AllocationStoreError>>,
    {
        let attempts = self.retry.attempts();
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Ok(value) => return Ok(value),
                Err(AllocationStoreError::Conflict { message }) if attempt < attempts => {
                    let delay = self
                        .runtime
                        .jitter
                        .jittered_delay(self.retry.base_delay(attempt), attempt);
                    debug!(operation, attempt, %message, ?delay, "write conflict; retrying");
                    self.runtime.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    if matches!(error, AllocationStoreError::Conflict { .. }) {
                        warn!(operation, attempts, %error, "write conflict retries exhausted");
                    }
                    return Err(Self::map_store_error(error));
                }
            }
        }
    }
}

#[async_trait]
impl<S, M> DomainAllocationCommand for DomainAllocationService<S, M>
where
    S: AllocationStore,
    M: MemberDirectory,
{
    async fn assign(
        &self,
        user_id: &UserId,
        domain_id: &CustomDomainId,
    ) -> Result<DomainAssignment, Error> {
        let member = self.entitlements(user_id).await?;
        let store = self.store.as_ref();
        let clock = self.clock.as_ref();
        let (user_id, domain_id) = (*user_id, *domain_id);

        let outcome = self
            .retry_conflicts("assign", move || {
                let request = ClaimRequest {
                    user_id,
                    domain_id,
                    member,
                    now: clock.utc(),
                };
                async move { store.claim(&request).await }
            })
            .await?;

        match outcome {
            ClaimOutcome::Assigned(assignment) => {
                info!(
                    user_id = %assignment.user_id,
                    domain_id = %assignment.domain_id,
                    assignment_id = %assignment.id,
                    "domain assigned"
                );
                Ok(assignment)
            }
            ClaimOutcome::DomainNotFound => Err(Error::not_found("Domain not found")),
            ClaimOutcome::Denied(denial) => {
                debug!(%user_id, %domain_id, ?denial, "domain claim denied");
                Err(denial.into())
            }
        }
    }

    async fn remove(&self, user_id: &UserId, domain_id: &CustomDomainId) -> Result<(), Error> {
        let store = self.store.as_ref();
        let (user_id, domain_id) = (*user_id, *domain_id);

        let outcome = self
            .retry_conflicts("remove", move || async move {
                store.release(&user_id, &domain_id).await
            })
            .await?;

        match outcome {
            ReleaseOutcome::Released { counter_clamped } => {
                if counter_clamped {
                    warn!(%domain_id, "usage counter was already zero on release; clamped");
                }
                info!(%user_id, %domain_id, "domain released");
                Ok(())
            }
            ReleaseOutcome::NotHeld => Err(Error::not_found("Assignment not found")),
        }
    }
}

#[async_trait]
impl<S, M> DomainAllocationQuery for DomainAllocationService<S, M>
where
    S: AllocationStore,
    M: MemberDirectory,
{
    async fn list_available(&self, user_id: &UserId) -> Result<Vec<CustomDomain>, Error> {
        let member = self.entitlements(user_id).await?;
        let catalogue = self
            .store
            .list_domains()
            .await
            .map_err(Self::map_store_error)?;
        Ok(project_available(catalogue, member, self.clock.utc()))
    }

    async fn list_assigned(&self, user_id: &UserId) -> Result<Vec<AssignedDomainView>, Error> {
        let holdings = self
            .store
            .list_holdings(user_id)
            .await
            .map_err(Self::map_store_error)?;
        Ok(project_assigned(holdings, self.clock.utc()))
    }
}

#[async_trait]
impl<S, M> DomainCatalogueAdmin for DomainAllocationService<S, M>
where
    S: AllocationStore,
    M: MemberDirectory,
{
    async fn create_domain(
        &self,
        actor: CatalogueActor,
        domain: NewCustomDomain,
    ) -> Result<CustomDomain, Error> {
        if let CatalogueActor::Member(user_id) = actor {
            let member = self.entitlements(&user_id).await?;
            if !member.is_admin {
                return Err(Error::forbidden("Admin privileges required"));
            }
        }

        let domain = domain.into_domain(self.clock.utc());
        self.store
            .insert_domain(&domain)
            .await
            .map_err(Self::map_store_error)?;

        info!(
            domain_id = %domain.id,
            name = %domain.name,
            max_usage = domain.max_usage,
            only_premium = domain.only_premium,
            ?actor,
            "custom domain created"
        );
        Ok(domain)
    }
}

#[cfg(test)]
#[path = "allocation_service_tests.rs"]
mod tests;
