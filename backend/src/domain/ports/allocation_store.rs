//! Port for the catalogue and assignment ledger.
//!
//! The store owns atomicity. `claim` and `release` must read, judge and write
//! inside one serialisable unit so the usage counter always equals the number
//! of ledger rows for a domain. Adapters evaluate eligibility with
//! [`evaluate_claim`](crate::domain::eligibility::evaluate_claim) against the
//! state they hold locked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::eligibility::ClaimDenial;
use crate::domain::{CustomDomain, CustomDomainId, DomainAssignment, Entitlements, Holding, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by allocation store adapters.
    pub enum AllocationStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "allocation store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "allocation store query failed: {message}",
        /// A concurrent writer won; the operation may be retried.
        Conflict { message: String } =>
            "allocation store write conflict: {message}",
        /// A catalogue entry with the same id or name exists.
        DuplicateDomain { message: String } =>
            "domain already exists: {message}",
    }
}

/// A member's request to claim one domain, judged at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    pub user_id: UserId,
    pub domain_id: CustomDomainId,
    pub member: Entitlements,
    pub now: DateTime<Utc>,
}

/// Result of a claim that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Ledger row inserted and usage counter incremented.
    Assigned(DomainAssignment),
    /// No catalogue entry has the requested id.
    DomainNotFound,
    /// Eligibility refused the claim; nothing was written.
    Denied(ClaimDenial),
}

/// Result of a release that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Ledger row removed and usage counter decremented.
    Released {
        /// The counter was already zero and stayed there.
        counter_clamped: bool,
    },
    /// The member did not hold the domain.
    NotHeld,
}

/// Totals from one reclaim pass over expired domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Expired domains that had at least one holder.
    pub domains: u32,
    /// Assignments removed across those domains.
    pub assignments: u32,
}

/// Durable catalogue plus ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Insert a new catalogue entry.
    ///
    /// Fails with [`AllocationStoreError::DuplicateDomain`] when the id or
    /// name is taken.
    async fn insert_domain(&self, domain: &CustomDomain) -> Result<(), AllocationStoreError>;

    /// Fetch one catalogue entry.
    async fn find_domain(
        &self,
        domain_id: &CustomDomainId,
    ) -> Result<Option<CustomDomain>, AllocationStoreError>;

    /// Read the whole catalogue in one snapshot.
    async fn list_domains(&self) -> Result<Vec<CustomDomain>, AllocationStoreError>;

    /// Read the member's assignments joined with their domains in one snapshot.
    async fn list_holdings(&self, user_id: &UserId) -> Result<Vec<Holding>, AllocationStoreError>;

    /// Atomically judge and, when admitted, record a claim.
    async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome, AllocationStoreError>;

    /// Atomically remove a holding and decrement the counter, clamped at zero.
    async fn release(
        &self,
        user_id: &UserId,
        domain_id: &CustomDomainId,
    ) -> Result<ReleaseOutcome, AllocationStoreError>;

    /// Remove every holding on domains expired at `now`, resetting their
    /// counters. Each domain is processed atomically.
    async fn reclaim_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ReclaimReport, AllocationStoreError>;
}
