//! Process-local `AllocationStore` for development runs and tests.
//!
//! A single async mutex guards catalogue and ledger together, so every port
//! call observes and mutates one consistent state. Claims evaluate the same
//! eligibility rules as the PostgreSQL adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::eligibility::{ClaimSnapshot, evaluate_claim, is_expired};
use crate::domain::ports::{
    AllocationStore, AllocationStoreError, ClaimOutcome, ClaimRequest, ReclaimReport,
    ReleaseOutcome,
};
use crate::domain::{CustomDomain, CustomDomainId, DomainAssignment, Holding, UserId};

#[derive(Debug, Default)]
struct Ledger {
    domains: HashMap<CustomDomainId, CustomDomain>,
    assignments: HashMap<(UserId, CustomDomainId), DomainAssignment>,
}

impl Ledger {
    fn held_by(&self, user_id: &UserId) -> impl Iterator<Item = &DomainAssignment> {
        let user_id = *user_id;
        self.assignments
            .values()
            .filter(move |assignment| assignment.user_id == user_id)
    }
}

/// In-memory implementation of the `AllocationStore` port.
#[derive(Debug, Default)]
pub struct InMemoryAllocationStore {
    state: Mutex<Ledger>,
}

impl InMemoryAllocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger rows for `domain_id`, for invariant checks.
    pub async fn ledger_count(&self, domain_id: &CustomDomainId) -> u32 {
        let state = self.state.lock().await;
        let rows = state
            .assignments
            .keys()
            .filter(|(_, held)| held == domain_id)
            .count();
        u32::try_from(rows).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl AllocationStore for InMemoryAllocationStore {
    async fn insert_domain(&self, domain: &CustomDomain) -> Result<(), AllocationStoreError> {
        let mut state = self.state.lock().await;
        let taken = state.domains.contains_key(&domain.id)
            || state
                .domains
                .values()
                .any(|existing| existing.name == domain.name);
        if taken {
            return Err(AllocationStoreError::duplicate_domain(
                domain.name.to_string(),
            ));
        }
        state.domains.insert(domain.id, domain.clone());
        Ok(())
    }

    async fn find_domain(
        &self,
        domain_id: &CustomDomainId,
    ) -> Result<Option<CustomDomain>, AllocationStoreError> {
        Ok(self.state.lock().await.domains.get(domain_id).cloned())
    }

    async fn list_domains(&self) -> Result<Vec<CustomDomain>, AllocationStoreError> {
        let state = self.state.lock().await;
        let mut domains: Vec<CustomDomain> = state.domains.values().cloned().collect();
        domains.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
        Ok(domains)
    }

    async fn list_holdings(&self, user_id: &UserId) -> Result<Vec<Holding>, AllocationStoreError> {
        let state = self.state.lock().await;
        let mut holdings = Vec::new();
        for assignment in state.held_by(user_id) {
            let domain = state.domains.get(&assignment.domain_id).ok_or_else(|| {
                AllocationStoreError::query(format!(
                    "assignment {} references missing domain {}",
                    assignment.id, assignment.domain_id
                ))
            })?;
            holdings.push(Holding {
                assignment: assignment.clone(),
                domain: domain.clone(),
            });
        }
        holdings.sort_by_key(|holding| holding.assignment.assigned_at);
        Ok(holdings)
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome, AllocationStoreError> {
        let mut state = self.state.lock().await;
        let Some(domain) = state.domains.get(&request.domain_id) else {
            return Ok(ClaimOutcome::DomainNotFound);
        };

        let held = u32::try_from(state.held_by(&request.user_id).count()).unwrap_or(u32::MAX);
        let snapshot = ClaimSnapshot {
            domain,
            member: request.member,
            held,
            holds_domain: state
                .assignments
                .contains_key(&(request.user_id, request.domain_id)),
            now: request.now,
        };
        if let Err(denial) = evaluate_claim(&snapshot) {
            return Ok(ClaimOutcome::Denied(denial));
        }

        let assignment = DomainAssignment::new(request.user_id, request.domain_id, request.now);
        if let Some(domain) = state.domains.get_mut(&request.domain_id) {
            domain.current_usage += 1;
            domain.updated_at = request.now;
        }
        state
            .assignments
            .insert((request.user_id, request.domain_id), assignment.clone());
        Ok(ClaimOutcome::Assigned(assignment))
    }

    async fn release(
        &self,
        user_id: &UserId,
        domain_id: &CustomDomainId,
    ) -> Result<ReleaseOutcome, AllocationStoreError> {
        let mut state = self.state.lock().await;
        if state.assignments.remove(&(*user_id, *domain_id)).is_none() {
            return Ok(ReleaseOutcome::NotHeld);
        }

        let counter_clamped = match state.domains.get_mut(domain_id) {
            Some(domain) if domain.current_usage > 0 => {
                domain.current_usage -= 1;
                false
            }
            _ => true,
        };
        Ok(ReleaseOutcome::Released { counter_clamped })
    }

    async fn reclaim_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ReclaimReport, AllocationStoreError> {
        let mut state = self.state.lock().await;
        let Ledger {
            domains,
            assignments,
        } = &mut *state;

        let mut report = ReclaimReport::default();
        for domain in domains.values_mut().filter(|domain| is_expired(domain, now)) {
            let before = assignments.len();
            assignments.retain(|(_, held), _| *held != domain.id);
            let removed = u32::try_from(before - assignments.len()).unwrap_or(u32::MAX);
            if removed > 0 {
                report.domains += 1;
                report.assignments += removed;
            }
            domain.current_usage = 0;
        }
        Ok(report)
    }
}
