//! Driving port for claiming and releasing domains.

use async_trait::async_trait;

use crate::domain::{CustomDomainId, DomainAssignment, Error, UserId};

/// Member-facing mutations on the ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainAllocationCommand: Send + Sync {
    /// Claim `domain_id` for the member.
    ///
    /// Errors with `not_found`, `expired`, `premium_required`, `at_capacity`,
    /// `quota_exceeded` or `already_assigned` in that precedence, or with
    /// `conflict`/`storage_unavailable` when the store cannot complete.
    async fn assign(
        &self,
        user_id: &UserId,
        domain_id: &CustomDomainId,
    ) -> Result<DomainAssignment, Error>;

    /// Release the member's claim on `domain_id`.
    ///
    /// Errors with `not_found` when no such claim exists.
    async fn remove(&self, user_id: &UserId, domain_id: &CustomDomainId) -> Result<(), Error>;
}
