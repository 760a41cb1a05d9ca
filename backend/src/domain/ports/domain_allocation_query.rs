//! Driving port for the member's domain listings.

use async_trait::async_trait;

use crate::domain::{AssignedDomainView, CustomDomain, Error, UserId};

/// Member-facing read models.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainAllocationQuery: Send + Sync {
    /// Domains the member could claim right now. Nothing is reserved.
    async fn list_available(&self, user_id: &UserId) -> Result<Vec<CustomDomain>, Error>;

    /// The member's holdings with expiry flags.
    async fn list_assigned(&self, user_id: &UserId) -> Result<Vec<AssignedDomainView>, Error>;
}
