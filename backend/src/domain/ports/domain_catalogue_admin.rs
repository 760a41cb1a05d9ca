//! Driving port for privileged catalogue maintenance.

use async_trait::async_trait;

use crate::domain::{CustomDomain, Error, NewCustomDomain, UserId};

/// Who is asking to change the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueActor {
    /// An authenticated member; must hold the admin entitlement.
    Member(UserId),
    /// A local operator tool with direct database access.
    Operator,
}

/// Catalogue administration. No eligibility rules apply here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainCatalogueAdmin: Send + Sync {
    /// Add a domain with a zero usage counter.
    ///
    /// Errors with `forbidden` for non-admin members and `already_exists`
    /// when the id or name is taken.
    async fn create_domain(
        &self,
        actor: CatalogueActor,
        domain: NewCustomDomain,
    ) -> Result<CustomDomain, Error>;
}
