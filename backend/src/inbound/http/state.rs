//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DomainAllocationCommand, DomainAllocationQuery, DomainCatalogueAdmin};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub allocation: Arc<dyn DomainAllocationCommand>,
    pub allocation_query: Arc<dyn DomainAllocationQuery>,
    pub catalogue_admin: Arc<dyn DomainCatalogueAdmin>,
}

impl HttpState {
    pub fn new(
        allocation: Arc<dyn DomainAllocationCommand>,
        allocation_query: Arc<dyn DomainAllocationQuery>,
        catalogue_admin: Arc<dyn DomainCatalogueAdmin>,
    ) -> Self {
        Self {
            allocation,
            allocation_query,
            catalogue_admin,
        }
    }

    /// Wire every port to one service instance.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use domain_allocation::domain::DomainAllocationService;
    /// use domain_allocation::inbound::http::state::HttpState;
    /// use domain_allocation::outbound::memory::{InMemoryAllocationStore, InMemoryMemberDirectory};
    /// use mockable::DefaultClock;
    ///
    /// let service = DomainAllocationService::new(
    ///     Arc::new(InMemoryAllocationStore::new()),
    ///     Arc::new(InMemoryMemberDirectory::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let _state = HttpState::from_service(Arc::new(service));
    /// ```
    pub fn from_service<T>(service: Arc<T>) -> Self
    where
        T: DomainAllocationCommand + DomainAllocationQuery + DomainCatalogueAdmin + 'static,
    {
        Self {
            allocation: service.clone(),
            allocation_query: service.clone(),
            catalogue_admin: service,
        }
    }
}
