//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod allocation_store;
mod domain_allocation_command;
mod domain_allocation_query;
mod domain_catalogue_admin;
mod member_directory;

#[cfg(test)]
pub use allocation_store::MockAllocationStore;
pub use allocation_store::{
    AllocationStore, AllocationStoreError, ClaimOutcome, ClaimRequest, ReclaimReport,
    ReleaseOutcome,
};
#[cfg(test)]
pub use domain_allocation_command::MockDomainAllocationCommand;
pub use domain_allocation_command::DomainAllocationCommand;
#[cfg(test)]
pub use domain_allocation_query::MockDomainAllocationQuery;
pub use domain_allocation_query::DomainAllocationQuery;
#[cfg(test)]
pub use domain_catalogue_admin::MockDomainCatalogueAdmin;
pub use domain_catalogue_admin::{CatalogueActor, DomainCatalogueAdmin};
#[cfg(test)]
pub use member_directory::MockMemberDirectory;
pub use member_directory::{MemberDirectory, MemberDirectoryError};
