//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the allocation store and member directory
//! ports backed by PostgreSQL through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: implementations translate between Diesel rows and
//!   domain types. Eligibility is evaluated with the domain's own rules
//!   against rows locked inside the transaction.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database failures map onto port errors, with
//!   lock contention reported as retryable conflicts.
//!
//! # Example
//!
//! ```ignore
//! use domain_allocation::outbound::persistence::{DbPool, DieselAllocationStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/domains")).await?;
//! let store = DieselAllocationStore::new(pool);
//! ```

mod diesel_allocation_store;
mod diesel_basic_error_mapping;
mod diesel_member_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_allocation_store::DieselAllocationStore;
pub use diesel_member_directory::DieselMemberDirectory;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
