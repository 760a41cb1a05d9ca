//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed catalogue, ledger and member lookup
//!   using Diesel.
//! - **memory**: process-local equivalents for development and tests.
//!
//! Adapters translate between domain types and storage representations. The
//! eligibility rules they apply come from the domain layer.

pub mod memory;
pub mod persistence;
