//! Domain primitives, policies and services.
//!
//! Purpose: model the shared pool of custom domains, the ledger of member
//! claims against it and the rules deciding who may claim what. Types here
//! are transport agnostic; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - `CustomDomain`, `DomainName`, `CustomDomainId`: catalogue entries.
//! - `DomainAssignment`, `Holding`: ledger rows and their joined view.
//! - `eligibility`: pure claim predicates evaluated in a fixed order.
//! - `views`: projections for the "available" and "assigned" listings.
//! - `DomainAllocationService`: implementation of the driving ports.
//! - `ExpirySweeper`: periodic pass over expired domains.
//! - `Error`, `ErrorCode`: transport-agnostic failure payload.

pub mod allocation_service;
pub mod assignment;
pub mod custom_domain;
pub mod eligibility;
pub mod error;
pub mod expiry_sweep;
pub mod ports;
pub mod retry;
pub mod trace_id;
pub mod user;
pub mod views;

pub use self::allocation_service::{DomainAllocationService, RetryRuntime};
pub use self::assignment::{AssignmentId, DomainAssignment, Holding};
pub use self::custom_domain::{
    CustomDomain, CustomDomainId, CustomDomainValidationError, DomainName, NewCustomDomain,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::expiry_sweep::{ExpiredAssignmentPolicy, ExpirySweeper, ParsePolicyError, SweepReport};
pub use self::retry::{BackoffJitter, RandomJitter, RetryPolicy, Sleeper, TokioSleeper};
pub use self::trace_id::TraceId;
pub use self::user::{Entitlements, UserId, UserValidationError};
pub use self::views::AssignedDomainView;
