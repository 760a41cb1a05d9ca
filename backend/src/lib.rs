//! Custom domain allocation backend.
//!
//! Members claim domains from a shared, capacity-limited pool. The crate is
//! laid out hexagonally: `domain` holds the rules and driving ports,
//! `inbound` adapts HTTP onto them and `outbound` provides PostgreSQL and
//! in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
