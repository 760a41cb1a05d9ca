//! Request middleware.
//!
//! Purpose: attach request-lifecycle concerns, currently trace correlation,
//! ahead of the HTTP handlers.

pub mod trace;

pub use trace::Trace;
