//! Port for entitlement lookups owned by the membership system.

use async_trait::async_trait;

use crate::domain::{Entitlements, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by member directory adapters.
    pub enum MemberDirectoryError {
        /// The directory could not be reached.
        Connection { message: String } =>
            "member directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "member directory query failed: {message}",
    }
}

/// Source of premium and admin facts for a member.
///
/// Unknown members resolve to [`Entitlements::STANDARD`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Look up the member's current entitlements.
    async fn entitlements(&self, user_id: &UserId) -> Result<Entitlements, MemberDirectoryError>;
}
