//! Application settings loaded via OrthoConfig.
//!
//! Values come from `DOMAIN_ALLOC_*` environment variables, an optional
//! configuration file and command-line flags, in increasing precedence.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    Entitlements, ExpiredAssignmentPolicy, ParsePolicyError, RetryPolicy, UserId,
    UserValidationError,
};

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Runtime configuration for the allocation server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DOMAIN_ALLOC")]
pub struct AppSettings {
    /// PostgreSQL connection string. In-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// `retain` or `reclaim`; how the sweep treats claims on expired domains.
    pub expired_assignment_policy: Option<String>,
    /// Seconds between expiry sweeps. Zero disables the sweep.
    pub sweep_interval_secs: Option<u64>,
    /// Attempts made for a conflicting assign or remove before giving up.
    pub max_assign_attempts: Option<u32>,
    /// Comma-separated member ids granted admin rights when no database is
    /// configured.
    pub admin_ids: Option<String>,
    /// Comma-separated member ids granted premium when no database is
    /// configured.
    pub premium_ids: Option<String>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Permit a random session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`; on unless explicitly disabled.
    pub session_cookie_secure: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Whether session cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.session_cookie_secure.unwrap_or(true)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Parse the configured expiry policy, defaulting to retain.
    pub fn expired_assignment_policy(&self) -> Result<ExpiredAssignmentPolicy, ParsePolicyError> {
        self.expired_assignment_policy
            .as_deref()
            .map_or(Ok(ExpiredAssignmentPolicy::default()), str::parse)
    }

    /// Interval between sweeps, or `None` when sweeping is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.sweep_interval_secs.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Entitlements to seed the in-memory member directory with.
    ///
    /// A member listed in both settings is an admin with premium.
    pub fn seed_members(&self) -> Result<Vec<(UserId, Entitlements)>, UserValidationError> {
        let mut members: HashMap<UserId, Entitlements> = HashMap::new();
        for id in split_ids(self.admin_ids.as_deref()) {
            members.entry(UserId::new(id)?).or_default().is_admin = true;
        }
        for id in split_ids(self.premium_ids.as_deref()) {
            members.entry(UserId::new(id)?).or_default().has_premium = true;
        }
        Ok(members.into_iter().collect())
    }

    /// Retry budget derived from the default policy and any attempt override.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_assign_attempts.unwrap_or(defaults.max_attempts),
            ..defaults
        }
    }
}

fn split_ids(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
}
