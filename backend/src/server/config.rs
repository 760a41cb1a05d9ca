//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use domain_allocation::domain::{Entitlements, ExpiredAssignmentPolicy, RetryPolicy, UserId};
use domain_allocation::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Cadence and behaviour of the background expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSchedule {
    pub period: Duration,
    pub policy: ExpiredAssignmentPolicy,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) retry: RetryPolicy,
    pub(crate) sweep: Option<SweepSchedule>,
    pub(crate) seed_members: Vec<(UserId, Entitlements)>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            retry: RetryPolicy::default(),
            sweep: None,
            seed_members: Vec::new(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Back the allocation ports with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the expiry sweep on the given schedule once the server starts.
    #[must_use]
    pub fn with_sweep(mut self, sweep: Option<SweepSchedule>) -> Self {
        self.sweep = sweep;
        self
    }

    /// Entitlements loaded into the in-memory member directory. Ignored when
    /// a database pool is configured.
    #[must_use]
    pub fn with_seed_members(mut self, members: Vec<(UserId, Entitlements)>) -> Self {
        self.seed_members = members;
        self
    }

    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
