//! Periodic pass over expired catalogue entries.
//!
//! Expiry is a display flag by default: holdings on expired domains stay in
//! the ledger and the sweep only reports them. Under
//! [`ExpiredAssignmentPolicy::Reclaim`] the sweep asks the store to drop those
//! holdings and reset the counters, one domain per transaction.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::eligibility::{is_expired, is_expiring};
use crate::domain::ports::{AllocationStore, AllocationStoreError, ReclaimReport};
use crate::domain::{Error, TraceId};

/// What happens to holdings once their domain expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiredAssignmentPolicy {
    /// Keep holdings; listings flag them.
    #[default]
    Retain,
    /// Remove holdings and free the slots.
    Reclaim,
}

/// Unrecognised policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expired assignment policy '{0}'; expected retain|reclaim")]
pub struct ParsePolicyError(String);

impl FromStr for ExpiredAssignmentPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "reclaim" => Ok(Self::Reclaim),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

/// Summary of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Catalogue entries past their expiry instant.
    pub expired_domains: u32,
    /// Holdings counted against expired entries before any reclaim.
    pub held_on_expired: u32,
    /// Live entries inside the expiring window that still have holders.
    pub expiring_domains: u32,
    /// Holdings removed by this pass.
    pub reclaimed: ReclaimReport,
}

/// Runs sweep passes against an [`AllocationStore`].
pub struct ExpirySweeper<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    policy: ExpiredAssignmentPolicy,
}

impl<S> ExpirySweeper<S>
where
    S: AllocationStore + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: ExpiredAssignmentPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Execute one pass under a fresh trace identifier.
    pub async fn run_once(&self) -> Result<SweepReport, Error> {
        TraceId::scope(TraceId::generate(), self.sweep()).await
    }

    async fn sweep(&self) -> Result<SweepReport, Error> {
        let now = self.clock.utc();
        let catalogue = self.store.list_domains().await.map_err(map_store_error)?;

        let mut report = SweepReport::default();
        for domain in &catalogue {
            if is_expired(domain, now) {
                report.expired_domains += 1;
                report.held_on_expired =
                    report.held_on_expired.saturating_add(domain.current_usage);
            } else if is_expiring(domain, now) && domain.current_usage > 0 {
                report.expiring_domains += 1;
            }
        }

        // Counters can lag the ledger, so any expired domain triggers a reclaim.
        if self.policy == ExpiredAssignmentPolicy::Reclaim && report.expired_domains > 0 {
            report.reclaimed = self
                .store
                .reclaim_expired(now)
                .await
                .map_err(map_store_error)?;
        }

        info!(
            trace_id = ?TraceId::current().map(|id| id.to_string()),
            policy = ?self.policy,
            expired_domains = report.expired_domains,
            held_on_expired = report.held_on_expired,
            expiring_domains = report.expiring_domains,
            reclaimed_assignments = report.reclaimed.assignments,
            "expiry sweep complete"
        );
        Ok(report)
    }

    /// Run passes every `period` until the returned handle is aborted.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(error) = self.run_once().await {
                    warn!(%error, code = ?error.code(), "expiry sweep failed");
                }
            }
        })
    }
}

fn map_store_error(error: AllocationStoreError) -> Error {
    match error {
        AllocationStoreError::Connection { message } => {
            Error::storage_unavailable(format!("allocation store unavailable: {message}"))
        }
        AllocationStoreError::Conflict { message } => Error::conflict(message),
        other => Error::internal(other.to_string()),
    }
}
