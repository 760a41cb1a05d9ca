//! Builders wiring the allocation service onto the configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use domain_allocation::domain::ports::{AllocationStore, MemberDirectory};
use domain_allocation::domain::{DomainAllocationService, ExpirySweeper};
use domain_allocation::inbound::http::state::HttpState;
use domain_allocation::outbound::memory::{InMemoryAllocationStore, InMemoryMemberDirectory};
use domain_allocation::outbound::persistence::{DieselAllocationStore, DieselMemberDirectory};

use super::ServerConfig;

/// Handler state plus the background sweep, if one was scheduled.
pub(crate) struct WiredServices {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) sweeper: Option<JoinHandle<()>>,
}

/// Use PostgreSQL adapters when a pool is configured, otherwise in-memory
/// ones. Must run inside a Tokio runtime when a sweep is scheduled.
pub(crate) fn build_services(config: &ServerConfig) -> WiredServices {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => {
            if !config.seed_members.is_empty() {
                warn!(
                    seeded = config.seed_members.len(),
                    "member seeds ignored; entitlements come from the database"
                );
            }
            wire(
                Arc::new(DieselAllocationStore::new(pool.clone())),
                Arc::new(DieselMemberDirectory::new(pool.clone())),
                clock,
                config,
            )
        }
        None => {
            warn!("no database configured; allocations will not survive a restart");
            info!(
                seeded = config.seed_members.len(),
                "seeding in-memory member directory"
            );
            wire(
                Arc::new(InMemoryAllocationStore::new()),
                Arc::new(InMemoryMemberDirectory::seeded(
                    config.seed_members.iter().copied(),
                )),
                clock,
                config,
            )
        }
    }
}

fn wire<S, M>(
    store: Arc<S>,
    members: Arc<M>,
    clock: Arc<dyn Clock>,
    config: &ServerConfig,
) -> WiredServices
where
    S: AllocationStore + 'static,
    M: MemberDirectory + 'static,
{
    let service = DomainAllocationService::new(store.clone(), members, clock.clone())
        .with_retry_policy(config.retry);
    let sweeper = config.sweep.map(|schedule| {
        info!(
            period_secs = schedule.period.as_secs(),
            policy = ?schedule.policy,
            "scheduling expiry sweep"
        );
        Arc::new(ExpirySweeper::new(store, clock, schedule.policy)).spawn(schedule.period)
    });

    WiredServices {
        http_state: web::Data::new(HttpState::from_service(Arc::new(service))),
        sweeper,
    }
}
