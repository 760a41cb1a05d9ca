//! Concurrency checks for the allocation service over the in-memory store.
//!
//! Claims race on a multi-threaded runtime; afterwards each domain's counter
//! must agree with its ledger rows and never exceed capacity.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use domain_allocation::domain::ports::{
    AllocationStore, CatalogueActor, DomainAllocationCommand, DomainCatalogueAdmin,
};
use domain_allocation::domain::{
    CustomDomain, DomainAllocationService, DomainName, ErrorCode, ExpiredAssignmentPolicy,
    ExpirySweeper, NewCustomDomain, UserId,
};
use domain_allocation::outbound::memory::{InMemoryAllocationStore, InMemoryMemberDirectory};
use domain_allocation::test_support::MutableClock;

type Service = DomainAllocationService<InMemoryAllocationStore, InMemoryMemberDirectory>;

struct Fixture {
    store: Arc<InMemoryAllocationStore>,
    members: Arc<InMemoryMemberDirectory>,
    clock: Arc<MutableClock>,
    service: Arc<Service>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
        .single()
        .expect("valid time")
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryAllocationStore::new());
    let members = Arc::new(InMemoryMemberDirectory::new());
    let clock = Arc::new(MutableClock::new(start()));
    let service = Arc::new(DomainAllocationService::new(
        store.clone(),
        members.clone(),
        clock.clone(),
    ));
    Fixture {
        store,
        members,
        clock,
        service,
    }
}

impl Fixture {
    async fn create(&self, name: &str, max_usage: u32, days: i64) -> CustomDomain {
        self.service
            .create_domain(
                CatalogueActor::Operator,
                NewCustomDomain {
                    id: None,
                    name: DomainName::new(name).expect("valid name"),
                    only_premium: false,
                    max_usage,
                    expires_at: start() + TimeDelta::days(days),
                },
            )
            .await
            .expect("create domain")
    }

    async fn usage(&self, domain: &CustomDomain) -> u32 {
        self.store
            .find_domain(&domain.id)
            .await
            .expect("find domain")
            .expect("domain exists")
            .current_usage
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_claims_never_exceed_capacity() {
    let fx = fixture();
    let domain = fx.create("race.example", 3, 60).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = fx.service.clone();
            let domain_id = domain.id;
            tokio::spawn(async move { service.assign(&UserId::random(), &domain_id).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => winners += 1,
            Err(err) => assert_eq!(err.code(), ErrorCode::AtCapacity),
        }
    }

    assert_eq!(winners, 3);
    assert_eq!(fx.usage(&domain).await, 3);
    assert_eq!(fx.store.ledger_count(&domain.id).await, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn quota_holds_across_simultaneous_claims_by_one_member() {
    let fx = fixture();
    let user = UserId::random();
    fx.members.set_premium(user, true).await;

    let mut domains = Vec::new();
    for index in 0..6 {
        domains.push(fx.create(&format!("q{index}.example"), 0, 60).await);
    }

    let handles: Vec<_> = domains
        .iter()
        .map(|domain| {
            let service = fx.service.clone();
            let domain_id = domain.id;
            tokio::spawn(async move { service.assign(&user, &domain_id).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => granted += 1,
            Err(err) => assert_eq!(err.code(), ErrorCode::QuotaExceeded),
        }
    }

    assert_eq!(granted, 2);
    let mut held = 0;
    for domain in &domains {
        let usage = fx.usage(domain).await;
        assert_eq!(usage, fx.store.ledger_count(&domain.id).await);
        held += usage;
    }
    assert_eq!(held, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_claims_record_a_single_holding() {
    let fx = fixture();
    let domain = fx.create("dup.example", 0, 60).await;
    let user = UserId::random();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = fx.service.clone();
            let domain_id = domain.id;
            tokio::spawn(async move { service.assign(&user, &domain_id).await })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => granted += 1,
            Err(err) => assert_eq!(err.code(), ErrorCode::AlreadyAssigned),
        }
    }

    assert_eq!(granted, 1);
    assert_eq!(fx.usage(&domain).await, 1);
    assert_eq!(fx.store.ledger_count(&domain.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counters_match_ledger_after_mixed_traffic() {
    let fx = fixture();
    let domain = fx.create("churn.example", 0, 60).await;
    let users: Vec<UserId> = (0..10).map(|_| UserId::random()).collect();

    for user in &users {
        fx.service
            .assign(user, &domain.id)
            .await
            .expect("initial claim");
    }

    // Even-indexed members release while a fresh cohort claims.
    let mut handles = Vec::new();
    for user in users.iter().step_by(2).copied() {
        let service = fx.service.clone();
        let domain_id = domain.id;
        handles.push(tokio::spawn(
            async move { service.remove(&user, &domain_id).await },
        ));
    }
    for _ in 0..4 {
        let service = fx.service.clone();
        let domain_id = domain.id;
        handles.push(tokio::spawn(async move {
            service
                .assign(&UserId::random(), &domain_id)
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("task completes")
            .expect("operation succeeds");
    }

    assert_eq!(fx.usage(&domain).await, 9);
    assert_eq!(fx.store.ledger_count(&domain.id).await, 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reclaiming_sweep_resets_expired_counters() {
    let fx = fixture();
    let short = fx.create("short.example", 0, 5).await;
    let long = fx.create("long.example", 0, 90).await;

    for _ in 0..3 {
        let user = UserId::random();
        fx.service.assign(&user, &short.id).await.expect("claim");
    }
    fx.service
        .assign(&UserId::random(), &long.id)
        .await
        .expect("claim long");

    fx.clock.advance(TimeDelta::days(6));
    let sweeper = ExpirySweeper::new(
        fx.store.clone(),
        fx.clock.clone(),
        ExpiredAssignmentPolicy::Reclaim,
    );
    let report = sweeper.run_once().await.expect("sweep");

    assert_eq!(report.expired_domains, 1);
    assert_eq!(report.held_on_expired, 3);
    assert_eq!(report.reclaimed.assignments, 3);
    assert_eq!(fx.usage(&short).await, 0);
    assert_eq!(fx.store.ledger_count(&short.id).await, 0);
    assert_eq!(fx.usage(&long).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn retaining_sweep_leaves_holdings_in_place() {
    let fx = fixture();
    let short = fx.create("kept.example", 0, 5).await;
    fx.service
        .assign(&UserId::random(), &short.id)
        .await
        .expect("claim");

    fx.clock.advance(TimeDelta::days(6));
    let sweeper = ExpirySweeper::new(
        fx.store.clone(),
        fx.clock.clone(),
        ExpiredAssignmentPolicy::Retain,
    );
    let report = sweeper.run_once().await.expect("sweep");

    assert_eq!(report.held_on_expired, 1);
    assert_eq!(report.reclaimed.assignments, 0);
    assert_eq!(fx.usage(&short).await, 1);
    assert_eq!(fx.store.ledger_count(&short.id).await, 1);
}
