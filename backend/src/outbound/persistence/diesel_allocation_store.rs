//! PostgreSQL-backed `AllocationStore` implementation using Diesel ORM.
//!
//! # Locking
//!
//! Claims and releases run in one transaction each and take locks in a fixed
//! order:
//!
//! 1. a transaction-scoped advisory lock keyed on the member, which
//!    serialises that member's quota check against their other claims;
//! 2. `SELECT ... FOR UPDATE` on the catalogue row, which serialises the
//!    capacity check against every other member.
//!
//! Reclaim passes lock only catalogue rows, so the order cannot cycle.
//! Serialisation failures, deadlocks and duplicate ledger inserts surface as
//! [`AllocationStoreError::Conflict`] for the service to retry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::eligibility::{ClaimSnapshot, evaluate_claim, is_expired};
use crate::domain::ports::{
    AllocationStore, AllocationStoreError, ClaimOutcome, ClaimRequest, ReclaimReport,
    ReleaseOutcome,
};
use crate::domain::{CustomDomain, CustomDomainId, DomainAssignment, Holding, UserId};

use super::diesel_basic_error_mapping::map_basic_pool_error;
use super::models::{
    CustomDomainRow, DomainAssignmentRow, NewCustomDomainRow, NewDomainAssignmentRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{custom_domains, domain_assignments};

const LOCK_MEMBER_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))";

/// Diesel-backed implementation of the `AllocationStore` port.
#[derive(Clone)]
pub struct DieselAllocationStore {
    pool: DbPool,
}

impl DieselAllocationStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction body: either Diesel or an already-mapped
/// domain error such as a corrupt row.
#[derive(Debug)]
enum TxnError {
    Diesel(diesel::result::Error),
    Store(AllocationStoreError),
}

impl From<diesel::result::Error> for TxnError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<AllocationStoreError> for TxnError {
    fn from(value: AllocationStoreError) -> Self {
        Self::Store(value)
    }
}

fn map_txn_error(error: TxnError) -> AllocationStoreError {
    match error {
        TxnError::Diesel(err) => map_diesel_error(err),
        TxnError::Store(err) => err,
    }
}

fn map_pool_error(error: PoolError) -> AllocationStoreError {
    map_basic_pool_error(error, AllocationStoreError::connection)
}

/// Map Diesel errors to allocation store errors.
fn map_diesel_error(error: diesel::result::Error) -> AllocationStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => AllocationStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => AllocationStoreError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::SerializationFailure => {
                AllocationStoreError::conflict("serialization failure")
            }
            DatabaseErrorKind::UniqueViolation => {
                AllocationStoreError::conflict("concurrent claim detected")
            }
            DatabaseErrorKind::CheckViolation => {
                AllocationStoreError::conflict("usage counter constraint violated")
            }
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                AllocationStoreError::connection("database connection error")
            }
            _ if info.message().contains("deadlock detected") => {
                AllocationStoreError::conflict("deadlock detected")
            }
            _ => AllocationStoreError::query("database error"),
        },
        _ => AllocationStoreError::query("database error"),
    }
}

/// Catalogue inserts report a taken name rather than a retryable conflict.
fn map_insert_domain_error(error: diesel::result::Error, name: &str) -> AllocationStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AllocationStoreError::duplicate_domain(name.to_owned())
        }
        other => map_diesel_error(other),
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

async fn lock_member(conn: &mut AsyncPgConnection, user_id: Uuid) -> QueryResult<()> {
    sql_query(LOCK_MEMBER_SQL)
        .bind::<SqlUuid, _>(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn lock_domain(
    conn: &mut AsyncPgConnection,
    domain_id: Uuid,
) -> QueryResult<Option<CustomDomainRow>> {
    custom_domains::table
        .find(domain_id)
        .select(CustomDomainRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

async fn claim_in_txn(
    conn: &mut AsyncPgConnection,
    request: ClaimRequest,
) -> Result<ClaimOutcome, TxnError> {
    let user = *request.user_id.as_uuid();
    let domain_uuid = *request.domain_id.as_uuid();

    lock_member(conn, user).await?;
    let Some(row) = lock_domain(conn, domain_uuid).await? else {
        return Ok(ClaimOutcome::DomainNotFound);
    };
    let domain = CustomDomain::try_from(row)?;

    let held: Vec<Uuid> = domain_assignments::table
        .filter(domain_assignments::user_id.eq(user))
        .select(domain_assignments::domain_id)
        .load(conn)
        .await?;

    let snapshot = ClaimSnapshot {
        domain: &domain,
        member: request.member,
        held: count(held.len()),
        holds_domain: held.contains(&domain_uuid),
        now: request.now,
    };
    if let Err(denial) = evaluate_claim(&snapshot) {
        return Ok(ClaimOutcome::Denied(denial));
    }

    let updated = diesel::update(custom_domains::table.find(domain_uuid))
        .filter(
            custom_domains::max_usage
                .eq(0)
                .or(custom_domains::current_usage.lt(custom_domains::max_usage)),
        )
        .set(custom_domains::current_usage.eq(custom_domains::current_usage + 1))
        .execute(conn)
        .await?;
    if updated == 0 {
        return Err(AllocationStoreError::conflict("capacity changed during claim").into());
    }

    let assignment = DomainAssignment::new(request.user_id, request.domain_id, request.now);
    diesel::insert_into(domain_assignments::table)
        .values(NewDomainAssignmentRow::from(&assignment))
        .execute(conn)
        .await?;

    Ok(ClaimOutcome::Assigned(assignment))
}

async fn release_in_txn(
    conn: &mut AsyncPgConnection,
    user: Uuid,
    domain_uuid: Uuid,
) -> Result<ReleaseOutcome, TxnError> {
    lock_member(conn, user).await?;
    if lock_domain(conn, domain_uuid).await?.is_none() {
        return Ok(ReleaseOutcome::NotHeld);
    }

    let deleted = diesel::delete(
        domain_assignments::table
            .filter(domain_assignments::user_id.eq(user))
            .filter(domain_assignments::domain_id.eq(domain_uuid)),
    )
    .execute(conn)
    .await?;
    if deleted == 0 {
        return Ok(ReleaseOutcome::NotHeld);
    }

    let decremented = diesel::update(custom_domains::table.find(domain_uuid))
        .filter(custom_domains::current_usage.gt(0))
        .set(custom_domains::current_usage.eq(custom_domains::current_usage - 1))
        .execute(conn)
        .await?;

    Ok(ReleaseOutcome::Released {
        counter_clamped: decremented == 0,
    })
}

/// Drop every holding on one expired domain. Returns the number removed.
async fn reclaim_domain_in_txn(
    conn: &mut AsyncPgConnection,
    domain_uuid: Uuid,
    now: DateTime<Utc>,
) -> Result<u32, TxnError> {
    let Some(row) = lock_domain(conn, domain_uuid).await? else {
        return Ok(0);
    };
    let domain = CustomDomain::try_from(row)?;
    if !is_expired(&domain, now) {
        return Ok(0);
    }

    let removed = diesel::delete(
        domain_assignments::table.filter(domain_assignments::domain_id.eq(domain_uuid)),
    )
    .execute(conn)
    .await?;
    diesel::update(custom_domains::table.find(domain_uuid))
        .set(custom_domains::current_usage.eq(0))
        .execute(conn)
        .await?;

    if count(removed) != domain.current_usage {
        warn!(
            domain_id = %domain.id,
            counter = domain.current_usage,
            removed,
            "usage counter disagreed with ledger during reclaim"
        );
    }
    Ok(count(removed))
}

#[async_trait]
impl AllocationStore for DieselAllocationStore {
    async fn insert_domain(&self, domain: &CustomDomain) -> Result<(), AllocationStoreError> {
        let row = NewCustomDomainRow::from_domain(domain)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(custom_domains::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_insert_domain_error(err, domain.name.as_ref()))?;
        Ok(())
    }

    async fn find_domain(
        &self,
        domain_id: &CustomDomainId,
    ) -> Result<Option<CustomDomain>, AllocationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomDomainRow> = custom_domains::table
            .find(domain_id.as_uuid())
            .select(CustomDomainRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_domains(&self) -> Result<Vec<CustomDomain>, AllocationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CustomDomainRow> = custom_domains::table
            .select(CustomDomainRow::as_select())
            .order_by(custom_domains::name)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_holdings(&self, user_id: &UserId) -> Result<Vec<Holding>, AllocationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(DomainAssignmentRow, CustomDomainRow)> = domain_assignments::table
            .inner_join(custom_domains::table)
            .filter(domain_assignments::user_id.eq(user_id.as_uuid()))
            .order_by(domain_assignments::assigned_at)
            .select((
                DomainAssignmentRow::as_select(),
                CustomDomainRow::as_select(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(assignment, domain)| -> Result<Holding, AllocationStoreError> {
                Ok(Holding {
                    assignment: assignment.into(),
                    domain: domain.try_into()?,
                })
            })
            .collect()
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<ClaimOutcome, AllocationStoreError> {
        let request = *request;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { claim_in_txn(conn, request).await }.scope_boxed())
            .await
            .map_err(map_txn_error)
    }

    async fn release(
        &self,
        user_id: &UserId,
        domain_id: &CustomDomainId,
    ) -> Result<ReleaseOutcome, AllocationStoreError> {
        let (user, domain_uuid) = (*user_id.as_uuid(), *domain_id.as_uuid());
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move { release_in_txn(conn, user, domain_uuid).await }.scope_boxed()
        })
        .await
        .map_err(map_txn_error)
    }

    async fn reclaim_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ReclaimReport, AllocationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let candidates: Vec<Uuid> = domain_assignments::table
            .inner_join(custom_domains::table)
            .filter(custom_domains::expires_at.le(now))
            .select(domain_assignments::domain_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut report = ReclaimReport::default();
        for domain_uuid in candidates {
            let removed = conn
                .transaction(|conn| {
                    async move { reclaim_domain_in_txn(conn, domain_uuid, now).await }
                        .scope_boxed()
                })
                .await
                .map_err(map_txn_error)?;
            if removed > 0 {
                report.domains += 1;
                report.assignments += removed;
            }
        }
        Ok(report)
    }
}
