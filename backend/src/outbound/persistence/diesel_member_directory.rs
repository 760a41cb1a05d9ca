//! PostgreSQL-backed `MemberDirectory` reading the `members` projection.
//!
//! Members without a row are standard members with no admin rights.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MemberDirectory, MemberDirectoryError};
use crate::domain::{Entitlements, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::MemberEntitlementsRow;
use super::pool::DbPool;
use super::schema::members;

/// Diesel-backed implementation of the `MemberDirectory` port.
#[derive(Clone)]
pub struct DieselMemberDirectory {
    pool: DbPool,
}

impl DieselMemberDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for DieselMemberDirectory {
    async fn entitlements(&self, user_id: &UserId) -> Result<Entitlements, MemberDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, MemberDirectoryError::connection))?;

        let row: Option<MemberEntitlementsRow> = members::table
            .find(user_id.as_uuid())
            .select(MemberEntitlementsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_basic_diesel_error(
                    err,
                    MemberDirectoryError::query,
                    MemberDirectoryError::connection,
                )
            })?;

        Ok(row.map(Entitlements::from).unwrap_or(Entitlements::STANDARD))
    }
}
