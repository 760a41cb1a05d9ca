//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! stored values so corrupt rows surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::AllocationStoreError;
use crate::domain::{
    AssignmentId, CustomDomain, CustomDomainId, DomainAssignment, DomainName, Entitlements, UserId,
};

use super::schema::{custom_domains, domain_assignments, members};

// ---------------------------------------------------------------------------
// Catalogue models
// ---------------------------------------------------------------------------

/// Row struct for reading from the custom_domains table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = custom_domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomDomainRow {
    pub id: Uuid,
    pub name: String,
    pub only_premium: bool,
    pub max_usage: i32,
    pub current_usage: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new catalogue entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = custom_domains)]
pub(crate) struct NewCustomDomainRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub only_premium: bool,
    pub max_usage: i32,
    pub current_usage: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn counter_from_column(value: i32, column: &str) -> Result<u32, AllocationStoreError> {
    u32::try_from(value)
        .map_err(|_| AllocationStoreError::query(format!("negative {column} in database: {value}")))
}

pub(crate) fn counter_to_column(value: u32, column: &str) -> Result<i32, AllocationStoreError> {
    i32::try_from(value)
        .map_err(|_| AllocationStoreError::query(format!("{column} out of range: {value}")))
}

impl TryFrom<CustomDomainRow> for CustomDomain {
    type Error = AllocationStoreError;

    fn try_from(row: CustomDomainRow) -> Result<Self, Self::Error> {
        let name = DomainName::new(&row.name).map_err(|err| {
            AllocationStoreError::query(format!("invalid domain name in database: {err}"))
        })?;
        Ok(Self {
            id: CustomDomainId::from_uuid(row.id),
            name,
            only_premium: row.only_premium,
            max_usage: counter_from_column(row.max_usage, "max_usage")?,
            current_usage: counter_from_column(row.current_usage, "current_usage")?,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> NewCustomDomainRow<'a> {
    pub(crate) fn from_domain(domain: &'a CustomDomain) -> Result<Self, AllocationStoreError> {
        Ok(Self {
            id: *domain.id.as_uuid(),
            name: domain.name.as_ref(),
            only_premium: domain.only_premium,
            max_usage: counter_to_column(domain.max_usage, "max_usage")?,
            current_usage: counter_to_column(domain.current_usage, "current_usage")?,
            expires_at: domain.expires_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Assignment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the domain_assignments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = domain_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DomainAssignmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new ledger rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = domain_assignments)]
pub(crate) struct NewDomainAssignmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DomainAssignmentRow> for DomainAssignment {
    fn from(row: DomainAssignmentRow) -> Self {
        Self {
            id: AssignmentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            domain_id: CustomDomainId::from_uuid(row.domain_id),
            assigned_at: row.assigned_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&DomainAssignment> for NewDomainAssignmentRow {
    fn from(assignment: &DomainAssignment) -> Self {
        Self {
            id: *assignment.id.as_uuid(),
            user_id: *assignment.user_id.as_uuid(),
            domain_id: *assignment.domain_id.as_uuid(),
            assigned_at: assignment.assigned_at,
            created_at: assignment.created_at,
            updated_at: assignment.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Member models
// ---------------------------------------------------------------------------

/// Entitlement columns of the members table.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberEntitlementsRow {
    pub has_premium: bool,
    pub is_admin: bool,
}

impl From<MemberEntitlementsRow> for Entitlements {
    fn from(row: MemberEntitlementsRow) -> Self {
        Self {
            has_premium: row.has_premium,
            is_admin: row.is_admin,
        }
    }
}
