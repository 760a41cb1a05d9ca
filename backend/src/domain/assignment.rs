//! Ledger rows recording which member holds which domain.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CustomDomain, CustomDomainId, UserId};

/// Assignment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Wrap a UUID loaded from trusted storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member's claim on one domain.
///
/// Created by assign and destroyed by remove; never mutated in place. At most
/// one row exists per `(user_id, domain_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAssignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub domain_id: CustomDomainId,
    pub assigned_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainAssignment {
    /// Build a fresh assignment stamped at `now`.
    pub fn new(user_id: UserId, domain_id: CustomDomainId, now: DateTime<Utc>) -> Self {
        Self {
            id: AssignmentId::random(),
            user_id,
            domain_id,
            assigned_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An assignment joined with the domain it references, read in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub assignment: DomainAssignment,
    pub domain: CustomDomain,
}
