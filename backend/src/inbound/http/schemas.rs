//! Response payloads shared by the domain and admin handlers.
//!
//! Domain types stay framework agnostic; these wrappers carry the camelCase
//! wire shape and the OpenAPI schema.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AssignedDomainView, CustomDomain, DomainAssignment};

/// Catalogue entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomainResponse {
    #[schema(example = "6c1f7a52-95f4-4d0b-9d5e-0fb1f0a6d8a1")]
    pub id: String,
    #[schema(example = "pages.example.com")]
    pub name: String,
    pub only_premium: bool,
    /// Zero means unlimited.
    pub max_usage: u32,
    pub current_usage: u32,
    #[schema(example = "2026-12-31T00:00:00+00:00")]
    pub expires_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CustomDomain> for CustomDomainResponse {
    fn from(value: CustomDomain) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            only_premium: value.only_premium,
            max_usage: value.max_usage,
            current_usage: value.current_usage,
            expires_at: value.expires_at.to_rfc3339(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Ledger row as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: String,
    pub user_id: String,
    pub domain_id: String,
    pub assigned_at: String,
}

impl From<DomainAssignment> for AssignmentResponse {
    fn from(value: DomainAssignment) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            domain_id: value.domain_id.to_string(),
            assigned_at: value.assigned_at.to_rfc3339(),
        }
    }
}

/// A member's holding with its domain and expiry flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedDomainResponse {
    pub assignment: AssignmentResponse,
    pub domain: CustomDomainResponse,
    /// True while the domain is live and expires within 14 days.
    pub is_expiring: bool,
}

impl From<AssignedDomainView> for AssignedDomainResponse {
    fn from(value: AssignedDomainView) -> Self {
        Self {
            assignment: value.assignment.into(),
            domain: value.domain.into(),
            is_expiring: value.is_expiring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CustomDomainId, DomainName, UserId};
    use chrono::{TimeDelta, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn assigned_view_serialises_camel_case() {
        let now = Utc
            .with_ymd_and_hms(2026, 2, 1, 0, 0, 0)
            .single()
            .expect("valid time");
        let domain = CustomDomain {
            id: CustomDomainId::random(),
            name: DomainName::new("soon.example").expect("valid name"),
            only_premium: false,
            max_usage: 0,
            current_usage: 1,
            expires_at: now + TimeDelta::days(3),
            created_at: now,
            updated_at: now,
        };
        let view = AssignedDomainView {
            assignment: DomainAssignment::new(UserId::random(), domain.id, now),
            domain,
            is_expiring: true,
        };

        let value =
            serde_json::to_value(AssignedDomainResponse::from(view)).expect("serialises");

        assert_eq!(value.get("isExpiring"), Some(&Value::Bool(true)));
        let domain = value.get("domain").expect("domain present");
        assert_eq!(domain.get("maxUsage"), Some(&Value::from(0)));
        assert_eq!(
            domain.get("onlyPremium").and_then(Value::as_bool),
            Some(false)
        );
        assert!(
            value
                .get("assignment")
                .and_then(|a| a.get("assignedAt"))
                .is_some()
        );
    }
}
