//! Catalogue entries: the shared pool of claimable domains.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a fully qualified DNS name.
pub const DOMAIN_NAME_MAX: usize = 253;
/// Maximum length of one DNS label.
pub const DOMAIN_LABEL_MAX: usize = 63;

/// Validation errors for catalogue input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomDomainValidationError {
    #[error("domain id must be a valid UUID")]
    InvalidId,
    #[error("domain name must not be empty")]
    EmptyName,
    #[error("domain name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("domain name needs at least two labels")]
    SingleLabel,
    #[error("domain label '{label}' is invalid")]
    InvalidLabel { label: String },
}

/// Immutable catalogue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomDomainId(Uuid);

impl CustomDomainId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, CustomDomainValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| CustomDomainValidationError::InvalidId)
    }

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

impl fmt::Display for CustomDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lower-cased DNS name such as `alice.example.dev`'s parent `example.dev`.
///
/// Labels hold 1 to 63 characters drawn from `[a-z0-9-]` and may not start or
/// end with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Validate and normalise a domain name.
    ///
    /// # Examples
    /// ```
    /// use domain_allocation::domain::DomainName;
    ///
    /// let name = DomainName::new("Pages.Example.DEV").expect("valid name");
    /// assert_eq!(name.as_ref(), "pages.example.dev");
    /// assert!(DomainName::new("localhost").is_err());
    /// assert!(DomainName::new("-bad.example").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CustomDomainValidationError> {
        let normalised = raw.as_ref().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(CustomDomainValidationError::EmptyName);
        }
        if normalised.len() > DOMAIN_NAME_MAX {
            return Err(CustomDomainValidationError::NameTooLong {
                max: DOMAIN_NAME_MAX,
            });
        }

        let labels: Vec<&str> = normalised.split('.').collect();
        if labels.len() < 2 {
            return Err(CustomDomainValidationError::SingleLabel);
        }
        if let Some(label) = labels.iter().find(|label| !is_valid_label(label)) {
            return Err(CustomDomainValidationError::InvalidLabel {
                label: (*label).to_owned(),
            });
        }

        Ok(Self(normalised))
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= DOMAIN_LABEL_MAX
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = CustomDomainValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A claimable domain together with its denormalised usage counter.
///
/// ## Invariants
/// - `current_usage` equals the number of assignments referencing the domain.
/// - `max_usage == 0` means unlimited; otherwise `current_usage <= max_usage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDomain {
    pub id: CustomDomainId,
    pub name: DomainName,
    pub only_premium: bool,
    pub max_usage: u32,
    pub current_usage: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomDomain {
    /// Whether the domain accepts any number of holders.
    pub fn is_unlimited(&self) -> bool {
        self.max_usage == 0
    }
}

/// Administrative request to add a catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomDomain {
    /// Caller-chosen identifier; generated when absent.
    pub id: Option<CustomDomainId>,
    pub name: DomainName,
    pub only_premium: bool,
    pub max_usage: u32,
    pub expires_at: DateTime<Utc>,
}

impl NewCustomDomain {
    /// Materialise the entry with a zero usage counter.
    pub fn into_domain(self, now: DateTime<Utc>) -> CustomDomain {
        CustomDomain {
            id: self.id.unwrap_or_else(CustomDomainId::random),
            name: self.name,
            only_premium: self.only_premium,
            max_usage: self.max_usage,
            current_usage: 0,
            expires_at: self.expires_at,
            created_at: now,
            updated_at: now,
        }
    }
}
