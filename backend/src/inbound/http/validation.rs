//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure is an `invalid_request` error whose `details` name the
//! offending field and a machine-readable code.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{CustomDomainId, CustomDomainValidationError, DomainName, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidDomainName,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidDomainName => "invalid_domain_name",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
    )
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_domain_id(value: String, field: FieldName) -> Result<CustomDomainId, Error> {
    CustomDomainId::new(&value).map_err(|_| {
        let name = field.as_str();
        field_value_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            &value,
        )
    })
}

pub(crate) fn parse_domain_name(value: String, field: FieldName) -> Result<DomainName, Error> {
    DomainName::new(&value).map_err(|err: CustomDomainValidationError| {
        field_value_error(field, err.to_string(), ErrorCode::InvalidDomainName, &value)
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            field_value_error(
                field,
                format!("{name} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
                &value,
            )
        })
}

/// Accept counters that fit the storage column.
pub(crate) fn parse_usage_limit(value: i64, field: FieldName) -> Result<u32, Error> {
    u32::try_from(value)
        .ok()
        .filter(|limit| i32::try_from(*limit).is_ok())
        .ok_or_else(|| {
            let name = field.as_str();
            field_value_error(
                field,
                format!("{name} must be between 0 and {}", i32::MAX),
                ErrorCode::OutOfRange,
                &value.to_string(),
            )
        })
}
