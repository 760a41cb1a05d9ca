//! HTTP adapter mapping for domain errors.
//!
//! Keeps [`Error`] transport agnostic while giving Actix handlers one JSON
//! envelope and a stable status code per [`ErrorCode`].

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden | ErrorCode::PremiumRequired => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Expired
        | ErrorCode::AtCapacity
        | ErrorCode::QuotaExceeded
        | ErrorCode::AlreadyAssigned
        | ErrorCode::AlreadyExists
        | ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Replacement message for codes whose detail must not reach clients.
fn public_message(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::InternalError => Some("Internal server error"),
        ErrorCode::StorageUnavailable => Some("Domain storage is temporarily unavailable"),
        _ => None,
    }
}

fn redact(error: &Error) -> Error {
    let Some(message) = public_message(error.code()) else {
        return error.clone();
    };
    let redacted = Error::new(error.code(), message);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if public_message(self.code()).is_some() {
            error!(
                code = ?self.code(),
                message = self.message(),
                trace_id = ?self.trace_id(),
                "request failed on the server side"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests;
