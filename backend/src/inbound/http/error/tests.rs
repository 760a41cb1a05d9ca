//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("admins only"), StatusCode::FORBIDDEN)]
#[case(Error::premium_required("Premium subscription required"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::expired("Domain has expired"), StatusCode::CONFLICT)]
#[case(Error::at_capacity("At capacity"), StatusCode::CONFLICT)]
#[case(Error::quota_exceeded("Limit reached"), StatusCode::CONFLICT)]
#[case(Error::already_assigned("held"), StatusCode::CONFLICT)]
#[case(Error::already_exists("taken"), StatusCode::CONFLICT)]
#[case(Error::conflict("retry"), StatusCode::CONFLICT)]
#[case(Error::storage_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_payload(error: Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let (status, header, payload) = response_payload(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn storage_outages_hide_adapter_detail(expected_trace_id: String) {
    let error = Error::storage_unavailable("allocation store unavailable: password auth failed")
        .with_trace_id(expected_trace_id);

    let (status, header, payload) = response_payload(error).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.code(), ErrorCode::StorageUnavailable);
    assert_eq!(payload.message(), "Domain storage is temporarily unavailable");
}

#[rstest]
#[actix_web::test]
async fn client_errors_pass_through_with_details(expected_trace_id: String) {
    let error = Error::quota_exceeded("Limit reached")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"quota": 1}));

    let (status, header, payload) = response_payload(error.clone()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload, error);
}

#[rstest]
#[actix_web::test]
async fn trace_header_is_omitted_without_trace_id() {
    let (_, header, payload) = response_payload(Error::not_found("Domain not found")).await;
    assert!(header.is_none());
    assert_eq!(payload.code(), ErrorCode::NotFound);
}

#[rstest]
fn actix_errors_become_internal() {
    let actix_error = actix_web::error::ErrorBadGateway("upstream");
    let error = Error::from(actix_error);
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}
