//! Member-facing domain allocation handlers.
//!
//! ```text
//! GET  /api/v1/domains/available
//! GET  /api/v1/domains/assigned
//! POST /api/v1/domains/assign {"domainId":"..."}
//! POST /api/v1/domains/remove {"domainId":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CustomDomainId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AssignedDomainResponse, AssignmentResponse, CustomDomainResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_domain_id, require};

const DOMAIN_ID: FieldName = FieldName::new("domainId");

/// Body for claim and release requests.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainSelectionRequest {
    #[schema(example = "6c1f7a52-95f4-4d0b-9d5e-0fb1f0a6d8a1")]
    pub domain_id: Option<String>,
}

fn parse_selection(payload: DomainSelectionRequest) -> Result<CustomDomainId, Error> {
    parse_domain_id(require(payload.domain_id, DOMAIN_ID)?, DOMAIN_ID)
}

/// Domains the member could claim right now.
#[utoipa::path(
    get,
    path = "/api/v1/domains/available",
    description = "Live, premium-eligible domains with free capacity. Nothing is reserved.",
    responses(
        (status = 200, description = "Claimable domains", body = [CustomDomainResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["domains"],
    operation_id = "listAvailableDomains"
)]
#[get("/domains/available")]
pub async fn list_available(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CustomDomainResponse>>> {
    let user_id = session.require_user_id()?;
    let domains = state.allocation_query.list_available(&user_id).await?;
    Ok(web::Json(domains.into_iter().map(Into::into).collect()))
}

/// Domains the member holds.
#[utoipa::path(
    get,
    path = "/api/v1/domains/assigned",
    responses(
        (status = 200, description = "Held domains", body = [AssignedDomainResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["domains"],
    operation_id = "listAssignedDomains"
)]
#[get("/domains/assigned")]
pub async fn list_assigned(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AssignedDomainResponse>>> {
    let user_id = session.require_user_id()?;
    let views = state.allocation_query.list_assigned(&user_id).await?;
    Ok(web::Json(views.into_iter().map(Into::into).collect()))
}

/// Claim a domain.
#[utoipa::path(
    post,
    path = "/api/v1/domains/assign",
    request_body = DomainSelectionRequest,
    responses(
        (status = 201, description = "Domain assigned", body = AssignmentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Premium subscription required", body = Error),
        (status = 404, description = "Domain not found", body = Error),
        (
            status = 409,
            description = "Expired, at capacity, limit reached, already assigned or write conflict",
            body = Error
        ),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["domains"],
    operation_id = "assignDomain"
)]
#[post("/domains/assign")]
pub async fn assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DomainSelectionRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let domain_id = parse_selection(payload.into_inner())?;
    let assignment = state.allocation.assign(&user_id, &domain_id).await?;
    Ok(HttpResponse::Created().json(AssignmentResponse::from(assignment)))
}

/// Release a held domain.
#[utoipa::path(
    post,
    path = "/api/v1/domains/remove",
    request_body = DomainSelectionRequest,
    responses(
        (status = 204, description = "Domain released"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Assignment not found", body = Error),
        (status = 409, description = "Write conflict", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["domains"],
    operation_id = "removeDomain"
)]
#[post("/domains/remove")]
pub async fn remove(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DomainSelectionRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let domain_id = parse_selection(payload.into_inner())?;
    state.allocation.remove(&user_id, &domain_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "domains_tests.rs"]
mod tests;
