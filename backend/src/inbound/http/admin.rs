//! Catalogue administration handler.
//!
//! ```text
//! POST /api/v1/admin/domains
//!   {"name":"pages.example.com","onlyPremium":false,"maxUsage":50,"expiresAt":"2027-01-01T00:00:00Z"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CatalogueActor;
use crate::domain::{Error, NewCustomDomain};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::CustomDomainResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_domain_id, parse_domain_name, parse_rfc3339_timestamp, parse_usage_limit,
    require,
};

/// Body for `POST /api/v1/admin/domains`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainRequest {
    /// Optional caller-chosen identifier; generated when absent.
    pub id: Option<String>,
    #[schema(example = "pages.example.com")]
    pub name: Option<String>,
    /// Defaults to `false`.
    pub only_premium: Option<bool>,
    /// Zero means unlimited.
    #[schema(example = 50)]
    pub max_usage: Option<i64>,
    #[schema(example = "2027-01-01T00:00:00Z")]
    pub expires_at: Option<String>,
}

fn parse_create_request(payload: CreateDomainRequest) -> Result<NewCustomDomain, Error> {
    const ID: FieldName = FieldName::new("id");
    const NAME: FieldName = FieldName::new("name");
    const MAX_USAGE: FieldName = FieldName::new("maxUsage");
    const EXPIRES_AT: FieldName = FieldName::new("expiresAt");

    Ok(NewCustomDomain {
        id: payload.id.map(|raw| parse_domain_id(raw, ID)).transpose()?,
        name: parse_domain_name(require(payload.name, NAME)?, NAME)?,
        only_premium: payload.only_premium.unwrap_or(false),
        max_usage: parse_usage_limit(require(payload.max_usage, MAX_USAGE)?, MAX_USAGE)?,
        expires_at: parse_rfc3339_timestamp(require(payload.expires_at, EXPIRES_AT)?, EXPIRES_AT)?,
    })
}

/// Add a domain to the shared pool. Admin members only.
#[utoipa::path(
    post,
    path = "/api/v1/admin/domains",
    request_body = CreateDomainRequest,
    responses(
        (status = 201, description = "Domain created", body = CustomDomainResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin privileges required", body = Error),
        (status = 409, description = "Domain id or name already exists", body = Error),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createDomain"
)]
#[post("/admin/domains")]
pub async fn create_domain(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDomainRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let new_domain = parse_create_request(payload.into_inner())?;
    let created = state
        .catalogue_admin
        .create_domain(CatalogueActor::Member(user_id), new_domain)
        .await?;
    Ok(HttpResponse::Created().json(CustomDomainResponse::from(created)))
}
