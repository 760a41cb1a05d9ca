//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint in the inbound layer along with
//! the response DTOs and the domain [`Error`](crate::domain::Error) envelope.
//! The document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump`.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::admin::CreateDomainRequest;
use crate::inbound::http::domains::DomainSelectionRequest;
use crate::inbound::http::schemas::{
    AssignedDomainResponse, AssignmentResponse, CustomDomainResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the upstream identity service.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Custom domain allocation API",
        description = "Claim, release and list custom domains from a shared, capacity-limited pool.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::domains::list_available,
        crate::inbound::http::domains::list_assigned,
        crate::inbound::http::domains::assign,
        crate::inbound::http::domains::remove,
        crate::inbound::http::admin::create_domain,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CustomDomainResponse,
        AssignmentResponse,
        AssignedDomainResponse,
        DomainSelectionRequest,
        CreateDomainRequest,
        Error,
        ErrorCode
    )),
    tags(
        (name = "domains", description = "Member-facing domain allocation"),
        (name = "admin", description = "Catalogue administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
