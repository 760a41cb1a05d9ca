//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, SweepSchedule};

use state_builders::{WiredServices, build_services};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::task::JoinHandle;

use domain_allocation::Trace;
#[cfg(debug_assertions)]
use domain_allocation::doc::ApiDoc;
use domain_allocation::inbound::http::admin::create_domain;
use domain_allocation::inbound::http::domains::{assign, list_assigned, list_available, remove};
use domain_allocation::inbound::http::health::{HealthState, live, ready};
use domain_allocation::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(list_available)
        .service(list_assigned)
        .service(assign)
        .service(remove)
        .service(create_domain);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// A bound server plus the background sweep task driven alongside it.
pub struct RunningServer {
    pub server: Server,
    pub sweeper: Option<JoinHandle<()>>,
}

/// Bind the HTTP listener and start the expiry sweep.
///
/// Readiness flips once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let WiredServices {
        http_state,
        sweeper,
    } = build_services(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        key,
        cookie_secure,
        same_site,
    };

    #[cfg(feature = "metrics")]
    let server = match prometheus {
        Some(metrics) => HttpServer::new(move || build_app(deps.clone()).wrap(metrics.clone()))
            .bind(bind_addr)?
            .run(),
        None => HttpServer::new(move || build_app(deps.clone()))
            .bind(bind_addr)?
            .run(),
    };
    #[cfg(not(feature = "metrics"))]
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(RunningServer { server, sweeper })
}
