//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

/// Session middleware with a fresh key, a cookie named `session` and the
/// `Secure` flag off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Route that signs in the member named in the path.
///
/// Mount at `/test-login/{user_id}`.
pub async fn test_login(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let user_id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Sign `user_id` in through [`test_login`] and return the session cookie.
pub async fn login_and_get_cookie(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    user_id: &UserId,
) -> Cookie<'static> {
    let request = actix_web::test::TestRequest::get()
        .uri(&format!("/test-login/{user_id}"))
        .to_request();
    let response = actix_web::test::call_service(app, request).await;
    assert!(response.status().is_success(), "test login failed");
    session_cookie(&response)
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
