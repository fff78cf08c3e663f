//! Route guard for the admin workspace.
//!
//! The guard resolves the session cookie before any protected handler runs:
//! nothing is rendered while resolution is pending, and every failure mode —
//! missing cookie, bad token, storage error, resolution timeout — redirects
//! to the login view. Redirect and render are mutually exclusive by
//! construction: the handler only executes once a `CurrentUser` exists.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use super::AppState;

pub const SESSION_COOKIE: &str = "mortar_session";
pub const LOGIN_PATH: &str = "/admin/login";

pub async fn require_staff(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let resolved = match token {
        None => None,
        Some(token) => {
            // A hung resolver must not block the guard forever; expiry
            // resolves to Anonymous, which lands on the login screen.
            match tokio::time::timeout(
                state.options.session_resolve_timeout,
                state.auth.resolve(&token),
            )
            .await
            {
                Ok(resolved) => resolved,
                Err(_) => {
                    warn!(
                        target = "mortar::http::guard",
                        "session resolution timed out; treating caller as anonymous"
                    );
                    None
                }
            }
        }
    };

    match resolved {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// Build the session cookie set at login.
pub fn session_cookie(token: String, ttl: std::time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(ttl.as_secs() as i64))
        .build()
}

/// Build the removal cookie used at logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Read the raw session token, if the request carries one.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
