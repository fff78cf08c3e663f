use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    application::auth::AuthError,
    presentation::admin::views::AdminLoginTemplate,
    presentation::views::render_template_response,
};

use super::super::{AppState, flash, guard};
use super::forms::LoginForm;

pub async fn form() -> Response {
    render_template_response(
        AdminLoginTemplate {
            email: String::new(),
            error: None,
        },
        StatusCode::OK,
    )
}

pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.sign_in(&form.email, &form.password).await {
        Ok(signed) => {
            let cookie = guard::session_cookie(
                signed.token,
                state.options.session_ttl,
                state.options.cookie_secure,
            );
            let jar = flash::flash_success(
                jar.add(cookie),
                format!("Welcome back, {}", signed.account.name),
            );
            (jar, Redirect::to("/admin")).into_response()
        }
        Err(AuthError::InvalidCredentials) => render_template_response(
            AdminLoginTemplate {
                email: form.email,
                error: Some("Invalid email or password".to_string()),
            },
            StatusCode::UNAUTHORIZED,
        ),
        Err(err) => {
            tracing::error!(target = "mortar::http::login", error = %err, "sign-in failed");
            render_template_response(
                AdminLoginTemplate {
                    email: form.email,
                    error: Some("Sign-in is temporarily unavailable. Please try again.".to_string()),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}

/// Logout clears the cookie immediately; server-side revocation happens in
/// the background and never blocks the redirect.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = guard::session_token(&jar) {
        let auth = state.auth.clone();
        tokio::spawn(async move {
            auth.sign_out(&token).await;
        });
    }

    let jar = jar.remove(guard::clear_session_cookie());
    let jar = flash::flash_success(jar, "Logged out successfully");
    (jar, Redirect::to("/")).into_response()
}
