pub mod admin;
pub mod flash;
pub mod guard;
pub mod middleware;
pub mod public;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::application::{
    admin::{
        accounts::AdminAccountService, audit::AdminAuditService, bulk::BulkDeleteService,
        gallery::AdminGalleryService, realty::AdminRealtyService,
    },
    auth::AuthService,
    repos::{ContactRepo, GalleryRepo, RealtyRepo},
};
use crate::infra::{assets, media::MediaStorage};

/// Request-independent runtime options derived from [`crate::config::Settings`].
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub media_public_base: String,
    pub public_page_size: usize,
    pub admin_page_size: usize,
    pub session_ttl: Duration,
    pub session_resolve_timeout: Duration,
    pub cookie_secure: bool,
    pub upload_body_limit: usize,
}

pub(crate) fn query_string(pairs: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub gallery: AdminGalleryService,
    pub realty: AdminRealtyService,
    pub accounts: AdminAccountService,
    pub bulk: BulkDeleteService,
    pub audit: AdminAuditService,
    pub gallery_reader: Arc<dyn GalleryRepo>,
    pub realty_reader: Arc<dyn RealtyRepo>,
    pub contact: Arc<dyn ContactRepo>,
    pub media: Arc<MediaStorage>,
    pub options: Arc<RuntimeOptions>,
}

/// Assemble the complete router: public site, login flow, and the guarded
/// admin workspace.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/gallery/new", get(admin::gallery::new_form))
        .route("/admin/gallery/create", post(admin::gallery::create))
        .route(
            "/admin/gallery/{id}/edit",
            get(admin::gallery::edit_form).post(admin::gallery::update),
        )
        .route(
            "/admin/gallery/{id}/delete",
            get(admin::gallery::confirm_delete).post(admin::gallery::delete),
        )
        .route("/admin/realty/new", get(admin::realty::new_form))
        .route("/admin/realty/create", post(admin::realty::create))
        .route(
            "/admin/realty/{id}/edit",
            get(admin::realty::edit_form).post(admin::realty::update),
        )
        .route(
            "/admin/realty/{id}/delete",
            get(admin::realty::confirm_delete).post(admin::realty::delete),
        )
        .route("/admin/bulk-delete", post(admin::bulk::delete_selected))
        .route("/admin/accounts/create", post(admin::accounts::create))
        .route(
            "/admin/accounts/{id}/delete",
            post(admin::accounts::delete),
        )
        .layer(from_fn_with_state(state.clone(), guard::require_staff))
        .layer(DefaultBodyLimit::max(state.options.upload_body_limit));

    Router::new()
        .route("/", get(public::home))
        .route("/services", get(public::services))
        .route("/about", get(public::about))
        .route("/contact", get(public::contact).post(public::contact_submit))
        .route("/gallery", get(public::gallery))
        .route("/realty", get(public::realty))
        .route("/media/{*path}", get(public::serve_media))
        .route("/static/{*path}", get(assets::serve_static))
        .route(
            "/admin/login",
            get(admin::login::form).post(admin::login::submit),
        )
        .route("/admin/logout", post(admin::login::logout))
        .merge(guarded)
        .fallback(public::fallback)
        .with_state(state)
        .layer(from_fn(middleware::log_responses))
        .layer(from_fn(middleware::set_request_context))
}
