//! Router-level tests driven through `tower::ServiceExt::oneshot`: the route
//! guard, the login flow, and the public listing pages rendering against
//! in-memory persistence.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{Harness, tiny_gif};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mortar::application::repos::{ContactRepo, GalleryRepo, RealtyRepo};
use mortar::domain::drafts::GalleryDraft;
use mortar::domain::media::PendingImage;
use mortar::infra::http::{AppState, RuntimeOptions, build_router};
use mortar::infra::media::MediaStorage;

fn router_for(harness: &Harness, media_dir: &std::path::Path) -> Router {
    let state = AppState {
        auth: Arc::new(harness.auth.clone()),
        gallery: harness.gallery.clone(),
        realty: harness.realty.clone(),
        accounts: harness.accounts.clone(),
        bulk: harness.bulk.clone(),
        audit: mortar::application::admin::audit::AdminAuditService::new(
            harness.audit_repo.clone(),
        ),
        gallery_reader: harness.gallery_repo.clone() as Arc<dyn GalleryRepo>,
        realty_reader: harness.realty_repo.clone() as Arc<dyn RealtyRepo>,
        contact: harness.contact_repo.clone() as Arc<dyn ContactRepo>,
        media: Arc::new(MediaStorage::new(media_dir.to_path_buf()).unwrap()),
        options: Arc::new(RuntimeOptions {
            media_public_base: "/media".to_string(),
            public_page_size: 9,
            admin_page_size: 10,
            session_ttl: Duration::from_secs(3600),
            session_resolve_timeout: Duration::from_millis(500),
            cookie_secure: false,
            upload_body_limit: 5 * 1024 * 1024,
        }),
    };
    build_router(state)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

async fn seed_gallery_post(harness: &Harness, title: &str, image_count: usize) {
    let admin = harness.admin_user().await;
    let mut draft = GalleryDraft::load(None);
    draft.apply_field("title", title);
    draft.apply_field("description", "seeded");
    let uploads = (0..image_count)
        .map(|index| PendingImage {
            filename: format!("img-{index}.gif"),
            content_type: "image/gif".to_string(),
            bytes: tiny_gif(),
        })
        .collect();
    draft.attachments.add(uploads);
    harness
        .gallery
        .create(&admin, draft.begin_submit().unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn anonymous_admin_requests_redirect_to_login_without_rendering() {
    let harness = Harness::new();
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );
    let body = body_text(response).await;
    assert!(!body.contains("Dashboard"));
}

#[tokio::test]
async fn garbage_session_cookies_also_land_on_the_login_screen() {
    let harness = Harness::new();
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .oneshot(
            Request::get("/admin")
                .header(header::COOKIE, "mortar_session=msn_zzz_tampered")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );
}

#[tokio::test]
async fn login_issues_a_cookie_that_unlocks_the_workspace() {
    let harness = Harness::new();
    // Seeds the admin account with password "swordfish".
    let admin = harness.admin_user().await;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let login = router
        .clone()
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "email={}&password=swordfish",
                    admin.account.email
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(login.status().is_redirection());

    let session_cookie = login
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .find(|value| value.starts_with("mortar_session="))
        .expect("session cookie set");
    let cookie_pair = session_cookie.split(';').next().unwrap().to_string();

    let dashboard = router
        .oneshot(
            Request::get("/admin")
                .header(header::COOKIE, cookie_pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = body_text(dashboard).await;
    assert!(body.contains("Dashboard"));
    assert!(body.contains("Gallery posts"));
}

#[tokio::test]
async fn wrong_credentials_stay_on_the_login_form() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "email={}&password=wrong",
                    admin.account.email
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(response).await;
    assert!(body.contains("Invalid email or password"));
}

#[tokio::test]
async fn public_gallery_renders_posts_and_respects_the_filter() {
    let harness = Harness::new();
    seed_gallery_post(&harness, "Modern Family Home", 2).await;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .clone()
        .oneshot(Request::get("/gallery").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Modern Family Home"));
    assert!(body.contains("Page 1 of 1"));

    // The seeded post is residential; the commercial filter hides it.
    let response = router
        .oneshot(
            Request::get("/gallery?category=commercial")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(!body.contains("Modern Family Home"));
    assert!(body.contains("No projects found"));
}

#[tokio::test]
async fn lightbox_query_parameters_open_the_overlay() {
    let harness = Harness::new();
    seed_gallery_post(&harness, "Warehouse refit", 3).await;
    let post_id = harness.gallery_repo.list_posts().await.unwrap()[0].id;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .clone()
        .oneshot(
            Request::get(format!("/gallery?lightbox={post_id}&image=1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("lightbox"));
    assert!(body.contains("2 / 3"));

    // Out-of-range indexes leave the overlay closed.
    let response = router
        .oneshot(
            Request::get(format!("/gallery?lightbox={post_id}&image=9"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(!body.contains("lightbox-position"));
}

#[tokio::test]
async fn contact_form_round_trip_stores_the_message() {
    let harness = Harness::new();
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let response = router
        .clone()
        .oneshot(
            Request::post("/contact")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "name=Dana&email=dana%40example.com&phone=&subject=Quote&message=Need+a+quote",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let stored = harness.contact_repo.recent_messages(10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].subject, "Quote");
    assert_eq!(stored[0].phone, None);

    // Missing required fields re-render the form with the error inline.
    let response = router
        .oneshot(
            Request::post("/contact")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=&email=bad&subject=&message="))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("required"));
}

async fn sign_in_cookie(router: &Router, email: &str) -> String {
    let login = router
        .clone()
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("email={email}&password=swordfish")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(login.status().is_redirection());
    login
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .find(|value| value.starts_with("mortar_session="))
        .expect("session cookie set")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn moderator_workspace_renders_no_delete_or_provisioning_controls() {
    let harness = Harness::new();
    seed_gallery_post(&harness, "Gated project", 1).await;
    let moderator = harness.moderator_user().await;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let cookie = sign_in_cookie(&router, &moderator.account.email).await;
    let dashboard = router
        .clone()
        .oneshot(
            Request::get("/admin")
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = body_text(dashboard).await;
    assert!(body.contains("Gated project"));
    assert!(!body.contains("Delete"));
    assert!(!body.contains("Create moderator"));

    // An admin over the same content sees both.
    let admin_cookie = sign_in_cookie(&router, "boss@example.com").await;
    let dashboard = router
        .oneshot(
            Request::get("/admin")
                .header(header::COOKIE, admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_text(dashboard).await;
    assert!(body.contains("Delete"));
    assert!(body.contains("Create moderator"));
}

#[tokio::test]
async fn deleting_a_post_requires_the_confirmation_step() {
    let harness = Harness::new();
    seed_gallery_post(&harness, "Condemned shed", 1).await;
    let post_id = harness.gallery_repo.list_posts().await.unwrap()[0].id;
    let tmp = tempfile::tempdir().unwrap();
    let router = router_for(&harness, tmp.path());

    let cookie = sign_in_cookie(&router, "boss@example.com").await;

    // The GET renders a confirmation page and deletes nothing.
    let confirm = router
        .clone()
        .oneshot(
            Request::get(format!("/admin/gallery/{post_id}/delete"))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(confirm.status(), StatusCode::OK);
    let body = body_text(confirm).await;
    assert!(body.contains("Delete permanently"));
    assert_eq!(harness.gallery_repo.list_posts().await.unwrap().len(), 1);

    // Confirming removes the post from subsequent listings.
    let deleted = router
        .oneshot(
            Request::post(format!("/admin/gallery/{post_id}/delete"))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(deleted.status().is_redirection());
    assert!(harness.gallery_repo.list_posts().await.unwrap().is_empty());
}
