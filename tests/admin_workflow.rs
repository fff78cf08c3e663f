//! End-to-end admin content workflows over in-memory persistence: the draft
//! lifecycle feeding the services, role gating, deletion semantics and bulk
//! partial-failure reporting.

mod common;

use common::{Harness, tiny_gif};
use mortar::application::admin::bulk::BulkSelection;
use mortar::application::admin::gallery::DeleteOutcome;
use mortar::application::error::AppError;
use mortar::application::repos::GalleryRepo;
use mortar::domain::drafts::{DraftPhase, GalleryDraft, RealtyDraft};
use mortar::domain::media::PendingImage;
use mortar::domain::types::{GalleryCategory, PricePeriod};

fn upload(name: &str) -> PendingImage {
    PendingImage {
        filename: name.to_string(),
        content_type: "image/gif".to_string(),
        bytes: tiny_gif(),
    }
}

#[tokio::test]
async fn gallery_create_flows_from_draft_to_listing() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    let mut draft = GalleryDraft::load(None);
    draft.apply_field("title", "Modern Family Home");
    draft.apply_field("description", "4BR contemporary residence");
    draft.apply_field("category", "residential");
    draft.attachments.add(vec![upload("front.gif")]);

    let submission = draft.begin_submit().expect("valid submission");
    let created = harness
        .gallery
        .create(&admin, submission)
        .await
        .expect("create succeeds");
    draft.complete();

    assert_eq!(draft.phase(), DraftPhase::Empty);
    assert_eq!(created.category, GalleryCategory::Residential);
    assert_eq!(created.images.len(), 1);
    assert_eq!(created.images[0].display_order, 0);

    let listed = harness.gallery_repo.list_posts().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Modern Family Home");
    assert_eq!(listed[0].images.len(), 1);

    // Pending upload went through the media store.
    assert_eq!(harness.media.stored.lock().unwrap().len(), 1);

    // The mutation was audited.
    let audit = harness.audit_repo.entries.lock().unwrap();
    assert!(audit.iter().any(|entry| entry.action == "gallery.create"));
}

#[tokio::test]
async fn create_without_images_fails_and_preserves_the_draft() {
    let mut draft = GalleryDraft::load(None);
    draft.apply_field("title", "Site works");
    draft.apply_field("description", "Earthworks and drainage");

    assert!(draft.begin_submit().is_err());
    assert_eq!(draft.phase(), DraftPhase::Failed);
    assert_eq!(draft.title, "Site works");
    assert_eq!(draft.description, "Earthworks and drainage");
}

#[tokio::test]
async fn update_replaces_children_wholesale() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    let mut draft = RealtyDraft::load(None);
    draft.apply_field("title", "Beachfront Condo");
    draft.apply_field("location", "Santa Monica, CA");
    draft.apply_field("price", "$625,000");
    draft.update_bedroom(0, "name", "Master");
    draft.update_bedroom(0, "sqm", "24");
    draft.attachments.add(vec![upload("a.gif"), upload("b.gif")]);
    let created = harness
        .realty
        .create(&admin, draft.begin_submit().unwrap())
        .await
        .unwrap();
    assert_eq!(created.bedrooms.len(), 1);
    assert_eq!(created.images.len(), 2);

    // Edit: keep only the second image, rename the bedroom, add another.
    let mut draft = RealtyDraft::load(Some(&created));
    draft.apply_field("price", "650000");
    draft.attachments.retain_stored(&[created.images[1].url.clone()]);
    draft.update_bedroom(0, "name", "Primary suite");
    draft.add_bedroom();
    draft.update_bedroom(1, "name", "Guest room");
    draft.update_bedroom(1, "sqm", "14.5");

    let updated = harness
        .realty
        .update(&admin, created.id, draft.begin_submit().unwrap())
        .await
        .unwrap();

    assert_eq!(updated.price_cents, 65_000_000);
    assert_eq!(updated.price_period, PricePeriod::Total);
    assert_eq!(updated.images.len(), 1);
    assert_eq!(updated.images[0].url, created.images[1].url);
    assert_eq!(updated.images[0].display_order, 0);
    let names: Vec<_> = updated
        .bedrooms
        .iter()
        .map(|bedroom| bedroom.name.as_str())
        .collect();
    assert_eq!(names, vec!["Primary suite", "Guest room"]);
}

#[tokio::test]
async fn moderators_create_and_edit_but_never_delete_or_provision() {
    let harness = Harness::new();
    let moderator = harness.moderator_user().await;

    let mut draft = GalleryDraft::load(None);
    draft.apply_field("title", "Warehouse refit");
    draft.apply_field("description", "Interior renovation");
    draft.apply_field("category", "renovation");
    draft.attachments.add(vec![upload("refit.gif")]);
    let post = harness
        .gallery
        .create(&moderator, draft.begin_submit().unwrap())
        .await
        .expect("moderators may create");

    let err = harness
        .gallery
        .delete(&moderator, post.id)
        .await
        .expect_err("moderators may not delete");
    assert!(matches!(err, AppError::Authorization(_)));

    // The refused delete never reached the repository.
    assert_eq!(harness.gallery_repo.posts.lock().unwrap().len(), 1);

    let err = harness
        .accounts
        .create_moderator(&moderator, "Someone", "someone@example.com", "hunter22")
        .await
        .expect_err("moderators may not provision accounts");
    assert!(matches!(err, AppError::Authorization(_)));
}

#[tokio::test]
async fn delete_is_idempotent_against_stale_references() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    let mut draft = GalleryDraft::load(None);
    draft.apply_field("title", "Old post");
    draft.apply_field("description", "To be removed");
    draft.attachments.add(vec![upload("old.gif")]);
    let post = harness
        .gallery
        .create(&admin, draft.begin_submit().unwrap())
        .await
        .unwrap();

    assert_eq!(
        harness.gallery.delete(&admin, post.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    // Deleting again reports the softer outcome instead of an error.
    assert_eq!(
        harness.gallery.delete(&admin, post.id).await.unwrap(),
        DeleteOutcome::AlreadyGone
    );

    let listed = harness.gallery_repo.list_posts().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn bulk_delete_reports_each_failure_and_refuses_empty_selections() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    let err = harness
        .bulk
        .delete_selected(&admin, BulkSelection::default())
        .await
        .expect_err("empty selection is refused");
    assert!(matches!(err, AppError::Validation(_)));

    let mut ids = Vec::new();
    for index in 0..3 {
        let mut draft = GalleryDraft::load(None);
        draft.apply_field("title", &format!("Post {index}"));
        draft.apply_field("description", "bulk target");
        draft.attachments.add(vec![upload("img.gif")]);
        let post = harness
            .gallery
            .create(&admin, draft.begin_submit().unwrap())
            .await
            .unwrap();
        ids.push(post.id);
    }

    // One of the three deletions will fail at the storage layer.
    harness
        .gallery_repo
        .poisoned_deletes
        .lock()
        .unwrap()
        .insert(ids[1]);

    let outcome = harness
        .bulk
        .delete_selected(
            &admin,
            BulkSelection {
                gallery: ids.clone(),
                realty: Vec::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].id, ids[1]);

    let remaining = harness.gallery_repo.list_posts().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ids[1]);
}

#[tokio::test]
async fn provisioning_surfaces_duplicate_emails_as_conflicts() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    harness
        .accounts
        .create_moderator(&admin, "Junior", "junior2@example.com", "hunter22")
        .await
        .expect("first creation succeeds");

    let err = harness
        .accounts
        .create_moderator(&admin, "Junior Again", "junior2@example.com", "hunter22")
        .await
        .expect_err("duplicate email conflicts");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = harness
        .accounts
        .create_moderator(&admin, "", "blank@example.com", "hunter22")
        .await
        .expect_err("blank fields are rejected");
    assert!(matches!(err, AppError::Validation(_)));

    let err = harness
        .accounts
        .create_moderator(&admin, "Short", "short@example.com", "four")
        .await
        .expect_err("short passwords are rejected");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn admins_cannot_delete_their_own_account() {
    let harness = Harness::new();
    let admin = harness.admin_user().await;

    let err = harness
        .accounts
        .delete(&admin, admin.account.id)
        .await
        .expect_err("self-deletion refused");
    assert!(matches!(err, AppError::Validation(_)));

    let other = harness
        .accounts
        .create_moderator(&admin, "Junior", "junior3@example.com", "hunter22")
        .await
        .unwrap();
    harness
        .accounts
        .delete(&admin, other.id)
        .await
        .expect("deleting another account succeeds");
}

#[tokio::test]
async fn sign_in_issues_a_resolvable_session_and_sign_out_revokes_it() {
    let harness = Harness::new();
    // Creates the account row with a known password.
    let admin = harness.admin_user().await;

    let signed = harness
        .auth
        .sign_in(&admin.account.email, "swordfish")
        .await
        .expect("credentials match");
    assert!(signed.token.starts_with("msn_"));

    let resolved = harness
        .auth
        .resolve(&signed.token)
        .await
        .expect("token resolves");
    assert_eq!(resolved.account.id, admin.account.id);
    assert!(resolved.session.is_admin());

    // Tampered tokens and wrong passwords resolve to nothing.
    assert!(harness.auth.resolve("msn_bogus_prefix_0000").await.is_none());
    assert!(
        harness
            .auth
            .sign_in(&admin.account.email, "wrong")
            .await
            .is_err()
    );

    harness.auth.sign_out(&signed.token).await;
    assert!(harness.auth.resolve(&signed.token).await.is_none());
}
