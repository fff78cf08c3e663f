use std::sync::Arc;

use uuid::Uuid;

use crate::application::admin::audit::AdminAuditService;
use crate::application::admin::{actor_label, discard_stored, map_repo_error, persist_images};
use crate::application::auth::CurrentUser;
use crate::application::error::AppError;
use crate::application::repos::{
    CreateGalleryPostParams, GalleryRepo, GalleryWriteRepo, MediaStore, RepoError,
    UpdateGalleryPostParams,
};
use crate::domain::drafts::GallerySubmission;
use crate::domain::entities::GalleryPostRecord;

/// Result of a delete: already-deleted posts are success from the caller's
/// point of view, but the workspace wants to word the toast differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

#[derive(Clone)]
pub struct AdminGalleryService {
    reader: Arc<dyn GalleryRepo>,
    writer: Arc<dyn GalleryWriteRepo>,
    media: Arc<dyn MediaStore>,
    audit: AdminAuditService,
}

impl AdminGalleryService {
    pub fn new(
        reader: Arc<dyn GalleryRepo>,
        writer: Arc<dyn GalleryWriteRepo>,
        media: Arc<dyn MediaStore>,
        audit: AdminAuditService,
    ) -> Self {
        Self {
            reader,
            writer,
            media,
            audit,
        }
    }

    pub async fn list(&self) -> Result<Vec<GalleryPostRecord>, AppError> {
        self.reader.list_posts().await.map_err(map_repo_error)
    }

    pub async fn load(&self, id: Uuid) -> Result<Option<GalleryPostRecord>, AppError> {
        self.reader.find_post(id).await.map_err(map_repo_error)
    }

    pub async fn create(
        &self,
        actor: &CurrentUser,
        submission: GallerySubmission,
    ) -> Result<GalleryPostRecord, AppError> {
        if submission.images.is_empty() {
            return Err(AppError::validation("A gallery post needs at least one image"));
        }

        let (images, stored_now) = persist_images(&self.media, submission.images)
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?;

        let params = CreateGalleryPostParams {
            title: submission.title,
            description: submission.description,
            category: submission.category,
            images,
        };

        let post = match self.writer.create_post(params).await {
            Ok(post) => post,
            Err(err) => {
                discard_stored(&self.media, &stored_now).await;
                return Err(map_repo_error(err));
            }
        };

        metrics::counter!("mortar_posts_created_total", "kind" => "gallery").increment(1);
        self.audit
            .record(
                actor_label(actor),
                "gallery.create",
                "gallery_post",
                Some(&post.id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(post)
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        submission: GallerySubmission,
    ) -> Result<GalleryPostRecord, AppError> {
        if submission.images.is_empty() {
            return Err(AppError::validation("A gallery post needs at least one image"));
        }

        let (images, stored_now) = persist_images(&self.media, submission.images)
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?;

        let params = UpdateGalleryPostParams {
            id,
            title: submission.title,
            description: submission.description,
            category: submission.category,
            images,
        };

        let post = match self.writer.update_post(params).await {
            Ok(post) => post,
            Err(err) => {
                discard_stored(&self.media, &stored_now).await;
                return Err(map_repo_error(err));
            }
        };

        self.audit
            .record(
                actor_label(actor),
                "gallery.update",
                "gallery_post",
                Some(&post.id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(post)
    }

    /// Delete a post and its images. Admin only; refused before any
    /// persistence call when the caller's role is insufficient.
    pub async fn delete(&self, actor: &CurrentUser, id: Uuid) -> Result<DeleteOutcome, AppError> {
        if !actor.session.can_delete() {
            return Err(AppError::Authorization("delete posts"));
        }

        let outcome = match self.writer.delete_post(id).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(RepoError::NotFound) => DeleteOutcome::AlreadyGone,
            Err(err) => return Err(map_repo_error(err)),
        };

        metrics::counter!("mortar_posts_deleted_total", "kind" => "gallery").increment(1);
        self.audit
            .record(
                actor_label(actor),
                "gallery.delete",
                "gallery_post",
                Some(&id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(outcome)
    }
}
