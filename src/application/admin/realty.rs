use std::sync::Arc;

use uuid::Uuid;

use crate::application::admin::audit::AdminAuditService;
use crate::application::admin::gallery::DeleteOutcome;
use crate::application::admin::{actor_label, discard_stored, map_repo_error, persist_images};
use crate::application::auth::CurrentUser;
use crate::application::error::AppError;
use crate::application::repos::{
    CreateRealtyPostParams, MediaStore, NewBedroom, RealtyRepo, RealtyWriteRepo, RepoError,
    UpdateRealtyPostParams,
};
use crate::domain::drafts::RealtySubmission;
use crate::domain::entities::RealtyPostRecord;

#[derive(Clone)]
pub struct AdminRealtyService {
    reader: Arc<dyn RealtyRepo>,
    writer: Arc<dyn RealtyWriteRepo>,
    media: Arc<dyn MediaStore>,
    audit: AdminAuditService,
}

fn bedroom_rows(submission: &RealtySubmission) -> Vec<NewBedroom> {
    submission
        .bedrooms
        .iter()
        .enumerate()
        .map(|(index, bedroom)| NewBedroom {
            name: bedroom.name.clone(),
            sqm: bedroom.sqm,
            position: index as i32,
        })
        .collect()
}

impl AdminRealtyService {
    pub fn new(
        reader: Arc<dyn RealtyRepo>,
        writer: Arc<dyn RealtyWriteRepo>,
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

    pub async fn list(&self) -> Result<Vec<RealtyPostRecord>, AppError> {
        self.reader.list_posts().await.map_err(map_repo_error)
    }

    pub async fn load(&self, id: Uuid) -> Result<Option<RealtyPostRecord>, AppError> {
        self.reader.find_post(id).await.map_err(map_repo_error)
    }

    pub async fn create(
        &self,
        actor: &CurrentUser,
        submission: RealtySubmission,
    ) -> Result<RealtyPostRecord, AppError> {
        if submission.images.is_empty() {
            return Err(AppError::validation("A listing needs at least one image"));
        }

        let bedrooms = bedroom_rows(&submission);
        let (images, stored_now) = persist_images(&self.media, submission.images)
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?;

        let params = CreateRealtyPostParams {
            title: submission.title,
            description: submission.description,
            price_cents: submission.price_cents,
            price_period: submission.price_period,
            location: submission.location,
            kind: submission.kind,
            category: submission.category,
            living_room_sqm: submission.living_room_sqm,
            kitchen_sqm: submission.kitchen_sqm,
            bedrooms,
            images,
        };

        let post = match self.writer.create_post(params).await {
            Ok(post) => post,
            Err(err) => {
                discard_stored(&self.media, &stored_now).await;
                return Err(map_repo_error(err));
            }
        };

        metrics::counter!("mortar_posts_created_total", "kind" => "realty").increment(1);
        self.audit
            .record(
                actor_label(actor),
                "realty.create",
                "realty_post",
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
        submission: RealtySubmission,
    ) -> Result<RealtyPostRecord, AppError> {
        if submission.images.is_empty() {
            return Err(AppError::validation("A listing needs at least one image"));
        }

        let bedrooms = bedroom_rows(&submission);
        let (images, stored_now) = persist_images(&self.media, submission.images)
            .await
            .map_err(|err| AppError::unexpected(err.to_string()))?;

        let params = UpdateRealtyPostParams {
            id,
            title: submission.title,
            description: submission.description,
            price_cents: submission.price_cents,
            price_period: submission.price_period,
            location: submission.location,
            kind: submission.kind,
            category: submission.category,
            living_room_sqm: submission.living_room_sqm,
            kitchen_sqm: submission.kitchen_sqm,
            bedrooms,
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
                "realty.update",
                "realty_post",
                Some(&post.id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(post)
    }

    pub async fn delete(&self, actor: &CurrentUser, id: Uuid) -> Result<DeleteOutcome, AppError> {
        if !actor.session.can_delete() {
            return Err(AppError::Authorization("delete posts"));
        }

        let outcome = match self.writer.delete_post(id).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(RepoError::NotFound) => DeleteOutcome::AlreadyGone,
            Err(err) => return Err(map_repo_error(err)),
        };

        metrics::counter!("mortar_posts_deleted_total", "kind" => "realty").increment(1);
        self.audit
            .record(
                actor_label(actor),
                "realty.delete",
                "realty_post",
                Some(&id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(outcome)
    }
}
