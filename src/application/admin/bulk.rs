//! Bulk deletion across both post types.
//!
//! Individual deletes run concurrently; the caller's refetch happens only
//! after every one of them has settled. Partial failure is reported per item,
//! never collapsed into one generic toast.

use futures::future::join_all;
use uuid::Uuid;

use crate::application::admin::gallery::{AdminGalleryService, DeleteOutcome};
use crate::application::admin::realty::AdminRealtyService;
use crate::application::auth::CurrentUser;
use crate::application::error::AppError;
use crate::domain::types::PostKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelection {
    pub gallery: Vec<Uuid>,
    pub realty: Vec<Uuid>,
}

impl BulkSelection {
    pub fn is_empty(&self) -> bool {
        self.gallery.is_empty() && self.realty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gallery.len() + self.realty.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    pub kind: PostKind,
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub deleted: usize,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct BulkDeleteService {
    gallery: AdminGalleryService,
    realty: AdminRealtyService,
}

impl BulkDeleteService {
    pub fn new(gallery: AdminGalleryService, realty: AdminRealtyService) -> Self {
        Self { gallery, realty }
    }

    /// Delete every selected post. An empty selection is refused outright;
    /// otherwise each id is attempted independently and the outcome lists
    /// exactly which deletions failed.
    pub async fn delete_selected(
        &self,
        actor: &CurrentUser,
        selection: BulkSelection,
    ) -> Result<BulkOutcome, AppError> {
        if selection.is_empty() {
            return Err(AppError::validation("Select at least one post to delete"));
        }
        if !actor.session.can_delete() {
            return Err(AppError::Authorization("delete posts"));
        }

        let gallery_jobs = selection.gallery.into_iter().map(|id| {
            let service = self.gallery.clone();
            async move { (PostKind::Gallery, id, service.delete(actor, id).await) }
        });
        let realty_jobs = selection.realty.into_iter().map(|id| {
            let service = self.realty.clone();
            async move { (PostKind::Realty, id, service.delete(actor, id).await) }
        });

        let mut outcome = BulkOutcome::default();
        let settled = join_all(
            gallery_jobs
                .map(boxed_job)
                .chain(realty_jobs.map(boxed_job)),
        )
        .await;

        for (kind, id, result) in settled {
            match result {
                Ok(DeleteOutcome::Deleted | DeleteOutcome::AlreadyGone) => outcome.deleted += 1,
                Err(err) => outcome.failures.push(BulkFailure {
                    kind,
                    id,
                    message: err.user_message(),
                }),
            }
        }

        Ok(outcome)
    }
}

type BulkJob<'a> = futures::future::BoxFuture<'a, (PostKind, Uuid, Result<DeleteOutcome, AppError>)>;

fn boxed_job<'a, F>(future: F) -> BulkJob<'a>
where
    F: std::future::Future<Output = (PostKind, Uuid, Result<DeleteOutcome, AppError>)>
        + Send
        + 'a,
{
    Box::pin(future)
}
