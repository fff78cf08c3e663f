pub mod accounts;
pub mod audit;
pub mod bulk;
pub mod gallery;
pub mod realty;

use crate::application::auth::CurrentUser;
use crate::application::error::AppError;
use crate::application::repos::{MediaStore, MediaStoreError, NewImage, RepoError};
use crate::domain::drafts::ImagePayload;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => AppError::NotFound,
        RepoError::Duplicate { .. } => {
            AppError::conflict("A conflicting record already exists")
        }
        other => AppError::Repo(other),
    }
}

/// Persist the pending uploads of a submission and flatten everything into
/// ordered [`NewImage`] rows. Returns the rows plus the paths stored by this
/// call so a failed database write can clean them up again.
pub(crate) async fn persist_images(
    media: &Arc<dyn MediaStore>,
    images: Vec<ImagePayload>,
) -> Result<(Vec<NewImage>, Vec<String>), MediaStoreError> {
    let mut rows = Vec::with_capacity(images.len());
    let mut stored_now = Vec::new();
    for (index, image) in images.into_iter().enumerate() {
        let url = match image {
            ImagePayload::Retain { url } => url,
            ImagePayload::Upload(pending) => {
                let stored = match media.store(&pending.filename, pending.bytes).await {
                    Ok(stored) => stored,
                    Err(err) => {
                        discard_stored(media, &stored_now).await;
                        return Err(err);
                    }
                };
                metrics::counter!("mortar_media_stored_total").increment(1);
                stored_now.push(stored.clone());
                stored
            }
        };
        rows.push(NewImage {
            url,
            display_order: index as i32,
        });
    }
    Ok((rows, stored_now))
}

/// Best-effort removal of files stored for a submission whose database write
/// failed. Leftovers are logged, not fatal.
pub(crate) async fn discard_stored(media: &Arc<dyn MediaStore>, stored: &[String]) {
    for path in stored {
        if let Err(err) = media.remove(path).await {
            warn!(
                target = "mortar::admin",
                path = %path,
                error = %err,
                "failed to remove orphaned media payload"
            );
        }
    }
}

pub(crate) fn actor_label(actor: &CurrentUser) -> &str {
    &actor.account.email
}
