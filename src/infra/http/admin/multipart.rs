//! Multipart parsing for the post forms.
//!
//! A submission carries scalar text fields, zero or more `retain` entries
//! naming persisted images to keep (edit mode), paired `bedroom_name` /
//! `bedroom_sqm` rows (realty), and zero or more `images` file parts.

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use thiserror::Error;
use tracing::error;

use crate::domain::drafts::{BedroomRow, GalleryDraft, RealtyDraft};
use crate::domain::media::PendingImage;

const SOURCE: &str = "infra::http::admin::multipart";

#[derive(Debug, Error)]
pub(crate) enum FormReadError {
    #[error("the upload exceeds the configured size limit")]
    PayloadTooLarge,
    #[error("the form payload could not be read")]
    Invalid,
}

#[derive(Debug, Default)]
pub(crate) struct PostFormData {
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) retained: Vec<String>,
    pub(crate) bedroom_names: Vec<String>,
    pub(crate) bedroom_sqms: Vec<String>,
    pub(crate) uploads: Vec<PendingImage>,
}

pub(crate) async fn read_post_form(mut multipart: Multipart) -> Result<PostFormData, FormReadError> {
    let mut data = PostFormData::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                let status = err.status();
                error!(
                    target = SOURCE,
                    status = status.as_u16(),
                    error = %err,
                    "failed to read multipart payload"
                );
                return Err(match status {
                    StatusCode::PAYLOAD_TOO_LARGE => FormReadError::PayloadTooLarge,
                    _ => FormReadError::Invalid,
                });
            }
        };

        let Some(name) = field.name().map(|name| name.to_string()) else {
            continue;
        };

        match name.as_str() {
            "images" => {
                let filename = field
                    .file_name()
                    .map(|value| value.to_string())
                    .filter(|value| !value.trim().is_empty());
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(|_| FormReadError::Invalid)?;

                // Browsers submit an empty file part when no file was picked.
                let Some(filename) = filename else { continue };
                if bytes.is_empty() {
                    continue;
                }

                data.uploads.push(PendingImage {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "retain" => {
                let value = field.text().await.map_err(|_| FormReadError::Invalid)?;
                if !value.trim().is_empty() {
                    data.retained.push(value);
                }
            }
            "bedroom_name" => {
                data.bedroom_names
                    .push(field.text().await.map_err(|_| FormReadError::Invalid)?);
            }
            "bedroom_sqm" => {
                data.bedroom_sqms
                    .push(field.text().await.map_err(|_| FormReadError::Invalid)?);
            }
            _ => {
                let value = field.text().await.map_err(|_| FormReadError::Invalid)?;
                data.fields.push((name, value));
            }
        }
    }

    Ok(data)
}

/// Push parsed form data into a gallery draft. Returns a user-facing error
/// when some uploaded files were not images; accepted files stay attached.
pub(crate) fn apply_to_gallery(draft: &mut GalleryDraft, data: PostFormData) -> Result<(), String> {
    for (name, value) in &data.fields {
        draft.apply_field(name, value);
    }
    if draft.is_edit() {
        draft.attachments.retain_stored(&data.retained);
    }

    let outcome = draft.attachments.add(data.uploads);
    rejected_message(outcome.rejected)
}

pub(crate) fn apply_to_realty(draft: &mut RealtyDraft, data: PostFormData) -> Result<(), String> {
    for (name, value) in &data.fields {
        draft.apply_field(name, value);
    }

    let rows: Vec<BedroomRow> = data
        .bedroom_names
        .iter()
        .zip(data.bedroom_sqms.iter())
        .map(|(name, sqm)| BedroomRow {
            name: name.clone(),
            sqm: sqm.clone(),
        })
        .collect();
    draft.set_bedrooms(rows);

    if draft.is_edit() {
        draft.attachments.retain_stored(&data.retained);
    }

    let outcome = draft.attachments.add(data.uploads);
    rejected_message(outcome.rejected)
}

fn rejected_message(rejected: Vec<String>) -> Result<(), String> {
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "These files are not images and were not attached: {}",
            rejected.join(", ")
        ))
    }
}
