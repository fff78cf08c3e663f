//! Draft state machines backing the create/edit post forms.
//!
//! A draft moves `Empty -> Editing -> Submitting`, and from there either
//! completes (resetting to `Empty`) or lands in `Failed`, which returns to
//! `Editing` on the next edit or retry. Field mutation performs no
//! validation; everything is checked in `begin_submit` before any I/O
//! happens, and a failed submission preserves the draft for retry.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{GalleryPostRecord, RealtyPostRecord};
use crate::domain::media::{Attachment, AttachmentSet, PendingImage};
use crate::domain::types::{GalleryCategory, ListingKind, PricePeriod, RealtyCategory};

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("{message}")]
    Validation { message: String },
    #[error("draft is not open for submission")]
    NotEditing,
}

impl DraftError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// A successful submission has no lingering state of its own: `complete`
/// resets the draft straight back to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    Empty,
    Editing,
    Submitting,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit { id: Uuid },
}

/// One image entry in a submission payload: either a fresh upload or a
/// retained reference to an already persisted image. Position in the vec is
/// the display order the save assigns.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    Upload(PendingImage),
    Retain { url: String },
}

fn image_payloads(attachments: AttachmentSet) -> Vec<ImagePayload> {
    attachments
        .into_items()
        .into_iter()
        .map(|item| match item {
            Attachment::Pending(pending) => ImagePayload::Upload(pending),
            Attachment::Stored(stored) => ImagePayload::Retain { url: stored.url },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GallerySubmission {
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub images: Vec<ImagePayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryDraft {
    mode: DraftMode,
    phase: DraftPhase,
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub attachments: AttachmentSet,
    last_error: Option<String>,
}

impl Default for GalleryDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryDraft {
    pub fn new() -> Self {
        Self {
            mode: DraftMode::Create,
            phase: DraftPhase::Empty,
            title: String::new(),
            description: String::new(),
            category: GalleryCategory::Residential,
            attachments: AttachmentSet::new(),
            last_error: None,
        }
    }

    /// Open the draft. With an existing record the scalar fields and the
    /// persisted images are copied in and the draft switches to edit mode;
    /// without one the category defaults and the draft starts blank.
    pub fn load(existing: Option<&GalleryPostRecord>) -> Self {
        let mut draft = Self::new();
        draft.phase = DraftPhase::Editing;
        if let Some(post) = existing {
            draft.mode = DraftMode::Edit { id: post.id };
            draft.title = post.title.clone();
            draft.description = post.description.clone();
            draft.category = post.category;
            draft.attachments =
                AttachmentSet::from_stored(post.images.iter().map(|image| image.url.clone()));
        }
        draft
    }

    /// Apply one named scalar field, the way a form post delivers them.
    /// Returns false for names the draft does not own.
    pub fn apply_field(&mut self, name: &str, value: &str) -> bool {
        self.touch();
        match name {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "category" => {
                if let Ok(category) = value.parse() {
                    self.category = category;
                }
            }
            _ => return false,
        }
        true
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, DraftMode::Edit { .. })
    }

    /// The record this draft edits, if any.
    pub fn edit_id(&self) -> Option<Uuid> {
        match self.mode {
            DraftMode::Create => None,
            DraftMode::Edit { id } => Some(id),
        }
    }

    /// Validate and serialize the draft, entering `Submitting`. Validation
    /// failures leave every field in place so the user can retry.
    pub fn begin_submit(&mut self) -> Result<GallerySubmission, DraftError> {
        if !matches!(self.phase, DraftPhase::Editing | DraftPhase::Failed) {
            return Err(DraftError::NotEditing);
        }
        if self.title.trim().is_empty() {
            return self.reject("Title is required");
        }
        if self.description.trim().is_empty() {
            return self.reject("Description is required");
        }
        if self.attachments.is_empty() {
            return self.reject(match self.mode {
                DraftMode::Create => "Attach at least one image",
                DraftMode::Edit { .. } => "A post must keep at least one image",
            });
        }

        self.phase = DraftPhase::Submitting;
        Ok(GallerySubmission {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category,
            images: image_payloads(std::mem::take(&mut self.attachments)),
        })
    }

    /// The submission landed: reset the whole draft back to `Empty`.
    pub fn complete(&mut self) {
        *self = Self::new();
    }

    /// The submission failed downstream: keep the draft for retry.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = DraftPhase::Failed;
        self.last_error = Some(message.into());
    }

    /// Restore attachments handed out by a failed `begin_submit` round trip.
    pub fn restore_images(&mut self, images: Vec<ImagePayload>) {
        self.attachments = AttachmentSet::from_items(
            images
                .into_iter()
                .map(|image| match image {
                    ImagePayload::Upload(pending) => Attachment::Pending(pending),
                    ImagePayload::Retain { url } => {
                        Attachment::Stored(crate::domain::media::StoredImageRef { url })
                    }
                })
                .collect(),
        );
    }

    fn reject<T>(&mut self, message: &str) -> Result<T, DraftError> {
        self.phase = DraftPhase::Failed;
        self.last_error = Some(message.to_string());
        Err(DraftError::validation(message))
    }

    fn touch(&mut self) {
        if matches!(self.phase, DraftPhase::Empty | DraftPhase::Failed) {
            self.phase = DraftPhase::Editing;
        }
    }
}

/// One editable bedroom row as the form holds it: raw strings, validated at
/// submit time. The UI always shows at least one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BedroomRow {
    pub name: String,
    pub sqm: String,
}

impl BedroomRow {
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.sqm.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BedroomInput {
    pub name: String,
    pub sqm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtySubmission {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub price_period: PricePeriod,
    pub location: String,
    pub kind: ListingKind,
    pub category: RealtyCategory,
    pub living_room_sqm: Option<f64>,
    pub kitchen_sqm: Option<f64>,
    pub bedrooms: Vec<BedroomInput>,
    pub images: Vec<ImagePayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealtyDraft {
    mode: DraftMode,
    phase: DraftPhase,
    pub title: String,
    pub description: String,
    pub price: String,
    pub price_period: PricePeriod,
    pub location: String,
    pub kind: ListingKind,
    pub category: RealtyCategory,
    pub living_room_sqm: String,
    pub kitchen_sqm: String,
    bedrooms: Vec<BedroomRow>,
    pub attachments: AttachmentSet,
    last_error: Option<String>,
}

impl Default for RealtyDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtyDraft {
    pub fn new() -> Self {
        Self {
            mode: DraftMode::Create,
            phase: DraftPhase::Empty,
            title: String::new(),
            description: String::new(),
            price: String::new(),
            price_period: PricePeriod::Total,
            location: String::new(),
            kind: ListingKind::Sale,
            category: RealtyCategory::Residential,
            living_room_sqm: String::new(),
            kitchen_sqm: String::new(),
            bedrooms: vec![BedroomRow::default()],
            attachments: AttachmentSet::new(),
            last_error: None,
        }
    }

    pub fn load(existing: Option<&RealtyPostRecord>) -> Self {
        let mut draft = Self::new();
        draft.phase = DraftPhase::Editing;
        if let Some(post) = existing {
            draft.mode = DraftMode::Edit { id: post.id };
            draft.title = post.title.clone();
            draft.description = post.description.clone().unwrap_or_default();
            draft.price = format!("{:.2}", post.price_cents as f64 / 100.0);
            draft.price_period = post.price_period;
            draft.location = post.location.clone();
            draft.kind = post.kind;
            draft.category = post.category;
            draft.living_room_sqm = post
                .living_room_sqm
                .map(|sqm| sqm.to_string())
                .unwrap_or_default();
            draft.kitchen_sqm = post
                .kitchen_sqm
                .map(|sqm| sqm.to_string())
                .unwrap_or_default();
            draft.bedrooms = post
                .bedrooms
                .iter()
                .map(|bedroom| BedroomRow {
                    name: bedroom.name.clone(),
                    sqm: bedroom.sqm.to_string(),
                })
                .collect();
            if draft.bedrooms.is_empty() {
                draft.bedrooms.push(BedroomRow::default());
            }
            draft.attachments =
                AttachmentSet::from_stored(post.images.iter().map(|image| image.url.clone()));
        }
        draft
    }

    pub fn apply_field(&mut self, name: &str, value: &str) -> bool {
        self.touch();
        match name {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "price" => self.price = value.to_string(),
            "price_period" => {
                if let Ok(period) = value.parse() {
                    self.price_period = period;
                }
            }
            "location" => self.location = value.to_string(),
            "kind" => {
                if let Ok(kind) = value.parse() {
                    self.kind = kind;
                }
            }
            "category" => {
                if let Ok(category) = value.parse() {
                    self.category = category;
                }
            }
            "living_room_sqm" => self.living_room_sqm = value.to_string(),
            "kitchen_sqm" => self.kitchen_sqm = value.to_string(),
            _ => return false,
        }
        true
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, DraftMode::Edit { .. })
    }

    /// The record this draft edits, if any.
    pub fn edit_id(&self) -> Option<Uuid> {
        match self.mode {
            DraftMode::Create => None,
            DraftMode::Edit { id } => Some(id),
        }
    }

    /// The rows the form renders; never empty.
    pub fn bedrooms(&self) -> &[BedroomRow] {
        &self.bedrooms
    }

    pub fn add_bedroom(&mut self) {
        self.touch();
        self.bedrooms.push(BedroomRow::default());
    }

    /// Remove a row; the last visible row is replaced with a blank one rather
    /// than leaving the section empty. Out-of-range indexes are a no-op.
    pub fn remove_bedroom(&mut self, index: usize) {
        self.touch();
        if index < self.bedrooms.len() {
            self.bedrooms.remove(index);
        }
        if self.bedrooms.is_empty() {
            self.bedrooms.push(BedroomRow::default());
        }
    }

    pub fn update_bedroom(&mut self, index: usize, field: &str, value: &str) {
        self.touch();
        let Some(row) = self.bedrooms.get_mut(index) else {
            return;
        };
        match field {
            "name" => row.name = value.to_string(),
            "sqm" => row.sqm = value.to_string(),
            _ => {}
        }
    }

    /// Replace the full row set, as a form post delivers it.
    pub fn set_bedrooms(&mut self, rows: Vec<BedroomRow>) {
        self.touch();
        self.bedrooms = rows;
        if self.bedrooms.is_empty() {
            self.bedrooms.push(BedroomRow::default());
        }
    }

    pub fn begin_submit(&mut self) -> Result<RealtySubmission, DraftError> {
        if !matches!(self.phase, DraftPhase::Editing | DraftPhase::Failed) {
            return Err(DraftError::NotEditing);
        }
        if self.title.trim().is_empty() {
            return self.reject("Title is required");
        }
        if self.location.trim().is_empty() {
            return self.reject("Location is required");
        }
        if self.price.trim().is_empty() {
            return self.reject("Price is required");
        }
        let price_cents = match parse_price(&self.price) {
            Ok(cents) => cents,
            Err(message) => return self.reject(&message),
        };
        let living_room_sqm = match parse_sqm(&self.living_room_sqm, "Living room") {
            Ok(value) => value,
            Err(message) => return self.reject(&message),
        };
        let kitchen_sqm = match parse_sqm(&self.kitchen_sqm, "Kitchen") {
            Ok(value) => value,
            Err(message) => return self.reject(&message),
        };

        let bedrooms = match collect_bedrooms(&self.bedrooms) {
            Ok(bedrooms) => bedrooms,
            Err(message) => return self.reject(&message),
        };

        if self.attachments.is_empty() {
            return self.reject(match self.mode {
                DraftMode::Create => "Attach at least one image",
                DraftMode::Edit { .. } => "A listing must keep at least one image",
            });
        }

        let description = {
            let trimmed = self.description.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        self.phase = DraftPhase::Submitting;
        Ok(RealtySubmission {
            title: self.title.trim().to_string(),
            description,
            price_cents,
            price_period: self.price_period,
            location: self.location.trim().to_string(),
            kind: self.kind,
            category: self.category,
            living_room_sqm,
            kitchen_sqm,
            bedrooms,
            images: image_payloads(std::mem::take(&mut self.attachments)),
        })
    }

    pub fn complete(&mut self) {
        *self = Self::new();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = DraftPhase::Failed;
        self.last_error = Some(message.into());
    }

    /// Restore attachments handed out by a failed `begin_submit` round trip.
    pub fn restore_images(&mut self, images: Vec<ImagePayload>) {
        self.attachments = AttachmentSet::from_items(
            images
                .into_iter()
                .map(|image| match image {
                    ImagePayload::Upload(pending) => Attachment::Pending(pending),
                    ImagePayload::Retain { url } => {
                        Attachment::Stored(crate::domain::media::StoredImageRef { url })
                    }
                })
                .collect(),
        );
    }

    fn reject<T>(&mut self, message: &str) -> Result<T, DraftError> {
        self.phase = DraftPhase::Failed;
        self.last_error = Some(message.to_string());
        Err(DraftError::validation(message))
    }

    fn touch(&mut self) {
        if matches!(self.phase, DraftPhase::Empty | DraftPhase::Failed) {
            self.phase = DraftPhase::Editing;
        }
    }
}

fn collect_bedrooms(rows: &[BedroomRow]) -> Result<Vec<BedroomInput>, String> {
    let mut bedrooms = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        if row.name.trim().is_empty() {
            return Err(format!("Bedroom {} needs a name", index + 1));
        }
        let sqm = match row.sqm.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                return Err(format!(
                    "Bedroom {} needs a non-negative floor area",
                    index + 1
                ));
            }
        };
        bedrooms.push(BedroomInput {
            name: row.name.trim().to_string(),
            sqm,
        });
    }
    Ok(bedrooms)
}

/// Parse a user-entered price into integer cents. Currency symbols and digit
/// grouping are tolerated; negative and non-finite amounts are not.
pub fn parse_price(raw: &str) -> Result<i64, String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| format!("`{raw}` is not a valid price"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err("Price must be a non-negative amount".to_string());
    }
    Ok((amount * 100.0).round() as i64)
}

fn parse_sqm(raw: &str, label: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(format!("{label} area must be a non-negative number")),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::domain::media::PendingImage;

    fn tiny_gif() -> PendingImage {
        PendingImage {
            filename: "site.gif".to_string(),
            content_type: "image/gif".to_string(),
            bytes: Bytes::from_static(&[
                0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00,
                0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
                0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
            ]),
        }
    }

    #[test]
    fn gallery_submit_requires_an_image_on_create() {
        let mut draft = GalleryDraft::load(None);
        draft.apply_field("title", "Modern Family Home");
        draft.apply_field("description", "4BR contemporary residence");
        draft.apply_field("category", "residential");

        let err = draft.begin_submit().expect_err("no image attached");
        assert!(matches!(err, DraftError::Validation { .. }));
        assert_eq!(draft.phase(), DraftPhase::Failed);
        // Draft preserved for retry.
        assert_eq!(draft.title, "Modern Family Home");

        draft.attachments.add(vec![tiny_gif()]);
        let submission = draft.begin_submit().expect("valid submission");
        assert_eq!(submission.title, "Modern Family Home");
        assert_eq!(submission.images.len(), 1);
        assert_eq!(draft.phase(), DraftPhase::Submitting);

        draft.complete();
        assert_eq!(draft.phase(), DraftPhase::Empty);
        assert!(draft.title.is_empty());
    }

    #[test]
    fn gallery_edit_prefills_and_keeps_stored_images() {
        use time::OffsetDateTime;
        use uuid::Uuid;

        use crate::domain::entities::{GalleryPostRecord, PostImageRecord};
        use crate::domain::types::GalleryCategory;

        let now = OffsetDateTime::now_utc();
        let post = GalleryPostRecord {
            id: Uuid::new_v4(),
            title: "Warehouse refit".to_string(),
            description: "Full interior renovation".to_string(),
            category: GalleryCategory::Renovation,
            images: vec![PostImageRecord {
                id: Uuid::new_v4(),
                url: "2026/02/one.jpg".to_string(),
                display_order: 0,
                created_at: now,
            }],
            created_at: now,
            updated_at: now,
        };

        let mut draft = GalleryDraft::load(Some(&post));
        assert!(draft.is_edit());
        assert_eq!(draft.edit_id(), Some(post.id));
        assert_eq!(draft.title, "Warehouse refit");
        assert_eq!(draft.attachments.len(), 1);

        // Editing without new uploads is fine: the retained image satisfies
        // the at-least-one-image rule.
        let submission = draft.begin_submit().expect("edit without new images");
        assert!(matches!(
            submission.images[0],
            ImagePayload::Retain { ref url } if url == "2026/02/one.jpg"
        ));
    }

    #[test]
    fn realty_bedroom_rows_keep_one_visible_and_drop_blanks() {
        let mut draft = RealtyDraft::load(None);
        draft.add_bedroom();
        draft.update_bedroom(0, "name", "Master");
        draft.update_bedroom(0, "sqm", "22.5");
        draft.remove_bedroom(1);
        draft.remove_bedroom(0);
        // The last row was replaced with a blank one, never removed outright.
        assert_eq!(draft.bedrooms().len(), 1);
        assert!(draft.bedrooms()[0].name.is_empty());

        draft.update_bedroom(0, "name", "Guest");
        draft.update_bedroom(0, "sqm", "14");
        draft.add_bedroom();

        draft.apply_field("title", "Beachfront Condo");
        draft.apply_field("location", "Santa Monica, CA");
        draft.apply_field("price", "$625,000");
        draft.attachments.add(vec![tiny_gif()]);

        let submission = draft.begin_submit().expect("valid submission");
        assert_eq!(submission.bedrooms.len(), 1);
        assert_eq!(submission.bedrooms[0].name, "Guest");
        assert_eq!(submission.price_cents, 62_500_000);
    }

    #[test]
    fn realty_rejects_negative_numbers() {
        let mut draft = RealtyDraft::load(None);
        draft.apply_field("title", "Lot");
        draft.apply_field("location", "Somewhere");
        draft.apply_field("price", "-10");
        draft.attachments.add(vec![tiny_gif()]);
        assert!(draft.begin_submit().is_err());

        draft.apply_field("price", "10");
        draft.apply_field("living_room_sqm", "-3");
        assert!(draft.begin_submit().is_err());

        draft.apply_field("living_room_sqm", "32.5");
        assert!(draft.begin_submit().is_ok());
    }

    #[test]
    fn failed_submission_preserves_draft_for_retry() {
        let mut draft = GalleryDraft::load(None);
        draft.apply_field("title", "Site works");
        draft.apply_field("description", "Earthworks and drainage");
        draft.attachments.add(vec![tiny_gif()]);

        let submission = draft.begin_submit().expect("valid");
        draft.fail("service unavailable");
        draft.restore_images(submission.images);

        assert_eq!(draft.phase(), DraftPhase::Failed);
        assert_eq!(draft.last_error(), Some("service unavailable"));
        assert_eq!(draft.attachments.len(), 1);

        // Retry succeeds from the Failed phase.
        assert!(draft.begin_submit().is_ok());
    }

    #[test]
    fn price_parser_accepts_grouped_currency_input() {
        assert_eq!(parse_price("850000"), Ok(85_000_000));
        assert_eq!(parse_price("$850,000"), Ok(85_000_000));
        assert_eq!(parse_price("12000.50"), Ok(1_200_050));
        assert!(parse_price("twelve").is_err());
        assert!(parse_price("-5").is_err());
    }
}
