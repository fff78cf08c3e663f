//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{
    GalleryCategory, ListingKind, PricePeriod, RealtyCategory, Role,
};

/// Persisted image attached to a post, addressed by its stored path or an
/// absolute URL. `display_order` is dense and zero-based per post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostImageRecord {
    pub id: Uuid,
    pub url: String,
    pub display_order: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryPostRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub images: Vec<PostImageRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedroomRecord {
    pub id: Uuid,
    pub name: String,
    pub sqm: f64,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtyPostRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub price_period: PricePeriod,
    pub location: String,
    pub kind: ListingKind,
    pub category: RealtyCategory,
    pub living_room_sqm: Option<f64>,
    pub kitchen_sqm: Option<f64>,
    pub bedrooms: Vec<BedroomRecord>,
    pub images: Vec<PostImageRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Server-side login session. The cookie token is `msn_<prefix>_<secret>`;
/// only the prefix and the secret's SHA-256 digest are stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub prefix: String,
    pub secret_digest: Vec<u8>,
    pub account_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessageRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditLogRecord {
    pub id: Uuid,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub created_at: OffsetDateTime,
}
