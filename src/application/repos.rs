//! Repository and storage traits describing persistence adapters.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    AccountRecord, AuditLogRecord, ContactMessageRecord, GalleryPostRecord, RealtyPostRecord,
    SessionRecord,
};
use crate::domain::types::{
    GalleryCategory, ListingKind, PricePeriod, RealtyCategory, Role,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// One image to persist for a post. `display_order` is dense, zero-based,
/// assigned from submission order before the repo is called.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub display_order: i32,
}

#[derive(Debug, Clone)]
pub struct CreateGalleryPostParams {
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone)]
pub struct UpdateGalleryPostParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: GalleryCategory,
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone)]
pub struct NewBedroom {
    pub name: String,
    pub sqm: f64,
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct CreateRealtyPostParams {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub price_period: PricePeriod,
    pub location: String,
    pub kind: ListingKind,
    pub category: RealtyCategory,
    pub living_room_sqm: Option<f64>,
    pub kitchen_sqm: Option<f64>,
    pub bedrooms: Vec<NewBedroom>,
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone)]
pub struct UpdateRealtyPostParams {
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
    pub bedrooms: Vec<NewBedroom>,
    pub images: Vec<NewImage>,
}

/// Read side of the gallery aggregate. Lists return posts newest-first with
/// their images ordered by display order (insertion order breaking ties).
#[async_trait]
pub trait GalleryRepo: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<GalleryPostRecord>, RepoError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<GalleryPostRecord>, RepoError>;
}

/// Write side of the gallery aggregate. `update_post` replaces scalar fields
/// and the image collection wholesale, atomically; `delete_post` cascades to
/// the images.
#[async_trait]
pub trait GalleryWriteRepo: Send + Sync {
    async fn create_post(
        &self,
        params: CreateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError>;

    async fn update_post(
        &self,
        params: UpdateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait RealtyRepo: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<RealtyPostRecord>, RepoError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<RealtyPostRecord>, RepoError>;
}

#[async_trait]
pub trait RealtyWriteRepo: Send + Sync {
    async fn create_post(
        &self,
        params: CreateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError>;

    async fn update_post(
        &self,
        params: UpdateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait AccountsRepo: Send + Sync {
    async fn create_account(&self, params: CreateAccountParams)
    -> Result<AccountRecord, RepoError>;

    /// Credential lookup; returns the account together with its stored hash.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(AccountRecord, String)>, RepoError>;

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, RepoError>;

    async fn delete_account(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError>;

    /// Resolve a token prefix to the live session and its account. Expired
    /// sessions are not returned; secret verification happens in the caller.
    async fn find_session(
        &self,
        prefix: &str,
        now: OffsetDateTime,
    ) -> Result<Option<(SessionRecord, AccountRecord)>, RepoError>;

    async fn delete_session(&self, prefix: &str) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateContactMessageParams {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn insert_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError>;

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ContactMessageRecord>, RepoError>;
}

#[async_trait]
pub trait AuditRepo: Send + Sync {
    async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
    ) -> Result<(), RepoError>;

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, RepoError>;
}

#[derive(Debug, Error)]
pub enum MediaStoreError {
    #[error("invalid stored path")]
    InvalidPath,
    #[error("stored payload is empty")]
    EmptyPayload,
    #[error("media storage failure: {0}")]
    Storage(String),
}

/// Boundary for opaque image payload storage. Implemented by the filesystem
/// adapter; tests substitute an in-memory store.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist a payload and return the relative stored path used as its URL.
    async fn store(&self, original_name: &str, data: Bytes) -> Result<String, MediaStoreError>;

    /// Remove a stored payload. Missing payloads are treated as success.
    async fn remove(&self, stored_path: &str) -> Result<(), MediaStoreError>;
}
