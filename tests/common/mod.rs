//! In-memory persistence doubles shared by the integration suites.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use mortar::application::admin::{
    accounts::AdminAccountService, audit::AdminAuditService, bulk::BulkDeleteService,
    gallery::AdminGalleryService, realty::AdminRealtyService,
};
use mortar::application::auth::{AuthService, CurrentUser};
use mortar::application::repos::{
    AccountsRepo, AuditRepo, ContactRepo, CreateAccountParams, CreateContactMessageParams,
    CreateGalleryPostParams, CreateRealtyPostParams, GalleryRepo, GalleryWriteRepo, MediaStore,
    MediaStoreError, RepoError, RealtyRepo, RealtyWriteRepo, SessionsRepo,
    UpdateGalleryPostParams, UpdateRealtyPostParams,
};
use mortar::domain::entities::{
    AccountRecord, AuditLogRecord, BedroomRecord, ContactMessageRecord, GalleryPostRecord,
    PostImageRecord, RealtyPostRecord, SessionRecord,
};
use mortar::domain::session::Session;
use mortar::domain::types::Role;

#[derive(Default)]
pub struct InMemoryGallery {
    pub posts: Mutex<Vec<GalleryPostRecord>>,
    /// Ids whose deletion fails with a persistence error.
    pub poisoned_deletes: Mutex<HashSet<Uuid>>,
}

#[async_trait]
impl GalleryRepo for InMemoryGallery {
    async fn list_posts(&self) -> Result<Vec<GalleryPostRecord>, RepoError> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<GalleryPostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }
}

fn image_records(images: &[mortar::application::repos::NewImage]) -> Vec<PostImageRecord> {
    let now = OffsetDateTime::now_utc();
    images
        .iter()
        .map(|image| PostImageRecord {
            id: Uuid::new_v4(),
            url: image.url.clone(),
            display_order: image.display_order,
            created_at: now,
        })
        .collect()
}

#[async_trait]
impl GalleryWriteRepo for InMemoryGallery {
    async fn create_post(
        &self,
        params: CreateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let post = GalleryPostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            category: params.category,
            images: image_records(&params.images),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        params: UpdateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.description = params.description;
        post.category = params.category;
        post.images = image_records(&params.images);
        post.updated_at = OffsetDateTime::now_utc();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        if self.poisoned_deletes.lock().unwrap().contains(&id) {
            return Err(RepoError::Persistence("storage offline".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRealty {
    pub posts: Mutex<Vec<RealtyPostRecord>>,
    pub poisoned_deletes: Mutex<HashSet<Uuid>>,
}

#[async_trait]
impl RealtyRepo for InMemoryRealty {
    async fn list_posts(&self) -> Result<Vec<RealtyPostRecord>, RepoError> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<RealtyPostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }
}

#[async_trait]
impl RealtyWriteRepo for InMemoryRealty {
    async fn create_post(
        &self,
        params: CreateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let post = RealtyPostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            description: params.description,
            price_cents: params.price_cents,
            price_period: params.price_period,
            location: params.location,
            kind: params.kind,
            category: params.category,
            living_room_sqm: params.living_room_sqm,
            kitchen_sqm: params.kitchen_sqm,
            bedrooms: params
                .bedrooms
                .iter()
                .map(|bedroom| BedroomRecord {
                    id: Uuid::new_v4(),
                    name: bedroom.name.clone(),
                    sqm: bedroom.sqm,
                    position: bedroom.position,
                })
                .collect(),
            images: image_records(&params.images),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        params: UpdateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.description = params.description;
        post.price_cents = params.price_cents;
        post.price_period = params.price_period;
        post.location = params.location;
        post.kind = params.kind;
        post.category = params.category;
        post.living_room_sqm = params.living_room_sqm;
        post.kitchen_sqm = params.kitchen_sqm;
        post.bedrooms = params
            .bedrooms
            .iter()
            .map(|bedroom| BedroomRecord {
                id: Uuid::new_v4(),
                name: bedroom.name.clone(),
                sqm: bedroom.sqm,
                position: bedroom.position,
            })
            .collect();
        post.images = image_records(&params.images);
        post.updated_at = OffsetDateTime::now_utc();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        if self.poisoned_deletes.lock().unwrap().contains(&id) {
            return Err(RepoError::Persistence("storage offline".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAccounts {
    pub accounts: Mutex<Vec<(AccountRecord, String)>>,
    pub sessions: Mutex<Vec<SessionRecord>>,
}

#[async_trait]
impl AccountsRepo for InMemoryAccounts {
    async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<AccountRecord, RepoError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .iter()
            .any(|(account, _)| account.email == params.email)
        {
            return Err(RepoError::Duplicate {
                constraint: "accounts_email_key".to_string(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let account = AccountRecord {
            id: Uuid::new_v4(),
            email: params.email,
            name: params.name,
            role: params.role,
            created_at: now,
            updated_at: now,
        };
        accounts.push((account.clone(), params.password_hash));
        Ok(account)
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(AccountRecord, String)>, RepoError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(account, _)| account.email == email)
            .cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, RepoError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(account, _)| account.clone())
            .collect())
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), RepoError> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|(account, _)| account.id != id);
        if accounts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionsRepo for InMemoryAccounts {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        self.sessions.lock().unwrap().push(session);
        Ok(())
    }

    async fn find_session(
        &self,
        prefix: &str,
        now: OffsetDateTime,
    ) -> Result<Option<(SessionRecord, AccountRecord)>, RepoError> {
        let sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions
            .iter()
            .find(|session| session.prefix == prefix && session.expires_at > now)
            .cloned()
        else {
            return Ok(None);
        };
        drop(sessions);

        let account = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(account, _)| account.id == session.account_id)
            .map(|(account, _)| account.clone());
        Ok(account.map(|account| (session, account)))
    }

    async fn delete_session(&self, prefix: &str) -> Result<(), RepoError> {
        self.sessions
            .lock()
            .unwrap()
            .retain(|session| session.prefix != prefix);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryContact {
    pub messages: Mutex<Vec<ContactMessageRecord>>,
}

#[async_trait]
impl ContactRepo for InMemoryContact {
    async fn insert_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError> {
        let message = ContactMessageRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            phone: params.phone,
            subject: params.subject,
            message: params.message,
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ContactMessageRecord>, RepoError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryAudit {
    pub entries: Mutex<Vec<AuditLogRecord>>,
}

#[async_trait]
impl AuditRepo for InMemoryAudit {
    async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
    ) -> Result<(), RepoError> {
        self.entries.lock().unwrap().push(AuditLogRecord {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.map(|id| id.to_string()),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, RepoError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().rev().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryMedia {
    pub stored: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStore for InMemoryMedia {
    async fn store(&self, original_name: &str, data: Bytes) -> Result<String, MediaStoreError> {
        if data.is_empty() {
            return Err(MediaStoreError::EmptyPayload);
        }
        let path = format!("mem/{}-{original_name}", Uuid::new_v4());
        self.stored.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove(&self, stored_path: &str) -> Result<(), MediaStoreError> {
        self.removed.lock().unwrap().push(stored_path.to_string());
        Ok(())
    }
}

/// Everything a service-level test needs, wired over the in-memory doubles.
pub struct Harness {
    pub gallery_repo: Arc<InMemoryGallery>,
    pub realty_repo: Arc<InMemoryRealty>,
    pub accounts_repo: Arc<InMemoryAccounts>,
    pub contact_repo: Arc<InMemoryContact>,
    pub audit_repo: Arc<InMemoryAudit>,
    pub media: Arc<InMemoryMedia>,
    pub gallery: AdminGalleryService,
    pub realty: AdminRealtyService,
    pub accounts: AdminAccountService,
    pub bulk: BulkDeleteService,
    pub auth: AuthService,
}

impl Harness {
    pub fn new() -> Self {
        let gallery_repo = Arc::new(InMemoryGallery::default());
        let realty_repo = Arc::new(InMemoryRealty::default());
        let accounts_repo = Arc::new(InMemoryAccounts::default());
        let contact_repo = Arc::new(InMemoryContact::default());
        let audit_repo = Arc::new(InMemoryAudit::default());
        let media = Arc::new(InMemoryMedia::default());

        let audit = AdminAuditService::new(audit_repo.clone());
        let gallery = AdminGalleryService::new(
            gallery_repo.clone(),
            gallery_repo.clone(),
            media.clone(),
            audit.clone(),
        );
        let realty = AdminRealtyService::new(
            realty_repo.clone(),
            realty_repo.clone(),
            media.clone(),
            audit.clone(),
        );
        let accounts = AdminAccountService::new(accounts_repo.clone(), audit.clone());
        let bulk = BulkDeleteService::new(gallery.clone(), realty.clone());
        let auth = AuthService::new(
            accounts_repo.clone(),
            accounts_repo.clone(),
            audit_repo.clone(),
            time::Duration::hours(2),
        );

        Self {
            gallery_repo,
            realty_repo,
            accounts_repo,
            contact_repo,
            audit_repo,
            media,
            gallery,
            realty,
            accounts,
            bulk,
            auth,
        }
    }

    pub async fn admin_user(&self) -> CurrentUser {
        self.user_with_role(Role::Admin, "boss@example.com").await
    }

    pub async fn moderator_user(&self) -> CurrentUser {
        self.user_with_role(Role::Moderator, "junior@example.com")
            .await
    }

    async fn user_with_role(&self, role: Role, email: &str) -> CurrentUser {
        let hash = mortar::application::auth::hash_password("swordfish").unwrap();
        let account = self
            .accounts_repo
            .create_account(CreateAccountParams {
                email: email.to_string(),
                name: "Test User".to_string(),
                password_hash: hash,
                role,
            })
            .await
            .unwrap();
        let session = Session::from_role(role, account.id);
        CurrentUser { account, session }
    }
}

/// Smallest well-formed GIF payload that sniffs as an image.
pub fn tiny_gif() -> Bytes {
    Bytes::from_static(&[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
        0x00, 0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
        0x02, 0x44, 0x01, 0x00, 0x3b,
    ])
}
