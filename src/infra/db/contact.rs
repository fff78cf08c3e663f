use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ContactRepo, CreateContactMessageParams, RepoError};
use crate::domain::entities::ContactMessageRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, FromRow)]
struct ContactMessageRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    is_read: bool,
    created_at: OffsetDateTime,
}

impl From<ContactMessageRow> for ContactMessageRecord {
    fn from(row: ContactMessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

const MESSAGE_COLUMNS: &str = "id, name, email, phone, subject, message, is_read, created_at";

#[async_trait]
impl ContactRepo for PostgresRepositories {
    async fn insert_message(
        &self,
        params: CreateContactMessageParams,
    ) -> Result<ContactMessageRecord, RepoError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "INSERT INTO contact_messages (id, name, email, phone, subject, message, is_read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7) \
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.email)
        .bind(&params.phone)
        .bind(&params.subject)
        .bind(&params.message)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn recent_messages(&self, limit: i64) -> Result<Vec<ContactMessageRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
