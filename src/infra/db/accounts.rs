use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    AccountsRepo, CreateAccountParams, RepoError, SessionsRepo,
};
use crate::domain::entities::{AccountRecord, SessionRecord};
use crate::domain::types::Role;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    name: String,
    role: Role,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<AccountRow> for AccountRecord {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    name: String,
    role: Role,
    password_hash: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

const ACCOUNT_COLUMNS: &str = "id, email, name, role, created_at, updated_at";

#[async_trait]
impl AccountsRepo for PostgresRepositories {
    async fn create_account(
        &self,
        params: CreateAccountParams,
    ) -> Result<AccountRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (id, email, name, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&params.email)
        .bind(&params.name)
        .bind(&params.password_hash)
        .bind(params.role)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(AccountRecord, String)>, RepoError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, name, role, password_hash, created_at, updated_at \
             FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| {
            let hash = row.password_hash.clone();
            (
                AccountRecord {
                    id: row.id,
                    email: row.email,
                    name: row.name,
                    role: row.role,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                },
                hash,
            )
        }))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, RepoError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_account(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct SessionJoinRow {
    prefix: String,
    secret_digest: Vec<u8>,
    account_id: Uuid,
    session_created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
    email: String,
    name: String,
    role: Role,
    account_created_at: OffsetDateTime,
    account_updated_at: OffsetDateTime,
}

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO sessions (prefix, secret_digest, account_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&session.prefix)
        .bind(&session.secret_digest)
        .bind(session.account_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_session(
        &self,
        prefix: &str,
        now: OffsetDateTime,
    ) -> Result<Option<(SessionRecord, AccountRecord)>, RepoError> {
        let row = sqlx::query_as::<_, SessionJoinRow>(
            "SELECT s.prefix, s.secret_digest, s.account_id, \
                    s.created_at AS session_created_at, s.expires_at, \
                    a.email, a.name, a.role, \
                    a.created_at AS account_created_at, a.updated_at AS account_updated_at \
             FROM sessions s INNER JOIN accounts a ON a.id = s.account_id \
             WHERE s.prefix = $1 AND s.expires_at > $2",
        )
        .bind(prefix)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| {
            (
                SessionRecord {
                    prefix: row.prefix,
                    secret_digest: row.secret_digest,
                    account_id: row.account_id,
                    created_at: row.session_created_at,
                    expires_at: row.expires_at,
                },
                AccountRecord {
                    id: row.account_id,
                    email: row.email,
                    name: row.name,
                    role: row.role,
                    created_at: row.account_created_at,
                    updated_at: row.account_updated_at,
                },
            )
        }))
    }

    async fn delete_session(&self, prefix: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM sessions WHERE prefix = $1")
            .bind(prefix)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
