use std::sync::Arc;

use uuid::Uuid;

use crate::application::admin::audit::AdminAuditService;
use crate::application::admin::{actor_label, map_repo_error};
use crate::application::auth::{self, CurrentUser};
use crate::application::error::AppError;
use crate::application::repos::{AccountsRepo, CreateAccountParams, RepoError};
use crate::domain::entities::AccountRecord;
use crate::domain::types::Role;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct AdminAccountService {
    accounts: Arc<dyn AccountsRepo>,
    audit: AdminAuditService,
}

impl AdminAccountService {
    pub fn new(accounts: Arc<dyn AccountsRepo>, audit: AdminAuditService) -> Self {
        Self { accounts, audit }
    }

    /// Provision a moderator account. Admin only; duplicate emails surface
    /// the persistence conflict verbatim rather than being retried.
    pub async fn create_moderator(
        &self,
        actor: &CurrentUser,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AccountRecord, AppError> {
        if !actor.session.can_provision_accounts() {
            return Err(AppError::Authorization("provision accounts"));
        }

        let name = name.trim();
        let email = email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Name, email and password are all required"));
        }
        if !email.contains('@') {
            return Err(AppError::validation("Enter a valid email address"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash =
            auth::hash_password(password).map_err(|err| AppError::unexpected(err.to_string()))?;

        let account = match self
            .accounts
            .create_account(CreateAccountParams {
                email: email.clone(),
                name: name.to_string(),
                password_hash,
                role: Role::Moderator,
            })
            .await
        {
            Ok(account) => account,
            Err(RepoError::Duplicate { .. }) => {
                return Err(AppError::conflict(format!(
                    "An account for {email} already exists"
                )));
            }
            Err(err) => return Err(map_repo_error(err)),
        };

        self.audit
            .record(
                actor_label(actor),
                "account.create",
                "account",
                Some(&account.id.to_string()),
            )
            .await
            .map_err(map_repo_error)?;

        Ok(account)
    }

    pub async fn list(&self, actor: &CurrentUser) -> Result<Vec<AccountRecord>, AppError> {
        if !actor.session.can_provision_accounts() {
            return Err(AppError::Authorization("list accounts"));
        }
        self.accounts.list_accounts().await.map_err(map_repo_error)
    }

    /// Delete an account. Admin only, and never the caller's own account.
    pub async fn delete(&self, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
        if !actor.session.can_provision_accounts() {
            return Err(AppError::Authorization("delete accounts"));
        }
        if actor.account.id == id {
            return Err(AppError::validation("You cannot delete your own admin account"));
        }

        self.accounts
            .delete_account(id)
            .await
            .map_err(map_repo_error)?;

        self.audit
            .record(actor_label(actor), "account.delete", "account", Some(&id.to_string()))
            .await
            .map_err(map_repo_error)?;

        Ok(())
    }
}
