//! Password authentication and session resolution.
//!
//! Sessions are opaque bearer tokens of the form `msn_<prefix>_<secret>`.
//! Only the prefix and a SHA-256 digest of the secret are persisted; token
//! verification hashes the presented secret and compares digests in constant
//! time. Resolution always fails open to `Anonymous`: a broken database must
//! push callers toward the login screen, never expose the workspace.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::application::repos::{AccountsRepo, AuditRepo, RepoError, SessionsRepo};
use crate::domain::entities::{AccountRecord, SessionRecord};
use crate::domain::session::Session;

const TOKEN_PREFIX: &str = "msn";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Outcome of a successful sign-in: the bearer token for the cookie and the
/// account it belongs to. The raw token exists only in this value.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub account: AccountRecord,
}

/// A resolved, authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub account: AccountRecord,
    pub session: Session,
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountsRepo>,
    sessions: Arc<dyn SessionsRepo>,
    audit: Arc<dyn AuditRepo>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountsRepo>,
        sessions: Arc<dyn SessionsRepo>,
        audit: Arc<dyn AuditRepo>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            accounts,
            sessions,
            audit,
            session_ttl,
        }
    }

    /// Verify credentials and open a session. Unknown emails and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = email.trim().to_lowercase();
        let Some((account, stored_hash)) = self.accounts.find_credentials(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &stored_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");
        let now = OffsetDateTime::now_utc();

        self.sessions
            .insert_session(SessionRecord {
                prefix,
                secret_digest: hash_secret(&secret),
                account_id: account.id,
                created_at: now,
                expires_at: now + self.session_ttl,
            })
            .await?;

        metrics::counter!("mortar_sign_in_total").increment(1);
        if let Err(err) = self
            .audit
            .record(&account.email, "auth.sign_in", "account", Some(&account.id.to_string()))
            .await
        {
            warn!(target = "mortar::auth", error = %err, "failed to record sign-in audit entry");
        }

        Ok(SignedIn { token, account })
    }

    /// Resolve a bearer token to the caller it identifies. Every failure
    /// path, including persistence errors, resolves to `None` (Anonymous).
    pub async fn resolve(&self, token: &str) -> Option<CurrentUser> {
        let parsed = parse_token(token)?;

        let now = OffsetDateTime::now_utc();
        let found = match self.sessions.find_session(&parsed.prefix, now).await {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    target = "mortar::auth",
                    error = %err,
                    "session lookup failed; treating caller as anonymous"
                );
                return None;
            }
        };
        let (record, account) = found?;

        let presented = hash_secret(&parsed.secret);
        if record.secret_digest.ct_eq(&presented).unwrap_u8() == 0 {
            return None;
        }

        let session = Session::from_role(account.role, account.id);
        Some(CurrentUser { account, session })
    }

    /// Revoke the server-side session. The caller clears its cookie
    /// regardless of the outcome here, so failures are only logged.
    pub async fn sign_out(&self, token: &str) {
        let Some(parsed) = parse_token(token) else {
            return;
        };
        if let Err(err) = self.sessions.delete_session(&parsed.prefix).await {
            warn!(target = "mortar::auth", error = %err, "failed to revoke session");
        }
    }
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.splitn(3, '_');
    if parts.next()? != TOKEN_PREFIX {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

/// Verify a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip_verifies() {
        let hash = hash_password("swordfish").expect("hashes");
        assert!(verify_password("swordfish", &hash));
        assert!(!verify_password("sword", &hash));
        assert!(!verify_password("swordfish", "not-a-hash"));
    }

    #[test]
    fn token_parsing_rejects_malformed_tokens() {
        assert!(parse_token("msn_abc").is_none());
        assert!(parse_token("api_abc_0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("msn__0123456789abcdef0123456789abcdef").is_none());
        assert!(parse_token("msn_abcdef123456_short").is_none());

        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("msn_{prefix}_{secret}");
        let parsed = parse_token(&token).expect("well-formed token");
        assert_eq!(parsed.prefix, prefix);
        assert_eq!(parsed.secret, secret);
    }
}
