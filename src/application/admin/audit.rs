use std::sync::Arc;

use crate::application::repos::{AuditRepo, RepoError};
use crate::domain::entities::AuditLogRecord;

/// Thin wrapper over the audit repository shared by every admin service.
#[derive(Clone)]
pub struct AdminAuditService {
    repo: Arc<dyn AuditRepo>,
}

impl AdminAuditService {
    pub fn new(repo: Arc<dyn AuditRepo>) -> Self {
        Self { repo }
    }

    pub async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
    ) -> Result<(), RepoError> {
        self.repo.record(actor, action, entity_type, entity_id).await
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogRecord>, RepoError> {
        self.repo.recent(limit).await
    }
}
