//! Caller identity and the capabilities each role carries.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::types::Role;

/// Resolved caller identity. Exactly one variant holds at any time; resolution
/// itself is asynchronous and callers must not treat "still resolving" as
/// `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Session {
    Anonymous,
    Admin { account_id: Uuid },
    Moderator { account_id: Uuid },
}

impl Session {
    pub fn from_role(role: Role, account_id: Uuid) -> Self {
        match role {
            Role::Admin => Self::Admin { account_id },
            Role::Moderator => Self::Moderator { account_id },
        }
    }

    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            Self::Anonymous => None,
            Self::Admin { account_id } | Self::Moderator { account_id } => Some(*account_id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Create and edit posts. Held by both admin and moderator.
    pub fn can_publish(&self) -> bool {
        !self.is_anonymous()
    }

    /// Delete posts and accounts. Admin only.
    pub fn can_delete(&self) -> bool {
        self.is_admin()
    }

    /// Provision moderator accounts. Admin only.
    pub fn can_provision_accounts(&self) -> bool {
        self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderator_may_publish_but_not_delete_or_provision() {
        let session = Session::from_role(Role::Moderator, Uuid::new_v4());
        assert!(session.can_publish());
        assert!(!session.can_delete());
        assert!(!session.can_provision_accounts());
    }

    #[test]
    fn admin_holds_every_capability() {
        let session = Session::from_role(Role::Admin, Uuid::new_v4());
        assert!(session.can_publish());
        assert!(session.can_delete());
        assert!(session.can_provision_accounts());
    }

    #[test]
    fn anonymous_holds_none() {
        let session = Session::Anonymous;
        assert!(!session.can_publish());
        assert!(!session.can_delete());
        assert!(session.account_id().is_none());
    }
}
