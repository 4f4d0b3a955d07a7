// board-collab-service/src/models/permissions.rs
use crate::models::{CollaborationRole, Visibility};
use serde::{Deserialize, Serialize};

// Capabilities of one principal on one project, computed per request
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectivePermissions {
    pub is_collaborator: bool,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
}

impl EffectivePermissions {
    pub fn owner() -> Self {
        Self {
            is_collaborator: true,
            can_read: true,
            can_write: true,
            can_delete: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    // Delete is never delegated, whatever the role
    pub fn for_role(role: CollaborationRole) -> Self {
        Self {
            is_collaborator: true,
            can_read: true,
            can_write: role == CollaborationRole::Editor,
            can_delete: false,
        }
    }

    // Public projects are readable by anyone; that policy lives here, not in the resolver
    pub fn may_read(&self, visibility: Visibility) -> bool {
        self.can_read || visibility == Visibility::Public
    }
}
