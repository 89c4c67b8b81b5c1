//! Actor identity and permission levels supplied by the identity provider.

use super::UserId;
use serde::{Deserialize, Serialize};

/// Permission level for the task functional area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionLevel {
    /// May only see tasks assigned to them.
    Restricted,
    /// May see all tasks, no review rights.
    Viewer,
    /// Full access, including review.
    Editor,
}

/// The user acting on a task, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    permission: PermissionLevel,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, permission: PermissionLevel) -> Self {
        Self {
            user_id,
            permission,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the permission level for the task area.
    #[must_use]
    pub const fn permission(&self) -> PermissionLevel {
        self.permission
    }

    /// Returns whether the actor holds review rights.
    #[must_use]
    pub const fn is_reviewer(&self) -> bool {
        matches!(self.permission, PermissionLevel::Editor)
    }
}
