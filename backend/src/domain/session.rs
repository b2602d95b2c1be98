//! Explicit session identity passed into every mutating service call.

use crate::errors::{DomainError, DomainResult};
use shared::{Role, SessionInfo, User};

/// Who is performing an operation. Set at login, dropped at logout; the core
/// only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub username: String,
    pub role: Role,
    pub display_name: String,
}

impl SessionContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            display_name: user.display_name.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate for admin-only mutations
    pub fn require_admin(&self, action: &str) -> DomainResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::forbidden(action))
        }
    }

    pub fn to_info(&self) -> SessionInfo {
        SessionInfo {
            username: self.username.clone(),
            role: self.role,
            display_name: self.display_name.clone(),
        }
    }
}
