//! Users, the seed admin and credential checks.

use super::auth::PasswordVerifier;
use super::session::SessionContext;
use super::validation::require_text;
use crate::config::SeedAdminConfig;
use crate::errors::{DomainError, DomainResult, StoreError};
use crate::storage::{RecordStore, TableRepository};
use shared::{CreateUserRequest, Role, User};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct UserService {
    users: TableRepository<User>,
    verifier: Arc<dyn PasswordVerifier>,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>, verifier: Arc<dyn PasswordVerifier>) -> Self {
        Self {
            users: TableRepository::new(store),
            verifier,
        }
    }

    /// Create the configured admin when the user table is empty.
    /// Returns whether a user was created.
    pub async fn ensure_seed_admin(&self, seed: &SeedAdminConfig) -> DomainResult<bool> {
        let snapshot = self.users.snapshot().await?;
        if !snapshot.records.is_empty() {
            return Ok(false);
        }

        let admin = User {
            username: seed.username.clone(),
            password_hash: self.verifier.hash(&seed.password),
            role: Role::Admin,
            display_name: seed.display_name.clone(),
        };
        match self.users.replace_all(&[admin], Some(snapshot.version)).await {
            Ok(_) => {
                info!(username = %seed.username, "seed admin created");
                Ok(true)
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("user table changed while seeding, seed admin skipped");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn register(&self, ctx: &SessionContext, request: CreateUserRequest) -> DomainResult<User> {
        ctx.require_admin("register users")?;
        let username = require_text("username", &request.username)?;
        let display_name = require_text("display_name", &request.display_name)?;
        if request.password.is_empty() {
            return Err(DomainError::Validation("password must not be empty".to_string()));
        }

        let existing = self.users.list().await?;
        if existing
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&username))
        {
            return Err(DomainError::UsernameTaken { username });
        }

        let user = User {
            username,
            password_hash: self.verifier.hash(&request.password),
            role: request.role,
            display_name,
        };
        self.users.append(&user).await?;
        info!(username = %user.username, role = %user.role, by = %ctx.username, "registered user");
        Ok(user)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<SessionContext> {
        let username = username.trim();
        let user = self
            .users
            .find(username)
            .await?
            .filter(|user| self.verifier.verify(password, &user.password_hash))
            .ok_or(DomainError::InvalidCredentials)?;
        info!(username, role = %user.role, "login");
        Ok(SessionContext::from_user(&user))
    }

    pub async fn list(&self, ctx: &SessionContext) -> DomainResult<Vec<User>> {
        ctx.require_admin("list users")?;
        Ok(self.users.list().await?)
    }
}
