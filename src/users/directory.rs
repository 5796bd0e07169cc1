//! User Directory
//! Mission: Manage user records with uniqueness and role validity rules

use crate::auth::{
    credentials::{self, CredentialError},
    models::{Identity, UserRole},
    user_store::{StoreError, StoredUser, UserChanges, UserStore},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const INCOMPLETE_PARAMETERS: &str = "Incomplete parameters";

/// Username given to the bootstrap administrator
pub const BOOTSTRAP_ADMIN: &str = "admin";

/// Non-sensitive projection returned by `list`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    pub role: UserRole,
}

/// Single-user view returned by `get` and `update`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub username: String,
    pub role: UserRole,
}

impl From<StoredUser> for UserProfile {
    fn from(user: StoredUser) -> Self {
        Self {
            name: user.name,
            username: user.username,
            role: user.role,
        }
    }
}

/// Create request. Every field is required; they are optional here so a
/// missing one is reported as invalid input rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Update request. Only `name` and `role` are recognised; anything else in
/// the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User {0} already exists")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("User {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// All users as `{name, role}`
    pub fn list(&self) -> Result<Vec<UserSummary>, DirectoryError> {
        let users = self.store.list()?;

        Ok(users
            .into_iter()
            .map(|u| UserSummary {
                name: u.name,
                role: u.role,
            })
            .collect())
    }

    pub fn get(&self, username: &str) -> Result<UserProfile, DirectoryError> {
        self.store
            .find(username)?
            .map(UserProfile::from)
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))
    }

    pub fn create(&self, data: NewUser) -> Result<UserProfile, DirectoryError> {
        let name = required(data.name.as_deref())?;
        let role = required(data.role.as_deref())?;
        let password = data
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(DirectoryError::InvalidInput(INCOMPLETE_PARAMETERS))?;

        // Usernames are keys: checked as submitted, never trimmed
        let username = data
            .username
            .as_deref()
            .filter(|u| !u.is_empty() && !u.chars().any(char::is_whitespace))
            .ok_or(DirectoryError::InvalidInput(INCOMPLETE_PARAMETERS))?;

        let role = UserRole::parse(role).ok_or(DirectoryError::InvalidInput(INCOMPLETE_PARAMETERS))?;

        let user = StoredUser {
            username: username.to_string(),
            name: name.to_string(),
            role,
            credential: credentials::create(password)?,
        };

        self.store.insert(&user).map_err(|e| match e {
            StoreError::Duplicate(username) => DirectoryError::Conflict(username),
            other => other.into(),
        })?;

        info!("✅ Created user: {} ({})", user.username, user.role);

        Ok(user.into())
    }

    /// Apply `name`/`role` changes. Tokens already issued keep their old role
    /// until they expire.
    pub fn update(&self, username: &str, patch: UserPatch) -> Result<UserProfile, DirectoryError> {
        let changes = UserChanges {
            name: patch.name.as_deref().map(|n| required(Some(n))).transpose()?.map(str::to_string),
            role: patch
                .role
                .as_deref()
                .map(|r| UserRole::parse(r).ok_or(DirectoryError::InvalidInput(INCOMPLETE_PARAMETERS)))
                .transpose()?,
        };

        let updated = self
            .store
            .update(username, &changes)?
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))?;

        info!("✏️  Updated user: {} ({})", updated.username, updated.role);

        Ok(updated.into())
    }

    pub fn delete(&self, username: &str) -> Result<(), DirectoryError> {
        if !self.store.delete(username)? {
            return Err(DirectoryError::NotFound(username.to_string()));
        }

        info!("🗑️  Deleted user: {}", username);
        Ok(())
    }

    /// Check login credentials. Unknown user and wrong password both yield `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Identity>, DirectoryError> {
        let Some(user) = self.store.find(username)? else {
            credentials::verify_unknown(password)?;
            return Ok(None);
        };

        if !credentials::verify(password, &user.credential.hash, &user.credential.salt)? {
            return Ok(None);
        }

        Ok(Some(Identity {
            username: user.username,
            role: user.role,
        }))
    }

    /// Provision the bootstrap administrator when the directory has no admin
    pub fn ensure_admin(&self, password: Option<&str>) -> Result<(), DirectoryError> {
        if self.store.count_with_role(UserRole::Admin)? > 0 {
            return Ok(());
        }

        let Some(password) = password else {
            warn!("⚠️  No admin user exists and BOOTSTRAP_ADMIN_PASSWORD is not set");
            return Ok(());
        };

        self.create(NewUser {
            name: Some("Administrator".to_string()),
            username: Some(BOOTSTRAP_ADMIN.to_string()),
            password: Some(password.to_string()),
            role: Some(UserRole::Admin.as_str().to_string()),
        })?;

        info!("🔐 Bootstrap admin user created (username: {})", BOOTSTRAP_ADMIN);
        Ok(())
    }
}

fn required(value: Option<&str>) -> Result<&str, DirectoryError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DirectoryError::InvalidInput(INCOMPLETE_PARAMETERS))
}
