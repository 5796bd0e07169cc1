//! User Storage
//! Mission: Persist user records keyed by username
//!
//! `UserStore` is the seam to the backing document store. Username
//! uniqueness is enforced here, by the store, and reported as
//! `StoreError::Duplicate`.

use crate::auth::{credentials::Credential, models::UserRole};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Full user record as persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub username: String,
    pub name: String,
    pub role: UserRole,
    pub credential: Credential,
}

/// Mutable fields of a stored user. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists: {0}")]
    Duplicate(String),
    #[error("corrupt user record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Backing store for user records
pub trait UserStore: Send + Sync {
    /// Insert a new record; fails with `Duplicate` if the username is taken
    fn insert(&self, user: &StoredUser) -> Result<(), StoreError>;

    fn find(&self, username: &str) -> Result<Option<StoredUser>, StoreError>;

    /// All records in insertion order
    fn list(&self) -> Result<Vec<StoredUser>, StoreError>;

    /// Apply changes; returns the updated record, or `None` if absent
    fn update(&self, username: &str, changes: &UserChanges) -> Result<Option<StoredUser>, StoreError>;

    /// Remove a record; returns whether it existed
    fn delete(&self, username: &str) -> Result<bool, StoreError>;

    fn count_with_role(&self, role: UserRole) -> Result<usize, StoreError>;
}

/// User storage with SQLite backend
pub struct SqliteUserStore {
    db_path: String,
}

type UserRow = (String, String, String, String, String);

const SELECT_COLUMNS: &str = "SELECT username, name, role, password_hash, password_salt FROM users";

impl SqliteUserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        info!("🗄️  User store ready at {}", db_path);
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;

        // BINARY collation keeps usernames case-sensitive
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                password_salt TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn into_user((username, name, role, hash, salt): UserRow) -> Result<StoredUser, StoreError> {
        let role = UserRole::parse(&role)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown role '{}' for {}", role, username)))?;

        Ok(StoredUser {
            username,
            name,
            role,
            credential: Credential { hash, salt },
        })
    }
}

impl UserStore for SqliteUserStore {
    fn insert(&self, user: &StoredUser) -> Result<(), StoreError> {
        let conn = self.connect()?;

        let result = conn.execute(
            "INSERT INTO users (username, name, role, password_hash, password_salt)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.name,
                user.role.as_str(),
                user.credential.hash,
                user.credential.salt,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Duplicate(user.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        let conn = self.connect()?;

        let row = conn
            .query_row(
                &format!("{} WHERE username = ?1", SELECT_COLUMNS),
                params![username],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::into_user).transpose()
    }

    fn list(&self) -> Result<Vec<StoredUser>, StoreError> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::into_user).collect()
    }

    fn update(&self, username: &str, changes: &UserChanges) -> Result<Option<StoredUser>, StoreError> {
        let conn = self.connect()?;

        let rows_affected = conn.execute(
            "UPDATE users SET name = COALESCE(?2, name), role = COALESCE(?3, role)
             WHERE username = ?1",
            params![
                username,
                changes.name,
                changes.role.map(|r| r.as_str()),
            ],
        )?;

        if rows_affected == 0 {
            return Ok(None);
        }

        let row = conn
            .query_row(
                &format!("{} WHERE username = ?1", SELECT_COLUMNS),
                params![username],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::into_user).transpose()
    }

    fn delete(&self, username: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;

        let rows_affected = conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;

        Ok(rows_affected > 0)
    }

    fn count_with_role(&self, role: UserRole) -> Result<usize, StoreError> {
        let conn = self.connect()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![role.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }
}
