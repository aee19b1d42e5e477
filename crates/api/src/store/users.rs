use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use notekeep_auth::{Role, VerifiedIdentity};
use notekeep_core::{DomainError, DomainResult, UserId};

use super::{Argon2PasswordHasher, Page, Paging, contains_ci};

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub telegram_username: Option<String>,
}

impl UserRecord {
    pub fn identity(&self) -> VerifiedIdentity {
        VerifiedIdentity {
            user_id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl UserFilter {
    pub fn paging(&self) -> Paging {
        Paging {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("user not found")]
    UnknownUser,

    #[error("invalid user password")]
    InvalidPassword,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Default)]
struct UserTable {
    last_id: i64,
    by_id: BTreeMap<UserId, UserRecord>,
}

/// User accounts keyed by id; names and linked Telegram usernames are unique.
pub struct UserDirectory {
    inner: RwLock<UserTable>,
    hasher: Argon2PasswordHasher,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(UserTable::default()),
            hasher: Argon2PasswordHasher::new(),
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, UserTable>> {
        self.inner
            .read()
            .map_err(|_| DomainError::internal("user directory lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, UserTable>> {
        self.inner
            .write()
            .map_err(|_| DomainError::internal("user directory lock poisoned"))
    }

    pub fn create(&self, name: &str, password: &str, role: Role) -> DomainResult<UserRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }

        // Hash before taking the lock; Argon2 is deliberately slow.
        let password_hash = self.hasher.hash_password(password)?;

        let mut table = self.write()?;
        if table.by_id.values().any(|u| u.name == name) {
            return Err(DomainError::conflict(format!("user '{name}' already exists")));
        }
        table.last_id += 1;
        let record = UserRecord {
            id: UserId::new(table.last_id),
            name: name.to_string(),
            password_hash,
            role,
            telegram_username: None,
        };
        table.by_id.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn get(&self, id: UserId) -> DomainResult<UserRecord> {
        self.read()?
            .by_id
            .get(&id)
            .cloned()
            .ok_or(DomainError::not_found("user"))
    }

    pub fn find_by_name(&self, name: &str) -> DomainResult<Option<UserRecord>> {
        Ok(self.read()?.by_id.values().find(|u| u.name == name).cloned())
    }

    pub fn find_by_telegram(&self, username: &str) -> DomainResult<Option<UserRecord>> {
        let username = normalize_telegram(username);
        Ok(self
            .read()?
            .by_id
            .values()
            .find(|u| u.telegram_username.as_deref() == Some(username.as_str()))
            .cloned())
    }

    /// Password check. Success yields the identity the token issuer needs.
    pub fn verify_credentials(&self, name: &str, password: &str) -> Result<VerifiedIdentity, LoginError> {
        let user = self.find_by_name(name.trim())?.ok_or(LoginError::UnknownUser)?;
        if self.hasher.verify_password(password, &user.password_hash)? {
            Ok(user.identity())
        } else {
            Err(LoginError::InvalidPassword)
        }
    }

    pub fn list(&self, filter: &UserFilter) -> DomainResult<Page<UserRecord>> {
        let matches: Vec<UserRecord> = self
            .read()?
            .by_id
            .values()
            .filter(|u| contains_ci(&u.name, filter.name.as_deref()))
            .cloned()
            .collect();
        Ok(filter.paging().apply(matches))
    }

    /// Administrative role change. Credentials already issued keep their
    /// claims until they expire.
    pub fn set_role(&self, id: UserId, role: Role) -> DomainResult<UserRecord> {
        let mut table = self.write()?;
        let user = table.by_id.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.role = role;
        Ok(user.clone())
    }

    pub fn delete(&self, id: UserId) -> DomainResult<UserRecord> {
        self.write()?
            .by_id
            .remove(&id)
            .ok_or(DomainError::not_found("user"))
    }

    pub fn link_telegram(&self, id: UserId, username: &str) -> DomainResult<UserRecord> {
        let username = normalize_telegram(username);
        if username.is_empty() {
            return Err(DomainError::validation("telegram username must not be empty"));
        }

        let mut table = self.write()?;
        let taken = table
            .by_id
            .values()
            .any(|u| u.id != id && u.telegram_username.as_deref() == Some(username.as_str()));
        if taken {
            return Err(DomainError::conflict("telegram account is linked to another user"));
        }
        let user = table.by_id.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        user.telegram_username = Some(username);
        Ok(user.clone())
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Telegram usernames are case-insensitive and often typed with a leading `@`.
fn normalize_telegram(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}
