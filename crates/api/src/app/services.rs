use std::sync::Arc;

use notekeep_auth::{Hs256TokenValidator, JwtConfig, Role, RolePermissions, TokenIssuer, TokenValidator};
use notekeep_core::DomainResult;

use crate::config::{ApiConfig, SeedAdmin};
use crate::store::{NoteStore, ReminderStore, UserDirectory, UserRecord};

/// Everything a handler needs, shared behind one `Arc`.
///
/// The issuer, validator and mapping are immutable after construction; the
/// stores synchronize internally.
pub struct AppServices {
    pub mapping: Arc<RolePermissions>,
    pub issuer: TokenIssuer,
    pub validator: Arc<dyn TokenValidator>,
    pub users: UserDirectory,
    pub notes: NoteStore,
    pub reminders: ReminderStore,
    pub telegram_bot_token: Option<String>,
}

impl AppServices {
    pub fn new(jwt: &JwtConfig, mapping: RolePermissions, telegram_bot_token: Option<String>) -> Self {
        let mapping = Arc::new(mapping);
        Self {
            issuer: TokenIssuer::new(jwt, Arc::clone(&mapping)),
            validator: Arc::new(Hs256TokenValidator::new(jwt)),
            mapping,
            users: UserDirectory::new(),
            notes: NoteStore::new(),
            reminders: ReminderStore::new(),
            telegram_bot_token,
        }
    }

    /// Production wiring: default role table plus settings from config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            &config.jwt,
            RolePermissions::default(),
            config.telegram_bot_token.clone(),
        )
    }

    /// Create the configured administrator unless an account with that name
    /// already exists.
    pub fn seed_admin(&self, seed: &SeedAdmin) -> DomainResult<Option<UserRecord>> {
        if self.users.find_by_name(&seed.name)?.is_some() {
            return Ok(None);
        }
        self.users.create(&seed.name, &seed.password, Role::Admin).map(Some)
    }
}
