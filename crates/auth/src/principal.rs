use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notekeep_core::UserId;

use crate::{Permission, Role};

/// Identity that has already been verified (password check, Telegram
/// init-data check, ...). Input to the token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

/// A validated credential, as seen by the gate and by handlers.
///
/// Constructed only by a [`TokenValidator`](crate::TokenValidator); handlers
/// read the caller's id from here and pass it explicitly to the stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
