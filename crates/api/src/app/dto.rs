use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notekeep_auth::{IssuedToken, Role, VerifiedIdentity};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TelegramLoginRequest {
    pub init_data: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize)]
pub struct LinkTelegramRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub name: String,
    pub role: Role,
}

impl LoginResponse {
    pub fn new(token: IssuedToken, identity: VerifiedIdentity) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_at: token.expires_at,
            name: identity.name,
            role: identity.role,
        }
    }
}
