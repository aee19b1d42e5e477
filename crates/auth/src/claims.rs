use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Permission, Role};

/// Claim type under which permission strings are carried.
pub const PERMISSION_CLAIM: &str = "Permission";

/// JWT claims model.
///
/// This is the exact payload the issuer signs and the validator decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id as a decimal string.
    pub sub: String,

    /// Display name.
    pub name: String,

    pub role: Role,

    /// One entry per granted permission.
    #[serde(rename = "Permission", default)]
    pub permissions: Vec<Permission>,

    pub iss: String,
    pub aud: String,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

impl AccessClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Authentication failure: the credential cannot be trusted.
///
/// Distinct from [`AuthzError`](crate::AuthzError), which means the credential
/// is fine but lacks a permission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthnError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("unexpected signing algorithm")]
    InvalidAlgorithm,

    #[error("token issuer mismatch")]
    InvalidIssuer,

    #[error("token audience mismatch")]
    InvalidAudience,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("invalid token subject: {0}")]
    InvalidSubject(String),
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature, issuer and audience are checked by the validator before this
/// runs; this only looks at `iat`/`exp` against `now`.
pub fn validate_claims(claims: &AccessClaims, now: DateTime<Utc>) -> Result<(), AuthnError> {
    if claims.exp <= claims.iat {
        return Err(AuthnError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(AuthnError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(AuthnError::Expired);
    }
    Ok(())
}
