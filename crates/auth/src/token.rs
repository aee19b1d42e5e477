//! Credential issuance and validation (HS256 JWT).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use notekeep_core::UserId;

use crate::{AccessClaims, AuthnError, JwtConfig, Principal, RolePermissions, VerifiedIdentity, validate_claims};

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

/// A freshly minted credential, ready to hand to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// Turns a verified identity into a signed credential.
///
/// Holds no per-request state: one instance is shared by every request.
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    ttl: chrono::Duration,
    encoding_key: EncodingKey,
    mapping: Arc<RolePermissions>,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig, mapping: Arc<RolePermissions>) -> Self {
        Self {
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
            ttl: config.ttl(),
            encoding_key: EncodingKey::from_secret(config.key()),
            mapping,
        }
    }

    /// Build the claim set for `identity` as of `now`.
    ///
    /// The permission claims are exactly the mapping's entry for the role.
    pub fn claims_for(&self, identity: &VerifiedIdentity, now: DateTime<Utc>) -> AccessClaims {
        let iat = now.timestamp();
        AccessClaims {
            sub: identity.user_id.to_string(),
            name: identity.name.clone(),
            role: identity.role,
            permissions: self.mapping.permissions_for(identity.role).to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat.saturating_add(self.ttl.num_seconds()),
        }
    }

    pub fn issue(&self, identity: &VerifiedIdentity, now: DateTime<Utc>) -> Result<IssuedToken, IssueError> {
        let claims = self.claims_for(identity, now);
        let expires_at = claims.expires_at().ok_or(IssueError::ExpiryOutOfRange)?;
        let access_token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        tracing::debug!(
            user_id = %identity.user_id,
            role = %identity.role,
            permissions = claims.permissions.len(),
            "issued access token"
        );

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            expires_at,
        })
    }

    pub fn issue_now(&self, identity: &VerifiedIdentity) -> Result<IssuedToken, IssueError> {
        self.issue(identity, Utc::now())
    }
}

/// Authentication step: turn a bearer string into a [`Principal`].
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthnError>;
}

/// HS256 validator bound to one key, issuer and audience.
pub struct Hs256TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenValidator {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.key()),
            validation,
        }
    }
}

impl TokenValidator for Hs256TokenValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthnError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        validate_claims(&claims, now)?;

        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AuthnError::InvalidSubject(claims.sub.clone()))?;
        let issued_at = claims.issued_at().ok_or(AuthnError::InvalidTimeWindow)?;
        let expires_at = claims.expires_at().ok_or(AuthnError::InvalidTimeWindow)?;

        Ok(Principal {
            user_id,
            name: claims.name,
            role: claims.role,
            permissions: claims.permissions,
            issued_at,
            expires_at,
        })
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthnError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthnError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName | ErrorKind::MissingAlgorithm => {
            AuthnError::InvalidAlgorithm
        }
        ErrorKind::InvalidIssuer => AuthnError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthnError::InvalidAudience,
        ErrorKind::ExpiredSignature => AuthnError::Expired,
        ErrorKind::ImmatureSignature => AuthnError::NotYetValid,
        _ => AuthnError::Malformed(err.to_string()),
    }
}
