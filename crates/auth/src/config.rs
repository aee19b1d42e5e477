//! Token signing configuration.
//!
//! Built once at startup. A missing or weak key is a [`ConfigError`] so the
//! process refuses to start instead of failing on the first login.

use chrono::Duration;
use thiserror::Error;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_KEY_BYTES: usize = 32;

/// Default credential lifetime.
pub const DEFAULT_TTL_MINUTES: i64 = 120;

/// Longest accepted credential lifetime (7 days).
pub const MAX_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Signing key, issuer, audience and lifetime for issued credentials.
#[derive(Clone)]
pub struct JwtConfig {
    key: Vec<u8>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl core::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(
        key: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if key.is_empty() {
            return Err(ConfigError::Missing("JWT_KEY"));
        }
        if key.len() < MIN_KEY_BYTES {
            return Err(ConfigError::Invalid {
                name: "JWT_KEY",
                reason: format!("must be at least {MIN_KEY_BYTES} bytes, got {}", key.len()),
            });
        }
        if issuer.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_ISSUER"));
        }
        if audience.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_AUDIENCE"));
        }

        Ok(Self {
            key,
            issuer,
            audience,
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        })
    }

    /// Read `JWT_KEY`, `JWT_ISSUER`, `JWT_AUDIENCE` and the optional
    /// `JWT_TTL_MINUTES` through `lookup`.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup("JWT_KEY").ok_or(ConfigError::Missing("JWT_KEY"))?;
        let issuer = lookup("JWT_ISSUER").ok_or(ConfigError::Missing("JWT_ISSUER"))?;
        let audience = lookup("JWT_AUDIENCE").ok_or(ConfigError::Missing("JWT_AUDIENCE"))?;
        let config = Self::new(key.into_bytes(), issuer, audience)?;

        match lookup("JWT_TTL_MINUTES").filter(|v| !v.trim().is_empty()) {
            None => Ok(config),
            Some(raw) => {
                let minutes = raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                    name: "JWT_TTL_MINUTES",
                    reason: e.to_string(),
                })?;
                let ttl = Duration::try_minutes(minutes).ok_or_else(|| ConfigError::Invalid {
                    name: "JWT_TTL_MINUTES",
                    reason: format!("{minutes} minutes is out of range"),
                })?;
                config.with_ttl(ttl)
            }
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        if ttl <= Duration::zero() {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_MINUTES",
                reason: "must be positive".to_string(),
            });
        }
        if ttl > Duration::minutes(MAX_TTL_MINUTES) {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_MINUTES",
                reason: format!("must be at most {MAX_TTL_MINUTES} minutes"),
            });
        }
        self.ttl = ttl;
        Ok(self)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
