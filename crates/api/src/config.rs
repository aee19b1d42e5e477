use std::net::{IpAddr, SocketAddr};

use notekeep_auth::{ConfigError, JwtConfig};
use notekeep_observability::LogFormat;

/// Account created at startup when `SEED_ADMIN_NAME`/`SEED_ADMIN_PASSWORD`
/// are set, so a fresh deployment has someone able to register users.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: IpAddr,
    pub api_port: u16,
    pub jwt: JwtConfig,
    pub telegram_bot_token: Option<String>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt = JwtConfig::from_lookup(&lookup)?;

        let api_host = match non_empty(lookup("API_HOST")) {
            None => IpAddr::from([0, 0, 0, 0]),
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "API_HOST",
                reason: e.to_string(),
            })?,
        };
        let api_port = match non_empty(lookup("API_PORT")) {
            None => 8080,
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "API_PORT",
                reason: e.to_string(),
            })?,
        };

        let telegram_bot_token = non_empty(lookup("TELEGRAM_BOT_TOKEN"));

        let seed_admin = match (non_empty(lookup("SEED_ADMIN_NAME")), non_empty(lookup("SEED_ADMIN_PASSWORD"))) {
            (Some(name), Some(password)) => Some(SeedAdmin { name, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("SEED_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("SEED_ADMIN_NAME")),
        };

        let log_format = LogFormat::from_setting(lookup("LOG_FORMAT").as_deref());

        Ok(Self {
            api_host,
            api_port,
            jwt,
            telegram_bot_token,
            seed_admin,
            log_format,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.api_host, self.api_port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
