//! Telegram WebApp init-data verification.
//!
//! The WebApp hands the client a URL-encoded query string signed with a key
//! derived from the bot token. Verification follows Telegram's published
//! scheme: `secret = HMAC_SHA256("WebAppData", bot_token)` and
//! `hash = hex(HMAC_SHA256(secret, data_check_string))`.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const WEB_APP_DATA: &[u8] = b"WebAppData";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitDataError {
    #[error("init data carries no hash")]
    MissingHash,

    #[error("init data hash is not valid hex")]
    MalformedHash,

    #[error("init data signature mismatch")]
    SignatureMismatch,

    #[error("init data carries no user")]
    MissingUser,

    #[error("init data user is malformed: {0}")]
    MalformedUser(String),

    #[error("telegram user has no username")]
    MissingUsername,
}

/// The `user` object embedded in init data. Only `id` is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl TelegramUser {
    pub fn username(&self) -> Result<&str, InitDataError> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(InitDataError::MissingUsername)
    }
}

/// Check the signature on `init_data` and return the embedded user.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<TelegramUser, InitDataError> {
    let mut fields: BTreeMap<String, String> = url::form_urlencoded::parse(init_data.trim().as_bytes())
        .into_owned()
        .collect();

    let hash = fields.remove("hash").ok_or(InitDataError::MissingHash)?;
    let hash = hex::decode(hash.trim()).map_err(|_| InitDataError::MalformedHash)?;

    let mac = signer(bot_token, &data_check_string(&fields))?;
    mac.verify_slice(&hash).map_err(|_| InitDataError::SignatureMismatch)?;

    let user = fields.get("user").ok_or(InitDataError::MissingUser)?;
    serde_json::from_str(user).map_err(|e| InitDataError::MalformedUser(e.to_string()))
}

/// Sign already-ordered fields the way Telegram does. Returns lowercase hex.
pub fn sign_fields(fields: &BTreeMap<String, String>, bot_token: &str) -> Result<String, InitDataError> {
    let mac = signer(bot_token, &data_check_string(fields))?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn signer(bot_token: &str, data_check_string: &str) -> Result<HmacSha256, InitDataError> {
    // HMAC accepts keys of any length, so these never fail in practice.
    let mut secret = HmacSha256::new_from_slice(WEB_APP_DATA).map_err(|_| InitDataError::SignatureMismatch)?;
    secret.update(bot_token.as_bytes());
    let secret = secret.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret).map_err(|_| InitDataError::SignatureMismatch)?;
    mac.update(data_check_string.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "123456:test-bot-token";

    fn signed_init_data(user_json: &str) -> String {
        let mut fields = BTreeMap::new();
        fields.insert("auth_date".to_string(), "1700000000".to_string());
        fields.insert("query_id".to_string(), "AAF-test".to_string());
        fields.insert("user".to_string(), user_json.to_string());
        let hash = sign_fields(&fields, BOT_TOKEN).unwrap();

        let mut out = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &fields {
            out.append_pair(k, v);
        }
        out.append_pair("hash", &hash);
        out.finish()
    }

    #[test]
    fn accepts_correctly_signed_payload() {
        let data = signed_init_data(r#"{"id":42,"first_name":"Ann","username":"ann_tg"}"#);
        let user = verify_init_data(&data, BOT_TOKEN).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username().unwrap(), "ann_tg");
    }

    #[test]
    fn rejects_modified_payload() {
        let data = signed_init_data(r#"{"id":42,"username":"ann_tg"}"#);
        let tampered = data.replace("auth_date=1700000000", "auth_date=1700000001");
        assert_ne!(data, tampered);
        assert_eq!(verify_init_data(&tampered, BOT_TOKEN), Err(InitDataError::SignatureMismatch));
    }

    #[test]
    fn rejects_other_bot_token() {
        let data = signed_init_data(r#"{"id":42,"username":"ann_tg"}"#);
        assert_eq!(
            verify_init_data(&data, "999:other-token"),
            Err(InitDataError::SignatureMismatch)
        );
    }

    #[test]
    fn missing_or_garbled_hash() {
        assert_eq!(verify_init_data("user=%7B%7D", BOT_TOKEN), Err(InitDataError::MissingHash));
        assert_eq!(
            verify_init_data("user=%7B%7D&hash=zz", BOT_TOKEN),
            Err(InitDataError::MalformedHash)
        );
    }

    #[test]
    fn user_without_username_is_reported() {
        let data = signed_init_data(r#"{"id":7}"#);
        let user = verify_init_data(&data, BOT_TOKEN).unwrap();
        assert_eq!(user.username(), Err(InitDataError::MissingUsername));
    }
}
