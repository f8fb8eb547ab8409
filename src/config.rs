//! Client configuration, credentials, and name validation.

use chrono::Utc;
use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::protocol::ProtocolFlags;

type HmacSha256 = Hmac<Sha256>;

/// Default port of the hosted store.
pub const DEFAULT_PORT: u16 = 8484;

/// Credential presented at handshake. `ApiKey` is the end-user trust
/// level, subject to store-side access rules; `ServiceAccount` is the
/// privileged level that bypasses them. The facade is identical for
/// both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Anonymous,
    ApiKey(String),
    ServiceAccount { key_id: String, secret: String },
}

impl Credentials {
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::ServiceAccount { .. })
    }

    /// Token sent in the client hello. Service accounts sign a
    /// short-lived token locally; API keys are presented as-is.
    pub(crate) fn auth_token(&self, project_id: &str) -> String {
        match self {
            Self::Anonymous => String::new(),
            Self::ApiKey(key) => key.clone(),
            Self::ServiceAccount { key_id, secret } => {
                sign_token(key_id, secret, project_id, Utc::now().timestamp())
            }
        }
    }
}

/// `key_id.issued_at.hex(hmac_sha256(secret, "project:key_id:issued_at"))`
pub(crate) fn sign_token(key_id: &str, secret: &str, project_id: &str, issued_at: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}:{}:{}", project_id, key_id, issued_at).as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{}.{}.{}", key_id, issued_at, signature)
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();

/// Collection names and document identifiers: 1-128 chars of
/// `[A-Za-z0-9_-]`. Rejected before any I/O happens.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<()> {
    let re = NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("name pattern is valid")
    });
    if re.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(format!("{} '{}'", kind, name)))
    }
}

/// Connection settings for the hosted store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub project_id: String,
    pub credentials: Credentials,
    pub use_messagepack: bool,
    pub json_fallback: bool,
}

impl StoreConfig {
    pub fn new(host: impl Into<String>, port: u16, project_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            project_id: project_id.into(),
            credentials: Credentials::Anonymous,
            use_messagepack: true,
            json_fallback: true,
        }
    }

    /// End-user credential.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials = Credentials::ApiKey(key.into());
        self
    }

    /// Privileged server-side credential.
    pub fn with_service_account(
        mut self,
        key_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials::ServiceAccount {
            key_id: key_id.into(),
            secret: secret.into(),
        };
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn flags(&self) -> ProtocolFlags {
        ProtocolFlags {
            messagepack: self.use_messagepack,
            json_fallback: self.json_fallback,
        }
    }
}
