use serde::{Deserialize, Serialize};

use crate::util::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub key: String,
    /// Fingerprint of the machine that claimed the key (None = unbound)
    pub machine_fingerprint: Option<String>,
    pub created_at: i64,
    /// None = never expires
    pub expires_at: Option<i64>,
    pub active: bool,
    /// Successful validations, including the one that bound the key
    pub activation_count: i64,
}

impl License {
    pub fn is_bound(&self) -> bool {
        self.machine_fingerprint.is_some()
    }

    /// A license stops being valid at the exact second it expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }
}

/// Expiration timestamp as accepted on the wire.
///
/// Issuers send either unix seconds or text (RFC 3339, or `YYYY-MM-DD HH:MM:SS`
/// interpreted as UTC). Empty text means "never expires".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiresAt {
    Unix(i64),
    Text(String),
}

impl ExpiresAt {
    /// Resolve to unix seconds. `Ok(None)` for empty text.
    pub fn resolve(&self) -> Result<Option<i64>, String> {
        match self {
            ExpiresAt::Unix(ts) => Ok(Some(*ts)),
            ExpiresAt::Text(text) if text.trim().is_empty() => Ok(None),
            ExpiresAt::Text(text) => parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| format!("unrecognized expires_at '{}'", text)),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateLicense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<ExpiresAt>,
    /// Relative alternative to `expires_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLicense {
    pub success: bool,
    pub key: String,
    /// Same value as `key`, for older issuer tooling
    pub license_key: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

impl From<License> for GeneratedLicense {
    fn from(license: License) -> Self {
        Self {
            success: true,
            license_key: license.key.clone(),
            key: license.key,
            created_at: license.created_at,
            expires_at: license.expires_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeactivateLicense {
    #[serde(default, alias = "license_key")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeactivateResponse {
    /// Whether the key existed
    pub success: bool,
}
