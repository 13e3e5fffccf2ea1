use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::License;

/// Why a validation request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationReason {
    MissingParameters,
    NotFound,
    Deactivated,
    Expired,
    MachineMismatch,
    InternalError,
}

impl ValidationReason {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationReason::MissingParameters => "Both key and fingerprint are required",
            ValidationReason::NotFound => "License key does not exist",
            ValidationReason::Deactivated => "License has been deactivated",
            ValidationReason::Expired => "License has expired",
            ValidationReason::MachineMismatch => "License is bound to another machine",
            ValidationReason::InternalError => "License could not be validated",
        }
    }
}

/// Body of `POST /validate`.
///
/// Older clients send `license_key` and `machine_code`. When both spellings
/// are present the current one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_code: Option<String>,
}

fn first_present<'a>(current: &'a Option<String>, legacy: &'a Option<String>) -> Option<&'a str> {
    [current, legacy]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .find(|v| !v.trim().is_empty())
}

impl ValidateRequest {
    pub fn new(key: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            fingerprint: Some(fingerprint.into()),
            ..Default::default()
        }
    }

    pub fn key(&self) -> Option<&str> {
        first_present(&self.key, &self.license_key)
    }

    pub fn fingerprint(&self) -> Option<&str> {
        first_present(&self.fingerprint, &self.machine_code)
    }
}

/// Outcome of a validation request. Always returned with 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ValidationReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Verdict {
    pub fn accepted(license: &License) -> Self {
        Self {
            valid: true,
            reason: None,
            message: None,
            activation_count: Some(license.activation_count),
            expires_at: license.expires_at,
        }
    }

    pub fn rejected(reason: ValidationReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            message: Some(reason.message().to_string()),
            activation_count: None,
            expires_at: None,
        }
    }
}
