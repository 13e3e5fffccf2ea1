//! HTTP clients for the license server.
//!
//! [`LicenseClient`] is what the licensed product embeds: it validates a key
//! against the machine's fingerprint. [`AdminClient`] is for issuers and
//! administrators holding the shared admin key.
//!
//! ```rust,no_run
//! use license_server::client::{LicenseClient, LicenseFile};
//!
//! # async fn run() -> Result<(), license_server::client::ClientError> {
//! let client = LicenseClient::new("http://localhost:5000")?;
//! let file = LicenseFile::new("config.json");
//! file.save("6f1c2b9e-...")?;
//!
//! let verdict = client.validate_stored(&file, "machine-fingerprint").await?;
//! if !verdict.valid {
//!     eprintln!("not licensed: {:?}", verdict.reason);
//! }
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::LicenseFile;

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::ErrorResponse;
use crate::models::{
    DeactivateLicense, DeactivateResponse, ExpiresAt, GenerateLicense, GeneratedLicense, License,
    ValidateRequest, ValidationReason, Verdict,
};
use crate::util::ADMIN_KEY_HEADER;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("License file error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("License file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Requested lifetime of a new license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    #[default]
    Never,
    /// Absolute unix timestamp (seconds)
    At(i64),
    InDays(u32),
}

impl From<Expiry> for GenerateLicense {
    fn from(expiry: Expiry) -> Self {
        match expiry {
            Expiry::Never => GenerateLicense::default(),
            Expiry::At(ts) => GenerateLicense {
                expires_at: Some(ExpiresAt::Unix(ts)),
                expires_in_days: None,
            },
            Expiry::InDays(days) => GenerateLicense {
                expires_at: None,
                expires_in_days: Some(days.into()),
            },
        }
    }
}

fn build_http() -> Result<HttpClient> {
    Ok(HttpClient::builder()
        .user_agent(concat!("license-server-client/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                error,
                details: Some(details),
                ..
            }) => format!("{}: {}", error, details),
            Ok(ErrorResponse { error, .. }) => error,
            Err(_) => format!("Request failed: {}", status),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

/// Client used by the licensed product.
#[derive(Debug, Clone)]
pub struct LicenseClient {
    http: HttpClient,
    base_url: String,
}

impl LicenseClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Ask the server whether `key` is valid on this machine.
    ///
    /// The first successful call binds the key to `fingerprint`.
    pub async fn validate(&self, key: &str, fingerprint: &str) -> Result<Verdict> {
        self.post("/validate", &ValidateRequest::new(key, fingerprint))
            .await
    }

    /// Validate the key remembered in `file`.
    ///
    /// Without a stored key the verdict is `MissingParameters` and no request is made.
    pub async fn validate_stored(&self, file: &LicenseFile, fingerprint: &str) -> Result<Verdict> {
        match file.load()? {
            Some(key) => self.validate(&key, fingerprint).await,
            None => Ok(Verdict::rejected(ValidationReason::MissingParameters)),
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }
}

/// Client for the admin API.
#[derive(Clone)]
pub struct AdminClient {
    http: HttpClient,
    base_url: String,
    admin_key: String,
}

impl AdminClient {
    pub fn new(base_url: impl Into<String>, admin_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            base_url: normalize_base_url(base_url),
            admin_key: admin_key.into(),
        })
    }

    pub async fn generate(&self, expiry: Expiry) -> Result<GeneratedLicense> {
        let body: GenerateLicense = expiry.into();
        let response = self
            .http
            .post(format!("{}/admin/generate", self.base_url))
            .header(ADMIN_KEY_HEADER, &self.admin_key)
            .json(&body)
            .send()
            .await?;
        handle_response(response).await
    }

    pub async fn list(&self) -> Result<Vec<License>> {
        let response = self
            .http
            .get(format!("{}/admin/licenses", self.base_url))
            .header(ADMIN_KEY_HEADER, &self.admin_key)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Returns whether the key existed on the server.
    pub async fn deactivate(&self, key: &str) -> Result<bool> {
        let body = DeactivateLicense {
            key: Some(key.to_string()),
        };
        let response = self
            .http
            .post(format!("{}/admin/deactivate", self.base_url))
            .header(ADMIN_KEY_HEADER, &self.admin_key)
            .json(&body)
            .send()
            .await?;
        let result: DeactivateResponse = handle_response(response).await?;
        Ok(result.success)
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
