//! License lifecycle rules.
//!
//! The service holds no per-request state; everything durable lives in the
//! injected [`LicenseStore`]. Administrative operations take an
//! [`AdminAccess`], which can only be obtained from [`LicenseService::authorize`].

use std::sync::Arc;

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{License, ValidationReason, Verdict};
use crate::store::{LicenseStore, StoreError, StoreResult};
use crate::util::now;

/// Proof that the caller presented the admin credential.
#[derive(Debug)]
pub struct AdminAccess {
    _private: (),
}

#[derive(Clone)]
pub struct LicenseService {
    store: Arc<dyn LicenseStore>,
    admin_key: Arc<str>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl LicenseService {
    pub fn new(store: Arc<dyn LicenseStore>, admin_key: impl Into<String>) -> Self {
        Self {
            store,
            admin_key: Arc::from(admin_key.into()),
        }
    }

    /// Check a caller-supplied credential against the configured admin key.
    ///
    /// Comparison is constant-time. An empty configured key authorizes nobody.
    pub fn authorize(&self, credential: Option<&str>) -> Result<AdminAccess> {
        let Some(credential) = credential else {
            return Err(AppError::Unauthorized);
        };
        if self.admin_key.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let matches: bool = credential
            .as_bytes()
            .ct_eq(self.admin_key.as_bytes())
            .into();
        if !matches {
            tracing::warn!("Rejected admin request with an incorrect credential");
            return Err(AppError::Unauthorized);
        }

        Ok(AdminAccess { _private: () })
    }

    /// Issue a new unbound license.
    pub fn generate(&self, _admin: &AdminAccess, expires_at: Option<i64>) -> Result<License> {
        let key = Uuid::new_v4().to_string();
        let license = self.store.create(&key, now(), expires_at)?;

        tracing::info!(key = %license.key, expires_at = ?license.expires_at, "License generated");
        Ok(license)
    }

    pub fn list(&self, _admin: &AdminAccess) -> Result<Vec<License>> {
        Ok(self.store.list_all()?)
    }

    /// Deactivate a license. Returns whether the key existed.
    pub fn deactivate(&self, _admin: &AdminAccess, key: &str) -> Result<bool> {
        if key.trim().is_empty() {
            return Err(AppError::MissingParameters("key is required".into()));
        }

        let existed = self.store.deactivate(key)?;
        if existed {
            tracing::info!(key, "License deactivated");
        } else {
            tracing::debug!(key, "Deactivation requested for unknown license");
        }
        Ok(existed)
    }

    pub fn validate(&self, key: Option<&str>, fingerprint: Option<&str>) -> Verdict {
        self.validate_at(key, fingerprint, now())
    }

    /// Validate against an explicit clock reading (unix seconds).
    ///
    /// Store failures never escape: they are logged and reported as
    /// `InternalError` verdicts.
    pub fn validate_at(&self, key: Option<&str>, fingerprint: Option<&str>, now: i64) -> Verdict {
        let (Some(key), Some(fingerprint)) = (present(key), present(fingerprint)) else {
            return Verdict::rejected(ValidationReason::MissingParameters);
        };

        match self.check(key, fingerprint, now) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(key, error = %e, "License validation failed");
                Verdict::rejected(ValidationReason::InternalError)
            }
        }
    }

    fn check(&self, key: &str, fingerprint: &str, now: i64) -> StoreResult<Verdict> {
        let license = match self.store.get(key) {
            Ok(license) => license,
            Err(StoreError::NotFound) => return Ok(reject(key, ValidationReason::NotFound)),
            Err(e) => return Err(e),
        };

        if !license.active {
            return Ok(reject(key, ValidationReason::Deactivated));
        }
        if license.is_expired_at(now) {
            return Ok(reject(key, ValidationReason::Expired));
        }

        let bound = match license.machine_fingerprint {
            Some(bound) => bound,
            None => match self.store.bind_and_activate(key, fingerprint) {
                Ok(license) => {
                    tracing::info!(key, "License bound to machine");
                    return Ok(Verdict::accepted(&license));
                }
                // Lost the race to bind; judge against the winner
                Err(StoreError::AlreadyBound(winner)) => winner,
                Err(StoreError::Deactivated) => {
                    return Ok(reject(key, ValidationReason::Deactivated));
                }
                Err(e) => return Err(e),
            },
        };

        if bound != fingerprint {
            return Ok(reject(key, ValidationReason::MachineMismatch));
        }

        match self.store.increment_activation(key) {
            Ok(license) => Ok(Verdict::accepted(&license)),
            // Deactivated after the snapshot was read
            Err(StoreError::Deactivated) => Ok(reject(key, ValidationReason::Deactivated)),
            Err(e) => Err(e),
        }
    }
}

fn reject(key: &str, reason: ValidationReason) -> Verdict {
    tracing::debug!(key, reason = reason.as_ref(), "License validation rejected");
    Verdict::rejected(reason)
}
