//! Durable storage of license records, addressed by key.
//!
//! Every mutation is atomic per key. A binding can only be applied to an
//! active unbound record and an increment only to an active bound one. Each
//! call returns the record as it stands after the change.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::License;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("License not found")]
    NotFound,

    #[error("License key already exists")]
    DuplicateKey,

    /// Carries the fingerprint that won the binding.
    #[error("License is already bound")]
    AlreadyBound(String),

    #[error("License is not bound to a machine")]
    Unbound,

    #[error("License has been deactivated")]
    Deactivated,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait LicenseStore: Send + Sync {
    /// Insert a fresh record: unbound, active, zero activations.
    fn create(&self, key: &str, created_at: i64, expires_at: Option<i64>) -> StoreResult<License>;

    fn get(&self, key: &str) -> StoreResult<License>;

    /// Snapshot of every record. Each call reads the store afresh.
    fn list_all(&self) -> StoreResult<Vec<License>>;

    /// Set the fingerprint and an activation count of 1.
    ///
    /// Fails with `Deactivated` if the record is inactive, or with
    /// `AlreadyBound` if a fingerprint is already set. Either way the record
    /// is left untouched.
    fn bind_and_activate(&self, key: &str, fingerprint: &str) -> StoreResult<License>;

    /// Fails with `Deactivated` if the record is inactive and with `Unbound`
    /// if no fingerprint is set.
    fn increment_activation(&self, key: &str) -> StoreResult<License>;

    /// Returns whether the record existed. Deactivating twice is not an error.
    fn deactivate(&self, key: &str) -> StoreResult<bool>;
}
