use rusqlite::{ErrorCode, TransactionBehavior};

use crate::db::{DbPool, create_pool, init_db, queries};
use crate::models::License;

use super::{LicenseStore, StoreError, StoreResult};

/// SQLite-backed store over a pooled connection.
///
/// Mutations run in IMMEDIATE transactions so the write lock is taken before
/// the row is read, which makes each check-then-update a single atomic step.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wrap an existing pool. The schema must already exist.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and initialize the schema.
    pub fn open(database_path: &str, pool_size: u32) -> StoreResult<Self> {
        let pool = create_pool(database_path, pool_size)?;
        init_db(&*pool.get()?)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl LicenseStore for SqliteStore {
    fn create(&self, key: &str, created_at: i64, expires_at: Option<i64>) -> StoreResult<License> {
        let conn = self.pool.get()?;
        queries::insert_license(&conn, key, created_at, expires_at).map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateKey
            } else {
                e.into()
            }
        })
    }

    fn get(&self, key: &str) -> StoreResult<License> {
        let conn = self.pool.get()?;
        queries::get_license(&conn, key)?.ok_or(StoreError::NotFound)
    }

    fn list_all(&self) -> StoreResult<Vec<License>> {
        let conn = self.pool.get()?;
        Ok(queries::list_licenses(&conn)?)
    }

    fn bind_and_activate(&self, key: &str, fingerprint: &str) -> StoreResult<License> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let license = queries::get_license(&tx, key)?.ok_or(StoreError::NotFound)?;
        if !license.active {
            return Err(StoreError::Deactivated);
        }
        if let Some(existing) = &license.machine_fingerprint {
            return Err(StoreError::AlreadyBound(existing.clone()));
        }

        if queries::bind_fingerprint(&tx, key, fingerprint)? == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit()?;

        Ok(License {
            machine_fingerprint: Some(fingerprint.to_string()),
            activation_count: 1,
            ..license
        })
    }

    fn increment_activation(&self, key: &str) -> StoreResult<License> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let license = queries::get_license(&tx, key)?.ok_or(StoreError::NotFound)?;
        if !license.active {
            return Err(StoreError::Deactivated);
        }
        if !license.is_bound() {
            return Err(StoreError::Unbound);
        }

        if queries::increment_activation_count(&tx, key)? == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit()?;

        Ok(License {
            activation_count: license.activation_count + 1,
            ..license
        })
    }

    fn deactivate(&self, key: &str) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        Ok(queries::deactivate_license(&conn, key)? > 0)
    }
}
