use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::models::License;

use super::{LicenseStore, StoreError, StoreResult};

/// In-process store for tests and embedding.
///
/// Each record sits behind its own mutex; the map lock is held only long
/// enough to find or insert an entry, so callers working on different keys
/// never wait on each other.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Arc<Mutex<License>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> StoreResult<Arc<Mutex<License>>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        records.get(key).cloned().ok_or(StoreError::NotFound)
    }

    /// Run `f` with the record for `key` locked.
    fn with_record<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut License) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let entry = self.entry(key)?;
        let mut license = entry.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut *license)
    }
}

impl LicenseStore for MemoryStore {
    fn create(&self, key: &str, created_at: i64, expires_at: Option<i64>) -> StoreResult<License> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        if records.contains_key(key) {
            return Err(StoreError::DuplicateKey);
        }

        let license = License {
            key: key.to_string(),
            machine_fingerprint: None,
            created_at,
            expires_at,
            active: true,
            activation_count: 0,
        };
        records.insert(key.to_string(), Arc::new(Mutex::new(license.clone())));
        Ok(license)
    }

    fn get(&self, key: &str) -> StoreResult<License> {
        self.with_record(key, |license| Ok(license.clone()))
    }

    fn list_all(&self) -> StoreResult<Vec<License>> {
        let entries: Vec<_> = self
            .records
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .values()
            .cloned()
            .collect();

        entries
            .iter()
            .map(|entry| {
                entry
                    .lock()
                    .map(|license| license.clone())
                    .map_err(|_| StoreError::Poisoned)
            })
            .collect()
    }

    fn bind_and_activate(&self, key: &str, fingerprint: &str) -> StoreResult<License> {
        self.with_record(key, |license| {
            if !license.active {
                return Err(StoreError::Deactivated);
            }
            if let Some(existing) = &license.machine_fingerprint {
                return Err(StoreError::AlreadyBound(existing.clone()));
            }
            license.machine_fingerprint = Some(fingerprint.to_string());
            license.activation_count = 1;
            Ok(license.clone())
        })
    }

    fn increment_activation(&self, key: &str) -> StoreResult<License> {
        self.with_record(key, |license| {
            if !license.active {
                return Err(StoreError::Deactivated);
            }
            if !license.is_bound() {
                return Err(StoreError::Unbound);
            }
            license.activation_count += 1;
            Ok(license.clone())
        })
    }

    fn deactivate(&self, key: &str) -> StoreResult<bool> {
        match self.with_record(key, |license| {
            license.active = false;
            Ok(())
        }) {
            Ok(()) => Ok(true),
            Err(StoreError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
