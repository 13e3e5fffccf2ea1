//! Local persistence of the license key on the client machine.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::Result;

const LICENSE_KEY_FIELD: &str = "license_key";

/// JSON settings file holding the license key under `license_key`.
///
/// Other fields in the file belong to the host application and are preserved.
#[derive(Debug, Clone)]
pub struct LicenseFile {
    path: PathBuf,
}

impl LicenseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// The stored key, or `None` if the file or field is missing.
    pub fn load(&self) -> Result<Option<String>> {
        Ok(self
            .read_object()?
            .get(LICENSE_KEY_FIELD)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(String::from))
    }

    pub fn save(&self, key: &str) -> Result<()> {
        let mut object = self.read_object()?;
        object.insert(LICENSE_KEY_FIELD.to_string(), Value::String(key.to_string()));
        fs::write(&self.path, serde_json::to_string_pretty(&object)?)?;
        Ok(())
    }
}
