use std::env;
use std::fmt;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Shared secret for the admin API
    pub admin_key: String,
    /// Allow cross-origin requests from any origin
    pub cors_permissive: bool,
    pub db_pool_size: u32,
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// Fails if `ADMIN_KEY` is unset or empty.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let admin_key = env::var("ADMIN_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or("ADMIN_KEY must be set to a non-empty value")?;

        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let cors_permissive = env::var("CORS_PERMISSIVE")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let db_pool_size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(10);

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "licenses.db".to_string()),
            admin_key,
            cors_permissive,
            db_pool_size,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("admin_key", &"<redacted>")
            .field("cors_permissive", &self.cors_permissive)
            .field("db_pool_size", &self.db_pool_size)
            .finish()
    }
}
