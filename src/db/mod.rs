mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::service::LicenseService;
use crate::store::LicenseStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub licenses: LicenseService,
}

impl AppState {
    pub fn new(store: Arc<dyn LicenseStore>, admin_key: impl Into<String>) -> Self {
        Self {
            licenses: LicenseService::new(store, admin_key),
        }
    }
}

pub fn create_pool(database_path: &str, max_size: u32) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
    Pool::builder().max_size(max_size).build(manager)
}

/// Single-connection pool over a private in-memory database.
///
/// Every in-memory connection is its own database, so the pool is capped at one.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::memory();
    Pool::builder().max_size(1).build(manager)
}
