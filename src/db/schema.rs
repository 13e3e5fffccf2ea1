use rusqlite::Connection;

/// Initialize the license database schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Licenses (one row per issued key, never deleted)
        -- machine_fingerprint: NULL = unbound, set once by the first successful validation
        -- expires_at: NULL = never expires
        -- active: 0 = deactivated by an admin (irreversible)
        CREATE TABLE IF NOT EXISTS licenses (
            license_key TEXT PRIMARY KEY,
            machine_fingerprint TEXT,
            created_at INTEGER NOT NULL,
            expires_at INTEGER,
            active INTEGER NOT NULL DEFAULT 1,
            activation_count INTEGER NOT NULL DEFAULT 0 CHECK (activation_count >= 0)
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_created ON licenses(created_at);
        "#,
    )
}
