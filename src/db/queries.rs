//! SQL for the `licenses` table.
//!
//! These functions report raw row counts; `SqliteStore` turns them into
//! lifecycle errors. The UPDATE statements are conditional so a stale caller
//! can never overwrite a binding, count an unbound record or touch a
//! deactivated one.

use rusqlite::{Connection, params};

use crate::models::License;

use super::from_row::{LICENSE_COLS, query_all, query_one};

pub fn insert_license(
    conn: &Connection,
    key: &str,
    created_at: i64,
    expires_at: Option<i64>,
) -> rusqlite::Result<License> {
    conn.execute(
        "INSERT INTO licenses (license_key, machine_fingerprint, created_at, expires_at, active, activation_count)
         VALUES (?1, NULL, ?2, ?3, 1, 0)",
        params![key, created_at, expires_at],
    )?;

    Ok(License {
        key: key.to_string(),
        machine_fingerprint: None,
        created_at,
        expires_at,
        active: true,
        activation_count: 0,
    })
}

pub fn get_license(conn: &Connection, key: &str) -> rusqlite::Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_key = ?1", LICENSE_COLS),
        &[&key],
    )
}

pub fn list_licenses(conn: &Connection) -> rusqlite::Result<Vec<License>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM licenses ORDER BY created_at, license_key",
            LICENSE_COLS
        ),
        &[],
    )
}

/// Bind an active, unbound license. Returns the number of rows changed
/// (0 if already bound, deactivated or missing).
pub fn bind_fingerprint(conn: &Connection, key: &str, fingerprint: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE licenses SET machine_fingerprint = ?2, activation_count = 1
         WHERE license_key = ?1 AND machine_fingerprint IS NULL AND active = 1",
        params![key, fingerprint],
    )
}

/// Count one more activation on an active, bound license. Returns rows changed.
pub fn increment_activation_count(conn: &Connection, key: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE licenses SET activation_count = activation_count + 1
         WHERE license_key = ?1 AND machine_fingerprint IS NOT NULL AND active = 1",
        params![key],
    )
}

pub fn deactivate_license(conn: &Connection, key: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE licenses SET active = 0 WHERE license_key = ?1",
        params![key],
    )
}

pub fn count_licenses(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
}
