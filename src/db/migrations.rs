use anyhow::Result;
use rusqlite::Connection;

/// Create the reminder tables if absent. A fresh store has the columns and no rows.
///
/// Every cell is text and never NULL, so a missing value reads back as `''`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS reminders (
            position   INTEGER NOT NULL,
            id         TEXT NOT NULL DEFAULT '',
            owner      TEXT NOT NULL DEFAULT '',
            title      TEXT NOT NULL DEFAULT '',
            notes      TEXT NOT NULL DEFAULT '',
            date       TEXT NOT NULL DEFAULT '',
            times      TEXT NOT NULL DEFAULT '',
            frequency  TEXT NOT NULL DEFAULT '',
            delivery   TEXT NOT NULL DEFAULT '',
            taken      TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS medications (
            position   INTEGER NOT NULL,
            id         TEXT NOT NULL DEFAULT '',
            owner      TEXT NOT NULL DEFAULT '',
            medicine   TEXT NOT NULL DEFAULT '',
            time       TEXT NOT NULL DEFAULT '',
            dosage     TEXT NOT NULL DEFAULT '',
            status     TEXT NOT NULL DEFAULT ''
        );
    ")?;
    Ok(())
}
