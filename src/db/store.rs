use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::db::migrations::run_migrations;
use crate::db::repository::{Record, TableRepo};

/// Whole-table persistence: every operation loads the full table and every
/// write replaces it.
pub trait TableStore {
    fn load<R: Record>(&self) -> Result<Vec<R>>;
    fn save<R: Record>(&self, rows: &[R]) -> Result<()>;
}

/// Handle on the reminder database file. Opened once per invocation and
/// passed to each operation.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if absent) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| anyhow::Error::from(e).context("Closing database"))
    }
}

impl TableStore for Store {
    fn load<R: Record>(&self) -> Result<Vec<R>> {
        TableRepo::load_all(&self.conn)
    }

    fn save<R: Record>(&self, rows: &[R]) -> Result<()> {
        TableRepo::save_all(&self.conn, rows)
    }
}
