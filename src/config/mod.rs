//! Persistent settings backed by SQLite.
//!
//! Shares a database with [`SessionStorage`](crate::session::SessionStorage);
//! pass the same path to both.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::{API_URL_ENV, API_URL_KEY, DEFAULT_API_URL};

/// Keys `vericv config` accepts.
pub const KNOWN_KEYS: &[&str] = &[API_URL_KEY];

/// Persistent key-value settings store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a value (upsert). Unknown keys are refused so typos don't linger.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            anyhow::bail!("unknown config key: {key} (known: {})", KNOWN_KEYS.join(", "));
        }
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Backend URL: `flag`, then `$VERICV_API_URL`, then the stored
    /// `api_url`, then the built-in default.
    pub fn resolve_api_url(&self, flag: Option<&str>) -> Result<String> {
        let env = std::env::var(API_URL_ENV).ok();
        let stored = self.get(API_URL_KEY)?;
        Ok(pick_api_url(flag, env.as_deref(), stored.as_deref()))
    }
}

fn pick_api_url(flag: Option<&str>, env: Option<&str>, stored: Option<&str>) -> String {
    [flag, env, stored]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}
