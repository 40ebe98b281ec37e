use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::AuthResponse;

/// What we keep after a successful login or registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAccount {
    pub token: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<AuthResponse> for StoredAccount {
    fn from(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            email: resp.email,
            full_name: resp.full_name,
            roles: resp.roles,
        }
    }
}

/// Manages account storage in SQLite, one account per backend URL.
///
/// Shares a database with [`Config`](crate::config::Config). Pass the
/// same path to both.
pub struct SessionStorage {
    conn: Mutex<Connection>,
}

impl SessionStorage {
    /// Open or create the accounts table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                api_url TEXT PRIMARY KEY,
                data    TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the account stored for a backend.
    pub fn get(&self, api_url: &str) -> Result<Option<StoredAccount>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT data FROM accounts WHERE api_url = ?1")?;
        let mut rows = stmt.query([api_url])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                let account: StoredAccount = serde_json::from_str(&json)?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Store the account for a backend (upsert).
    pub fn set(&self, api_url: &str, account: &StoredAccount) -> Result<()> {
        let json = serde_json::to_string(account)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO accounts (api_url, data) VALUES (?1, ?2)
             ON CONFLICT(api_url) DO UPDATE SET data = excluded.data",
            [api_url, json.as_str()],
        )?;
        Ok(())
    }

    /// Forget the account for a backend.
    pub fn remove(&self, api_url: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM accounts WHERE api_url = ?1", [api_url])?;
        Ok(())
    }
}
