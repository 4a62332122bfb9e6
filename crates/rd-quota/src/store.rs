use crate::migrations;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no usage record for user '{0}'")]
    UserNotFound(String),
    #[error("usage storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// One ledger row per user. `consumed` and `word_count` only ever grow;
/// `limit` moves only through [`UsageStore::increase_limit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub word_count: i64,
    pub consumed: i64,
    pub limit: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UsageRecord {
    pub fn remaining(&self) -> i64 {
        self.limit - self.consumed
    }

    /// Consumed share of the limit in percent; 0 when the limit is not positive.
    pub fn usage_percentage(&self) -> f64 {
        if self.limit <= 0 {
            return 0.0;
        }
        self.consumed as f64 / self.limit as f64 * 100.0
    }
}

#[derive(Debug)]
pub enum ChargeOutcome {
    Applied(UsageRecord),
    Denied(UsageRecord),
}

#[derive(Debug)]
pub struct LimitChange {
    pub old_limit: i64,
    pub record: UsageRecord,
}

pub struct UsageStore {
    conn: Mutex<Connection>,
}

impl UsageStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fetches the record for `user_id`, creating it with zero usage and
    /// `default_limit` on first sight. The unique constraint plus
    /// `INSERT OR IGNORE` keeps concurrent first requests down to one row;
    /// an existing record keeps the limit it was created with.
    pub fn get_or_create(
        &self,
        user_id: &str,
        default_limit: i64,
    ) -> Result<UsageRecord, StoreError> {
        let conn = self.conn.lock().unwrap();
        let now = now_rfc3339();
        conn.execute(
            "INSERT OR IGNORE INTO usage_accounts (user_id, word_count, consumed, usage_limit, created_at, updated_at)
             VALUES (?1, 0, 0, ?2, ?3, ?3)",
            params![user_id, default_limit, now],
        )?;
        fetch(&conn, user_id)
    }

    pub fn read(&self, user_id: &str) -> Result<UsageRecord, StoreError> {
        let conn = self.conn.lock().unwrap();
        fetch(&conn, user_id)
    }

    /// Admits and commits a charge in one conditional update.
    ///
    /// The row changes only while the account is under its limit and
    /// `cost_delta` still fits; spending down to exactly zero remaining is
    /// admitted. The affected-row count is the admission decision, so two
    /// racing requests can never jointly overshoot. The returned record is
    /// post-update state either way.
    pub fn try_charge(
        &self,
        user_id: &str,
        word_delta: i64,
        cost_delta: i64,
    ) -> Result<ChargeOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE usage_accounts
             SET consumed = consumed + ?2, word_count = word_count + ?3, updated_at = ?4
             WHERE user_id = ?1 AND consumed < usage_limit AND consumed + ?2 <= usage_limit",
            params![user_id, cost_delta, word_delta, now_rfc3339()],
        )?;
        let record = fetch(&conn, user_id)?;
        if changed == 1 {
            Ok(ChargeOutcome::Applied(record))
        } else {
            Ok(ChargeOutcome::Denied(record))
        }
    }

    /// Adds `delta` to the user's limit and reports the value it replaced.
    /// Never creates records; unknown users fail with [`StoreError::UserNotFound`].
    pub fn increase_limit(&self, user_id: &str, delta: i64) -> Result<LimitChange, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let old_limit: i64 = tx
            .query_row(
                "SELECT usage_limit FROM usage_accounts WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .map_err(|e| not_found_or(e, user_id))?;
        tx.execute(
            "UPDATE usage_accounts SET usage_limit = usage_limit + ?2, updated_at = ?3
             WHERE user_id = ?1",
            params![user_id, delta, now_rfc3339()],
        )?;
        let record = fetch(&tx, user_id)?;
        tx.commit()?;
        Ok(LimitChange { old_limit, record })
    }
}

fn fetch(conn: &Connection, user_id: &str) -> Result<UsageRecord, StoreError> {
    conn.query_row(
        "SELECT user_id, word_count, consumed, usage_limit, created_at, updated_at
         FROM usage_accounts WHERE user_id = ?1",
        [user_id],
        |row| {
            Ok(UsageRecord {
                user_id: row.get(0)?,
                word_count: row.get(1)?,
                consumed: row.get(2)?,
                limit: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        },
    )
    .map_err(|e| not_found_or(e, user_id))
}

fn not_found_or(err: rusqlite::Error, user_id: &str) -> StoreError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => StoreError::UserNotFound(user_id.to_string()),
        other => StoreError::Sqlite(other),
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
