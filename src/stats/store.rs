//! Small durable key-value documents
//!
//! Badge state (and anything else that is "load everything, save everything")
//! goes through [`Store`], so the backing storage can change without touching
//! the logic that owns the value.

use std::marker::PhantomData;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::db::StatsDb;

/// Load/save access to a single persisted value
pub trait Store<T> {
    /// The stored value, or `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<T>>;
    fn save(&self, value: &T) -> Result<()>;

    /// Read-modify-write as one atomic step.
    ///
    /// `f` gets the current stored value and returns the value to save
    /// (`None` leaves the store untouched) together with a result.
    fn update<R>(&self, f: impl FnOnce(Option<T>) -> (Option<T>, R)) -> Result<R>;
}

/// JSON document stored under one key of the stats database's `kv_store` table
pub struct SqliteStore<T> {
    db: StatsDb,
    key: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> SqliteStore<T> {
    pub fn new(db: StatsDb, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Store<T> for SqliteStore<T> {
    fn load(&self) -> Result<Option<T>> {
        let conn = self.db.conn();
        read_value(&conn, &self.key)
    }

    fn save(&self, value: &T) -> Result<()> {
        let conn = self.db.conn();
        write_value(&conn, &self.key, value)
    }

    fn update<R>(&self, f: impl FnOnce(Option<T>) -> (Option<T>, R)) -> Result<R> {
        let mut conn = self.db.conn();
        // Write lock is held from the read until commit
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .with_context(|| format!("Failed to begin update of '{}'", self.key))?;

        let (next, result) = f(read_value(&tx, &self.key)?);
        if let Some(next) = next {
            write_value(&tx, &self.key, &next)?;
        }
        tx.commit()
            .with_context(|| format!("Failed to commit '{}'", self.key))?;
        Ok(result)
    }
}

/// An unreadable document is an error, never `None`
fn read_value<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |r| r.get(0))
        .optional()
        .with_context(|| format!("Failed to load '{}'", key))?;

    raw.map(|raw| {
        serde_json::from_str(&raw)
            .with_context(|| format!("Stored value for '{}' is unreadable", key))
    })
    .transpose()
}

fn write_value<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json =
        serde_json::to_string(value).with_context(|| format!("Failed to serialize '{}'", key))?;
    conn.execute(
        r#"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3"#,
        rusqlite::params![key, json, Utc::now().timestamp_millis()],
    )
    .with_context(|| format!("Failed to save '{}'", key))?;
    Ok(())
}

/// Process-local store, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore<T> {
    value: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    pub fn with_value(value: T) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }
}

impl<T: Clone> Store<T> for MemoryStore<T> {
    fn load(&self) -> Result<Option<T>> {
        Ok(self.value.lock().expect("MemoryStore lock poisoned").clone())
    }

    fn save(&self, value: &T) -> Result<()> {
        *self.value.lock().expect("MemoryStore lock poisoned") = Some(value.clone());
        Ok(())
    }

    fn update<R>(&self, f: impl FnOnce(Option<T>) -> (Option<T>, R)) -> Result<R> {
        let mut value = self.value.lock().expect("MemoryStore lock poisoned");
        let (next, result) = f(value.clone());
        if let Some(next) = next {
            *value = Some(next);
        }
        Ok(result)
    }
}
