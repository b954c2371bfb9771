use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{AppState, Goals, UnitPreference, seed_exercises, seed_foods};

/// Storage keys, one JSON document each.
pub mod keys {
    pub const UNIT: &str = "unitPref";
    pub const GOALS: &str = "goals";
    pub const EXERCISES: &str = "exDB";
    pub const FOODS: &str = "foodDB";
    pub const GYM_LOG: &str = "gymLog";
    pub const NUTRITION_LOG: &str = "nutritionLog";
    pub const BODY_LOG: &str = "bodyLog";

    pub const ALL: [&str; 7] = [
        UNIT,
        GOALS,
        EXERCISES,
        FOODS,
        GYM_LOG,
        NUTRITION_LOG,
        BODY_LOG,
    ];
}

/// Durable key/value store backed by a single SQLite table.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let store = Store { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Raw access ---

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        tracing::debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    // --- Typed access ---

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize '{key}'"))?;
        self.set_raw(key, &json)
    }

    /// Decode a stored value. `None` when the key is absent or does not parse;
    /// a parse failure is logged and otherwise ignored.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    /// Decode a stored array item by item, dropping items that are not records.
    /// `None` when the key is absent or is not a JSON array.
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let Some(items) = self.load::<Vec<Value>>(key)? else {
            return Ok(None);
        };
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value(item) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(key, error = %e, "Dropping unreadable record"),
            }
        }
        Ok(Some(records))
    }

    /// Read every key, substituting seed data for keys never stored or unreadable.
    pub fn load_state(&self) -> Result<AppState> {
        let state = AppState {
            unit: self.load::<UnitPreference>(keys::UNIT)?.unwrap_or_default(),
            goals: self.load::<Goals>(keys::GOALS)?.unwrap_or_default(),
            exercises: self
                .load_collection(keys::EXERCISES)?
                .unwrap_or_else(seed_exercises),
            foods: self
                .load_collection(keys::FOODS)?
                .unwrap_or_else(seed_foods),
            gym_log: self.load_collection(keys::GYM_LOG)?.unwrap_or_default(),
            nutrition_log: self
                .load_collection(keys::NUTRITION_LOG)?
                .unwrap_or_default(),
            body_log: self.load_collection(keys::BODY_LOG)?.unwrap_or_default(),
        };
        tracing::debug!(
            exercises = state.exercises.len(),
            foods = state.foods.len(),
            gym = state.gym_log.len(),
            nutrition = state.nutrition_log.len(),
            body = state.body_log.len(),
            "Loaded state"
        );
        Ok(state)
    }

    /// Write every key from `state`.
    pub fn save_state(&self, state: &AppState) -> Result<()> {
        self.save(keys::UNIT, &state.unit)?;
        self.save(keys::GOALS, &state.goals)?;
        self.save(keys::EXERCISES, &state.exercises)?;
        self.save(keys::FOODS, &state.foods)?;
        self.save(keys::GYM_LOG, &state.gym_log)?;
        self.save(keys::NUTRITION_LOG, &state.nutrition_log)?;
        self.save(keys::BODY_LOG, &state.body_log)?;
        Ok(())
    }
}
