//! Expiring forecast cache over a persistent key-value medium.
//!
//! Each entry is stored as `{"timestamp": <epoch millis>, "data": <raw response>}`
//! under `<prefix><location name>`. Entries are never deleted: an expired
//! entry is simply ignored until the next successful fetch overwrites it.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use wxc_core::{DatabaseError, RusqliteErrorExt};

use crate::types::{ForecastResponse, WeatherError};

pub const DEFAULT_KEY_PREFIX: &str = "weather-charts-data-";

/// String-keyed, string-valued storage shared by every cache handle.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Insert or overwrite `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
}

/// SQLite-backed store; survives process restarts.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(RusqliteErrorExt::into_database_error)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(RusqliteErrorExt::into_database_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(RusqliteErrorExt::into_database_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(())
    }
}

/// Process-local store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        (**self).set(key, value)
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope<T> {
    timestamp: i64,
    data: T,
}

/// Forecast cache with time-to-live semantics.
///
/// There is no in-memory shadow: every read goes back to the store.
pub struct WeatherCache<S = SqliteStore> {
    store: S,
    ttl: Duration,
    key_prefix: String,
}

impl<S: KeyValueStore> WeatherCache<S> {
    pub fn new(store: S, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    /// One hour TTL, default key prefix.
    pub fn with_defaults(store: S) -> Self {
        Self::new(store, Duration::minutes(60), DEFAULT_KEY_PREFIX)
    }

    pub fn key_for(&self, location_name: &str) -> String {
        format!("{}{}", self.key_prefix, location_name)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh payload for `key`, if any.
    pub fn get(&self, key: &str) -> Option<ForecastResponse> {
        self.get_at(key, Utc::now())
    }

    /// Fresh payload for `key` as seen at `now`.
    ///
    /// Missing, unreadable and expired entries all read as absent.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<ForecastResponse> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, "Failed to read cached weather: {}", e);
                return None;
            }
        };

        let envelope: CacheEnvelope<ForecastResponse> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key, "Failed to parse cached data: {}", e);
                return None;
            }
        };

        let Some(age_ms) = now.timestamp_millis().checked_sub(envelope.timestamp) else {
            tracing::warn!(
                key,
                timestamp = envelope.timestamp,
                "Cached entry has an unusable timestamp"
            );
            return None;
        };
        if age_ms < self.ttl.num_milliseconds() {
            tracing::debug!(key, age_ms, "Weather cache hit");
            Some(envelope.data)
        } else {
            tracing::debug!(key, age_ms, "Weather cache entry expired");
            None
        }
    }

    /// Overwrite `key` with `payload`, stamped with the current time.
    pub fn put(&self, key: &str, payload: &ForecastResponse) -> Result<(), WeatherError> {
        self.put_at(key, payload, Utc::now())
    }

    pub fn put_at(
        &self,
        key: &str,
        payload: &ForecastResponse,
        now: DateTime<Utc>,
    ) -> Result<(), WeatherError> {
        let envelope = CacheEnvelope {
            timestamp: now.timestamp_millis(),
            data: payload,
        };
        let raw = serde_json::to_string(&envelope).map_err(|e| WeatherError::Parse(e.to_string()))?;
        self.store.set(key, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HourlyBlock;
    use chrono::TimeZone;

    fn payload() -> ForecastResponse {
        ForecastResponse {
            latitude: Some(-33.625),
            longitude: Some(150.25),
            timezone: Some("Australia/Sydney".to_string()),
            utc_offset_seconds: Some(39600),
            hourly_units: None,
            hourly: Some(HourlyBlock {
                time: Some(vec![
                    "2026-10-19T00:00".to_string(),
                    "2026-10-19T01:00".to_string(),
                ]),
                temperature_2m: Some(vec![Some(11.5), Some(10.75)]),
                wind_direction_10m: Some(vec![Some(225.0), None]),
                ..HourlyBlock::default()
            }),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_key_for_location() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        assert_eq!(cache.key_for("Byron Bay"), "weather-charts-data-Byron Bay");
    }

    #[test]
    fn test_round_trip() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        cache.put("k", &payload()).unwrap();
        assert_eq!(cache.get("k"), Some(payload()));
    }

    #[test]
    fn test_fresh_until_ttl() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        cache.put_at("k", &payload(), t0()).unwrap();

        assert!(cache.get_at("k", t0()).is_some());
        assert!(cache.get_at("k", t0() + Duration::minutes(30)).is_some());
        assert!(cache
            .get_at("k", t0() + Duration::minutes(60) - Duration::milliseconds(1))
            .is_some());
        assert!(cache.get_at("k", t0() + Duration::minutes(60)).is_none());
        assert!(cache.get_at("k", t0() + Duration::hours(5)).is_none());
    }

    #[test]
    fn test_expired_entry_is_kept() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        cache.put_at("k", &payload(), t0()).unwrap();
        assert!(cache.get_at("k", t0() + Duration::hours(2)).is_none());
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        cache.put_at("k", &payload(), t0()).unwrap();

        let mut newer = payload();
        newer.latitude = Some(-34.0);
        cache.put_at("k", &newer, t0() + Duration::hours(3)).unwrap();

        assert_eq!(
            cache.get_at("k", t0() + Duration::hours(3)),
            Some(newer)
        );
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let cache = WeatherCache::with_defaults(store);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_out_of_range_timestamp_is_a_miss() {
        let store = MemoryStore::new();
        store
            .set(
                "k",
                r#"{"timestamp":-9223372036854775808,"data":{"hourly":{"time":["2026-10-19T00:00"],"temperature_2m":[12.0]}}}"#,
            )
            .unwrap();
        let cache = WeatherCache::with_defaults(store);
        assert!(cache.get("k").is_none());
        assert!(cache.get_at("k", t0()).is_none());
    }

    #[test]
    fn test_missing_key_is_a_miss() {
        let cache = WeatherCache::with_defaults(MemoryStore::new());
        assert!(cache.get("absent").is_none());
    }

    #[test]
    fn test_envelope_layout() {
        let store = MemoryStore::new();
        let cache = WeatherCache::with_defaults(store);
        cache.put_at("k", &payload(), t0()).unwrap();

        let raw = cache.store().get("k").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["timestamp"], t0().timestamp_millis());
        assert_eq!(value["data"]["hourly"]["temperature_2m"][1], 10.75);
    }

    #[test]
    fn test_sqlite_store_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_sqlite_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let cache = WeatherCache::with_defaults(SqliteStore::open(&path).unwrap());
            cache.put("weather-charts-data-Sydney", &payload()).unwrap();
        }

        let cache = WeatherCache::with_defaults(SqliteStore::open(&path).unwrap());
        assert_eq!(cache.get("weather-charts-data-Sydney"), Some(payload()));
    }
}
