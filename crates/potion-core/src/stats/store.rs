use super::StatsState;
use super::schema::{self, Anomaly, LoadReport, RawStats, StorageKeys};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to commit statistics: {0}")]
    Commit(#[source] StoreError),
}

/// Durable string key-value storage.
///
/// `set` may buffer; `commit` makes everything written so far durable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        (**self).commit()
    }
}

/// Where the round state machine sends statistics after each mutation.
pub trait StatsGateway {
    fn load(&mut self) -> LoadReport;
    fn save(&mut self, stats: &StatsState) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone)]
pub struct StatsRepository<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> StatsRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read(&self, key: &str, anomalies: &mut Vec<Anomaly>) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                anomalies.push(Anomaly {
                    key: key.to_string(),
                    reason: format!("read failed: {err}"),
                });
                None
            }
        }
    }
}

impl<S: KeyValueStore> StatsGateway for StatsRepository<S> {
    fn load(&mut self) -> LoadReport {
        let mut anomalies = Vec::new();
        let raw = RawStats {
            global_counts: self.read(&self.keys.global_counts, &mut anomalies),
            global_total: self.read(&self.keys.global_total, &mut anomalies),
            conditional_counts: self.read(&self.keys.conditional_counts, &mut anomalies),
            energy_occurrences: self.read(&self.keys.energy_occurrences, &mut anomalies),
        };
        schema::decode(&self.keys, raw, anomalies)
    }

    fn save(&mut self, stats: &StatsState) -> Result<(), PersistenceError> {
        for (key, encoded) in schema::encode(&self.keys, stats) {
            let value = encoded.map_err(|source| PersistenceError::Encode {
                key: key.clone(),
                source,
            })?;
            self.store
                .set(&key, value)
                .map_err(|source| PersistenceError::Write { key, source })?;
        }
        self.store.commit().map_err(PersistenceError::Commit)?;

        event!(
            target: "potion_core::stats",
            Level::DEBUG,
            total = stats.global_total(),
            "statistics saved"
        );
        Ok(())
    }
}

/// In-process store. Writes can be made to fail to exercise warning paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write reports an exhausted quota.
    pub fn failing() -> Self {
        Self {
            entries: BTreeMap::new(),
            fail_writes: true,
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::QuotaExceeded);
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, PersistenceError, StatsGateway, StatsRepository, StoreError};
    use crate::model::card::CardKind;
    use crate::stats::StatsState;
    use crate::stats::schema::StorageKeys;

    #[test]
    fn empty_store_loads_zeroed_stats() {
        let mut repo = StatsRepository::new(MemoryStore::new());
        let report = repo.load();
        assert!(report.is_clean());
        assert_eq!(report.stats, StatsState::new());
    }

    #[test]
    fn save_writes_all_four_keys() {
        let mut repo = StatsRepository::new(MemoryStore::new());
        let mut stats = StatsState::new();
        stats.record_play(CardKind::FirstLove, 2);
        repo.save(&stats).unwrap();

        let keys = repo.keys().clone();
        assert_eq!(repo.store().len(), 4);
        assert_eq!(repo.store().raw(&keys.global_total), Some("1"));
        assert_eq!(repo.load().stats, stats);
    }

    #[test]
    fn save_then_load_does_not_drift() {
        let mut repo = StatsRepository::new(MemoryStore::new());
        let mut stats = StatsState::new();
        stats.record_play(CardKind::IronWall, 3);
        stats.record_play(CardKind::MagicBoost, 0);
        repo.save(&stats).unwrap();

        let first = repo.load().stats;
        repo.save(&first).unwrap();
        let second = repo.load().stats;
        assert_eq!(first, second);
    }

    #[test]
    fn failing_store_reports_write_error() {
        let mut repo = StatsRepository::new(MemoryStore::failing());
        let err = repo.save(&StatsState::new()).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Write {
                source: StoreError::QuotaExceeded,
                ..
            }
        ));
        assert!(repo.store().is_empty());
    }

    #[test]
    fn namespaces_do_not_collide() {
        let mut store = MemoryStore::new();
        let mut stats = StatsState::new();
        stats.record_play(CardKind::ColdWall, 1);
        {
            let mut repo = StatsRepository::with_keys(&mut store, StorageKeys::new("a"));
            repo.save(&stats).unwrap();
        }
        let mut other = StatsRepository::with_keys(&mut store, StorageKeys::new("b"));
        assert_eq!(other.load().stats, StatsState::new());
    }
}
