//! In-memory keyed store for pools and farms

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::shared::errors::AmmError;

/// Handle to one record; holding its lock serialises every operation on it
pub type Record<V> = Arc<Mutex<V>>;

/// Keyed registry with one lock per record.
///
/// The map lock is only held for lookups and inserts, never while a record
/// is being mutated, so operations on different keys run concurrently.
/// Records are never removed.
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, Record<V>>>,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Ord + Clone + Display,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new record; the existence check and the insert are one step
    pub async fn create(&self, key: K, value: V) -> Result<Record<V>, AmmError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Err(AmmError::AlreadyExists(key.to_string()));
        }

        let record = Arc::new(Mutex::new(value));
        entries.insert(key, record.clone());
        Ok(record)
    }

    pub async fn get(&self, key: &K) -> Option<Record<V>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Record handles ordered by key
    pub async fn records(&self) -> Vec<(K, Record<V>)> {
        let entries = self.entries.read().await;
        let mut records: Vec<(K, Record<V>)> = entries
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        records
    }

    /// Copy of every record, ordered by key
    pub async fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut values = Vec::new();
        for (_, record) in self.records().await {
            values.push(record.lock().await.clone());
        }
        values
    }

    /// Fail with `AlreadyExists` if any key is taken or repeated
    pub async fn ensure_vacant<'a>(&self, keys: impl IntoIterator<Item = &'a K>) -> Result<(), AmmError>
    where
        K: 'a,
    {
        let entries = self.entries.read().await;
        Self::check_vacant(&entries, keys)
    }

    /// Load records saved earlier; fails without inserting anything on a duplicate key
    pub async fn restore(&self, records: Vec<(K, V)>) -> Result<usize, AmmError> {
        let mut entries = self.entries.write().await;
        Self::check_vacant(&entries, records.iter().map(|(key, _)| key))?;

        let count = records.len();
        for (key, value) in records {
            entries.insert(key, Arc::new(Mutex::new(value)));
        }
        Ok(count)
    }

    fn check_vacant<'a>(
        entries: &HashMap<K, Record<V>>,
        keys: impl IntoIterator<Item = &'a K>,
    ) -> Result<(), AmmError>
    where
        K: 'a,
    {
        let mut seen = HashSet::new();
        for key in keys {
            if entries.contains_key(key) || !seen.insert(key) {
                return Err(AmmError::AlreadyExists(key.to_string()));
            }
        }
        Ok(())
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Eq + Hash + Ord + Clone + Display,
{
    fn default() -> Self {
        Self::new()
    }
}
