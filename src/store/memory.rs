use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{Entry, Listed, Namespace, PutOptions, Record, StoreError, now};

/// Namespace held in a `BTreeMap`, whose `String` ordering is the same
/// byte-wise order redb uses for `&str` keys.
pub struct MemoryNamespace<M> {
    entries: RwLock<BTreeMap<String, Record<M>>>,
}

impl<M> MemoryNamespace<M> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<M> Default for MemoryNamespace<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Namespace<M> for MemoryNamespace<M>
where
    M: Clone + Send + Sync,
{
    fn get_with_metadata(&self, key: &str) -> Result<Option<Entry<M>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let now = now();

        Ok(entries
            .get(key)
            .filter(|record| !record.is_expired(now))
            .map(|record| Entry {
                value: record.value.clone(),
                metadata: record.metadata.clone(),
            }))
    }

    fn put(&self, key: &str, value: &str, options: PutOptions<M>) -> Result<(), StoreError> {
        let record = Record::new(value, options, now());
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), record);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<Listed<M>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let now = now();

        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .filter(|(_, record)| !record.is_expired(now))
            .map(|(name, record)| Listed {
                name: name.clone(),
                metadata: record.metadata.clone(),
            })
            .collect())
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let now = now();
        let before = entries.len();
        entries.retain(|_, record| !record.is_expired(now));
        Ok(before - entries.len())
    }
}
