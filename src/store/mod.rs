//! Key-value namespaces.
//!
//! The service persists everything in five independent, lexicographically
//! ordered namespaces. A key *is* the relationship: children are found by
//! listing the parent's key followed by `:`.
//!
//! ```text
//! users            <username>:<userId>                      -> ""          {id, password}
//! sessions         <token>                                  -> <username>:<userId>  (TTL)
//! collections      user:<userId>:col:<colId>                -> ""          {title}
//! sub_collections  user:<userId>:col:<colId>:sub:<subId>    -> ""          {title}
//! flashcards       <colKey|subKey>:card:<cardId>            -> layer JSON  {title}
//! ```
//!
//! Handlers reach the namespaces through [`Store`], which is cloned into every
//! request. Calls are blocking; run them on `spawn_blocking`.

mod disk;
mod memory;

pub use disk::DiskNamespace;
pub use memory::MemoryNamespace;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::db::{Db, tables};
use crate::models::{TitleMetadata, UserMetadata};

/// Errors raised by a namespace backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Namespace lock poisoned")]
    Poisoned,
}

/// A value together with its attached metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<M> {
    pub value: String,
    pub metadata: Option<M>,
}

/// One result of a prefix listing. Listing never returns values.
#[derive(Debug, Clone, PartialEq)]
pub struct Listed<M> {
    pub name: String,
    pub metadata: Option<M>,
}

/// Options for [`Namespace::put`]
#[derive(Debug, Clone)]
pub struct PutOptions<M> {
    pub metadata: Option<M>,
    /// Seconds until the entry expires; `None` keeps it forever
    pub expiration_ttl: Option<u64>,
}

impl<M> Default for PutOptions<M> {
    fn default() -> Self {
        Self {
            metadata: None,
            expiration_ttl: None,
        }
    }
}

impl<M> PutOptions<M> {
    pub fn with_metadata(metadata: M) -> Self {
        Self {
            metadata: Some(metadata),
            expiration_ttl: None,
        }
    }

    pub fn with_ttl(expiration_ttl: u64) -> Self {
        Self {
            metadata: None,
            expiration_ttl: Some(expiration_ttl),
        }
    }
}

/// A sorted string-keyed mapping with per-entry metadata and optional expiry.
///
/// `list` must return entries in byte-wise lexicographic key order and only
/// those whose key starts with `prefix`. Expired entries behave as absent.
pub trait Namespace<M>: Send + Sync {
    fn get_with_metadata(&self, key: &str) -> Result<Option<Entry<M>>, StoreError>;

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_with_metadata(key)?.map(|entry| entry.value))
    }

    fn put(&self, key: &str, value: &str, options: PutOptions<M>) -> Result<(), StoreError>;

    /// Deleting an absent key is not an error
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    fn list(&self, prefix: &str) -> Result<Vec<Listed<M>>, StoreError>;

    /// Physically remove expired entries, returning how many were removed
    fn purge_expired(&self) -> Result<usize, StoreError>;
}

/// Stored form of an entry, shared by both backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Record<M> {
    pub value: String,
    pub metadata: Option<M>,
    /// Absolute unix timestamp after which the record is gone
    pub expires_at: Option<i64>,
}

impl<M> Record<M> {
    pub fn new(value: &str, options: PutOptions<M>, now: i64) -> Self {
        Self {
            value: value.to_string(),
            metadata: options.metadata,
            expires_at: options
                .expiration_ttl
                .map(|ttl| now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX))),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The five namespaces the service reads and writes
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn Namespace<UserMetadata>>,
    pub sessions: Arc<dyn Namespace<()>>,
    pub collections: Arc<dyn Namespace<TitleMetadata>>,
    pub sub_collections: Arc<dyn Namespace<TitleMetadata>>,
    pub flashcards: Arc<dyn Namespace<TitleMetadata>>,
    db: Option<Db>,
}

impl Store {
    /// Namespaces backed by the tables of an opened redb database
    pub fn open(db: Db) -> Self {
        Self {
            users: Arc::new(DiskNamespace::new(db.clone(), tables::USERS)),
            sessions: Arc::new(DiskNamespace::new(db.clone(), tables::SESSIONS)),
            collections: Arc::new(DiskNamespace::new(db.clone(), tables::COLLECTIONS)),
            sub_collections: Arc::new(DiskNamespace::new(db.clone(), tables::SUB_COLLECTIONS)),
            flashcards: Arc::new(DiskNamespace::new(db.clone(), tables::FLASHCARDS)),
            db: Some(db),
        }
    }

    /// Volatile namespaces, used by tests
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryNamespace::new()),
            sessions: Arc::new(MemoryNamespace::new()),
            collections: Arc::new(MemoryNamespace::new()),
            sub_collections: Arc::new(MemoryNamespace::new()),
            flashcards: Arc::new(MemoryNamespace::new()),
            db: None,
        }
    }

    /// Check the backend answers a read
    pub fn ping(&self) -> Result<(), StoreError> {
        match &self.db {
            Some(db) => {
                use redb::ReadableDatabase;
                let _read_txn = db.begin_read()?;
                Ok(())
            }
            None => self.sessions.list("").map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use tempfile::TempDir;

    fn title(title: &str) -> TitleMetadata {
        TitleMetadata {
            title: title.to_string(),
        }
    }

    /// Behaviour every backend must share
    fn exercise_namespace(ns: &dyn Namespace<TitleMetadata>) {
        assert_eq!(ns.get("missing").unwrap(), None);

        ns.put("user:a:col:2", "", PutOptions::with_metadata(title("two")))
            .unwrap();
        ns.put("user:a:col:1", "", PutOptions::with_metadata(title("one")))
            .unwrap();
        ns.put("user:ab:col:3", "", PutOptions::with_metadata(title("other")))
            .unwrap();
        ns.put("user:a:col:1:card:9", "[]", PutOptions::default())
            .unwrap();

        let entry = ns.get_with_metadata("user:a:col:1").unwrap().unwrap();
        assert_eq!(entry.value, "");
        assert_eq!(entry.metadata, Some(title("one")));
        assert_eq!(ns.get("user:a:col:1:card:9").unwrap().as_deref(), Some("[]"));

        // Prefix listing is ordered and stops at the first non-matching key
        let names: Vec<String> = ns
            .list("user:a:")
            .unwrap()
            .into_iter()
            .map(|listed| listed.name)
            .collect();
        assert_eq!(
            names,
            vec!["user:a:col:1", "user:a:col:1:card:9", "user:a:col:2"]
        );
        assert_eq!(ns.list("user:").unwrap().len(), 4);
        assert!(ns.list("user:b:").unwrap().is_empty());

        // Overwrite replaces value and metadata together
        ns.put("user:a:col:2", "x", PutOptions::with_metadata(title("deux")))
            .unwrap();
        let entry = ns.get_with_metadata("user:a:col:2").unwrap().unwrap();
        assert_eq!(entry.value, "x");
        assert_eq!(entry.metadata, Some(title("deux")));

        ns.delete("user:a:col:2").unwrap();
        ns.delete("user:a:col:2").unwrap();
        assert_eq!(ns.get("user:a:col:2").unwrap(), None);

        // A zero TTL expires immediately
        ns.put("user:z:col:0", "", PutOptions::with_ttl(0)).unwrap();
        assert_eq!(ns.get("user:z:col:0").unwrap(), None);
        assert!(ns.list("user:z:").unwrap().is_empty());
        assert_eq!(ns.purge_expired().unwrap(), 1);
        assert_eq!(ns.purge_expired().unwrap(), 0);

        ns.put("user:z:col:1", "", PutOptions::with_ttl(3600)).unwrap();
        assert_eq!(ns.get("user:z:col:1").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_memory_namespace() {
        exercise_namespace(&MemoryNamespace::new());
    }

    #[test]
    fn test_disk_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.redb")).unwrap();
        exercise_namespace(&DiskNamespace::new(db, tables::COLLECTIONS));
    }

    #[test]
    fn test_store_ping() {
        assert!(Store::in_memory().ping().is_ok());

        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.redb")).unwrap();
        assert!(Store::open(db).ping().is_ok());
    }

    #[test]
    fn test_record_expiry() {
        let record: Record<()> = Record::new("v", PutOptions::with_ttl(10), 1_000);
        assert_eq!(record.expires_at, Some(1_010));
        assert!(!record.is_expired(1_009));
        assert!(record.is_expired(1_010));

        let forever: Record<()> = Record::new("v", PutOptions::default(), 1_000);
        assert!(!forever.is_expired(i64::MAX));
    }
}
