use std::marker::PhantomData;

use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};

use super::{Entry, Listed, Namespace, PutOptions, Record, StoreError, now};
use crate::db::Db;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Namespace stored in one redb table as bincode-encoded [`Record`]s
pub struct DiskNamespace<M> {
    db: Db,
    table: Table,
    _metadata: PhantomData<fn() -> M>,
}

impl<M> DiskNamespace<M> {
    pub fn new(db: Db, table: Table) -> Self {
        Self {
            db,
            table,
            _metadata: PhantomData,
        }
    }
}

fn decode<M: DeserializeOwned>(bytes: &[u8]) -> Result<Record<M>, StoreError> {
    let (record, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(record)
}

impl<M> Namespace<M> for DiskNamespace<M>
where
    M: Serialize + DeserializeOwned,
{
    fn get_with_metadata(&self, key: &str) -> Result<Option<Entry<M>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table)?;

        let Some(bytes) = table.get(key)? else {
            return Ok(None);
        };
        let record: Record<M> = decode(bytes.value())?;

        if record.is_expired(now()) {
            return Ok(None);
        }

        Ok(Some(Entry {
            value: record.value,
            metadata: record.metadata,
        }))
    }

    fn put(&self, key: &str, value: &str, options: PutOptions<M>) -> Result<(), StoreError> {
        let record = Record::new(value, options, now());
        let bytes = bincode::serde::encode_to_vec(&record, BINCODE_CONFIG)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table)?;
            table.remove(key)?;
        }
        write_txn.commit()?;

        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<Listed<M>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table)?;
        let now = now();

        let mut listed = Vec::new();
        for item in table.range(prefix..)? {
            let (name, bytes) = item?;
            let name = name.value();
            if !name.starts_with(prefix) {
                break;
            }

            let record: Record<M> = decode(bytes.value())?;
            if record.is_expired(now) {
                continue;
            }

            listed.push(Listed {
                name: name.to_string(),
                metadata: record.metadata,
            });
        }

        Ok(listed)
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = now();

        let write_txn = self.db.begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(self.table)?;

            let mut expired = Vec::new();
            for item in table.iter()? {
                let (name, bytes) = item?;
                let record: Record<M> = decode(bytes.value())?;
                if record.is_expired(now) {
                    expired.push(name.value().to_string());
                }
            }

            for name in &expired {
                table.remove(name.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;

        Ok(purged)
    }
}
