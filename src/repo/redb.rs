use crate::repo::model::Repository;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

type KeyedTable = TableDefinition<'static, &'static str, &'static [u8]>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database: {0}")]
    Database(#[from] redb::DatabaseError),
    #[error("transaction: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("table: {0}")]
    Table(#[from] redb::TableError),
    #[error("storage: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("commit: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("encode: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("decode: {0}")]
    Decode(#[from] bson::de::Error),
}

/// A redb table of bson documents keyed by string.
pub struct RedbRepo<T> {
    table: KeyedTable,
    db: Arc<Database>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RedbRepo<T> {
    pub fn new(table: KeyedTable, db: Arc<Database>) -> Self {
        Self {
            table,
            db,
            _marker: PhantomData,
        }
    }

    pub fn create(table: KeyedTable, name: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self::new(table, Arc::new(Database::create(name)?)))
    }
}

impl<T> Repository<T> for RedbRepo<T>
where
    T: Serialize + DeserializeOwned,
{
    type Err = Error;

    fn get(&self, key: &str) -> Result<Option<T>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(self.table) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let found = table.get(key)?;
        Ok(match found {
            Some(guard) => Some(bson::from_slice(guard.value())?),
            None => None,
        })
    }

    fn revoke(&mut self, key: &str) -> Result<Option<T>, Error> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(self.table)?;
            let guard = table.remove(key)?;
            match guard {
                Some(guard) => Some(bson::from_slice(guard.value())?),
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn put(&mut self, key: &str, data: T) -> Result<(), Error> {
        let bytes = bson::to_vec(&data)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn entries(&self) -> Result<impl Iterator<Item = (String, T)>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(self.table) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Ok(Vec::<(String, T)>::new().into_iter())
            }
            Err(e) => return Err(e.into()),
        };
        let mut entries: Vec<(String, T)> = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            entries.push((key.value().to_string(), bson::from_slice(value.value())?));
        }
        Ok(entries.into_iter())
    }
}
