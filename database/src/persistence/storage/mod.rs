use std::path::PathBuf;

use thiserror::Error;

use self::file::FileStorage;

pub mod file;
#[cfg(test)]
pub mod memory;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Unable to initialize persistence: {0}")]
    UnableToInitializePersistence(String),

    #[error("Unable to write transaction: {0}")]
    UnableToWriteTransaction(String),

    #[error("Unable to sync transaction buffer to persistent storage: {0}")]
    UnableToSyncTransactionBufferToPersistentStorage(String),

    #[error("Unable to load previous transactions: {0}")]
    UnableToLoadPreviousTransactions(String),

    #[error("Unable to parse transaction on line {0}: {1}")]
    CorruptTransaction(usize, String),

    #[error("Unable to roll back partially written transaction, log no longer accepts writes: {0}")]
    UnableToRollBackTransaction(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub fn io_to_generic_error(error: std::io::Error) -> String {
    format!("{} ({:?})", error, error.kind())
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// Directory that holds the transaction log
    File(PathBuf),
}

impl StorageEngine {
    pub fn get_engine(&self) -> StorageResult<Box<dyn Storage + Send>> {
        match self {
            StorageEngine::File(path) => Ok(Box::new(FileStorage::new(path.clone())?)),
        }
    }
}

pub trait Storage {
    /// Called on start-up, should be idempotent
    fn init(&self) -> StorageResult<()>;

    // Transactions
    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()>;
    fn transaction_sync(&self) -> StorageResult<()>;
    fn transaction_load(&mut self) -> StorageResult<String>;

    /// Size of the log in bytes, a failed write is rolled back to this
    fn transaction_len(&self) -> StorageResult<u64>;
    /// Drops everything past `len` and makes that durable
    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()>;
}
