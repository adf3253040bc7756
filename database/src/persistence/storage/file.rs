use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};

use crate::consts::consts::TRANSACTION_LOG_FILE;

use super::{io_to_generic_error, Storage, StorageError, StorageResult};

pub struct FileStorage {
    base_path: PathBuf,
    log_file: File,
    transaction_file_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        let transaction_file_path = base_path.join(TRANSACTION_LOG_FILE);

        std::fs::create_dir_all(&base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        let log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&transaction_file_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))?;

        Ok(Self {
            base_path,
            log_file,
            transaction_file_path,
        })
    }
}

impl Storage for FileStorage {
    fn init(&self) -> StorageResult<()> {
        std::fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageError::UnableToInitializePersistence(io_to_generic_error(e)))
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        // Buffered OS write, is not 'durable' without the fsync
        self.log_file
            .write_all(transaction)
            .map_err(|e| StorageError::UnableToWriteTransaction(io_to_generic_error(e)))
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        self.log_file.sync_all().map_err(|e| {
            StorageError::UnableToSyncTransactionBufferToPersistentStorage(io_to_generic_error(e))
        })
    }

    // File may or may not exist
    fn transaction_load(&mut self) -> StorageResult<String> {
        let mut contents = String::new();

        let mut file = match File::open(&self.transaction_file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(contents),
            Err(e) => {
                return Err(StorageError::UnableToLoadPreviousTransactions(
                    io_to_generic_error(e),
                ))
            }
        };

        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::UnableToLoadPreviousTransactions(io_to_generic_error(e)))?;

        Ok(contents)
    }

    fn transaction_len(&self) -> StorageResult<u64> {
        self.log_file
            .metadata()
            .map(|metadata| metadata.len())
            .map_err(|e| StorageError::UnableToWriteTransaction(io_to_generic_error(e)))
    }

    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()> {
        // Log is opened in append mode, the next write lands at the new end
        self.log_file
            .set_len(len)
            .and_then(|_| self.log_file.sync_all())
            .map_err(|e| StorageError::UnableToRollBackTransaction(io_to_generic_error(e)))
    }
}
