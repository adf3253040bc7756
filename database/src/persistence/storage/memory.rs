use std::sync::{Arc, Mutex};

use super::{Storage, StorageError, StorageResult};

/// Keeps the log in memory, clones share it so a test can restart over the same log.
///
/// Failures are queued up front: each pending sync / torn write failure is used once.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub log: Arc<Mutex<Vec<u8>>>,
    pub syncs: Arc<Mutex<usize>>,
    pub failing_syncs: Arc<Mutex<usize>>,
    pub torn_writes: Arc<Mutex<usize>>,
    pub fail_truncate: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn fail_next_sync(self) -> Self {
        *self.failing_syncs.lock().unwrap() += 1;
        self
    }

    pub fn tear_next_write(self) -> Self {
        *self.torn_writes.lock().unwrap() += 1;
        self
    }

    pub fn fail_truncate(self) -> Self {
        *self.fail_truncate.lock().unwrap() = true;
        self
    }

    pub fn log_contents(&self) -> String {
        String::from_utf8(self.log.lock().unwrap().clone()).unwrap()
    }
}

fn take_one(counter: &Mutex<usize>) -> bool {
    let mut remaining = counter.lock().unwrap();

    if *remaining == 0 {
        return false;
    }

    *remaining -= 1;
    true
}

impl Storage for MemoryStorage {
    fn init(&self) -> StorageResult<()> {
        Ok(())
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        if take_one(&self.torn_writes) {
            // Half the line reaches the log before the device gives up
            let torn = &transaction[..transaction.len() / 2];
            self.log.lock().unwrap().extend_from_slice(torn);

            return Err(StorageError::UnableToWriteTransaction("EIO".to_string()));
        }

        self.log.lock().unwrap().extend_from_slice(transaction);
        Ok(())
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        if take_one(&self.failing_syncs) {
            return Err(StorageError::UnableToSyncTransactionBufferToPersistentStorage(
                "EIO".to_string(),
            ));
        }

        *self.syncs.lock().unwrap() += 1;
        Ok(())
    }

    fn transaction_load(&mut self) -> StorageResult<String> {
        Ok(self.log_contents())
    }

    fn transaction_len(&self) -> StorageResult<u64> {
        Ok(self.log.lock().unwrap().len() as u64)
    }

    fn transaction_truncate(&mut self, len: u64) -> StorageResult<()> {
        if *self.fail_truncate.lock().unwrap() {
            return Err(StorageError::UnableToRollBackTransaction("EROFS".to_string()));
        }

        self.log.lock().unwrap().truncate(len as usize);
        Ok(())
    }
}
