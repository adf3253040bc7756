use serde::{Deserialize, Serialize};

use crate::consts::consts::TransactionId;
use crate::database::table::table::Change;

use super::storage::{Storage, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionFileWriteMode {
    /// Writes the file to disk and performs an fsync before the commit is acknowledged
    Sync,
    /// Writes the file to disk, lets the OS buffer the writes
    OSBuffered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWriteMode {
    /// Writes the WAL to disk
    File(TransactionFileWriteMode),
    /// Used for testing purposes. Skips writing the file to disk
    Off,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub enum TransactionStatus {
    Committed,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub change: Change,
    pub status: TransactionStatus,
}

pub struct TransactionWAL {
    write_mode: TransactionWriteMode,
    current_transaction_id: TransactionId,
    storage: Box<dyn Storage + Send>,
    /// Set once a failed write could not be rolled back, the log tail is unknown from then on
    poisoned: Option<String>,
}

impl TransactionWAL {
    pub fn new(write_mode: TransactionWriteMode, storage: Box<dyn Storage + Send>) -> Self {
        Self {
            write_mode,
            current_transaction_id: TransactionId::new_first_transaction(),
            storage,
            poisoned: None,
        }
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn set_current_transaction_id(&mut self, transaction_id: TransactionId) {
        self.current_transaction_id = transaction_id;
    }

    /// Appends the change to the log, it is only considered committed once this returns.
    ///
    /// A write or sync failure truncates the log back to where it was, so a transaction the caller
    /// was told failed is never replayed on restore.
    pub fn commit(&mut self, change: &Change) -> StorageResult<TransactionId> {
        if let Some(reason) = &self.poisoned {
            return Err(StorageError::UnableToRollBackTransaction(reason.clone()));
        }

        let applying_transaction_id = self.current_transaction_id.increment();

        if let TransactionWriteMode::File(mode) = &self.write_mode {
            let transaction_json_line = format!(
                "{}\n",
                serde_json::to_string(&TransactionRef {
                    id: &applying_transaction_id,
                    change,
                    status: TransactionStatus::Committed,
                })
                .map_err(|e| StorageError::UnableToWriteTransaction(e.to_string()))?
            );

            let sync = mode == &TransactionFileWriteMode::Sync;
            let log_len = self.storage.transaction_len()?;

            if let Err(e) = self.append(transaction_json_line.as_bytes(), sync) {
                if let Err(rollback_error) = self.storage.transaction_truncate(log_len) {
                    log::error!("🚨 Transaction log is poisoned: {}", rollback_error);

                    self.poisoned = Some(rollback_error.to_string());
                    return Err(rollback_error);
                }

                return Err(e);
            }
        }

        self.current_transaction_id = applying_transaction_id;

        Ok(applying_transaction_id)
    }

    fn append(&mut self, transaction_json_line: &[u8], sync: bool) -> StorageResult<()> {
        self.storage.transaction_write(transaction_json_line)?;

        // Performs an fsync on the transaction log, ensuring that the transaction is durable
        // https://www.postgresql.org/docs/current/wal-reliability.html
        if sync {
            self.storage.transaction_sync()?;
        }

        Ok(())
    }

    pub fn sync(&self) -> StorageResult<()> {
        match self.write_mode {
            TransactionWriteMode::File(_) => self.storage.transaction_sync(),
            TransactionWriteMode::Off => Ok(()),
        }
    }

    pub fn restore(&mut self) -> StorageResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = vec![];

        let transactions_data = self.storage.transaction_load()?;

        for (line, transaction_string) in transactions_data.split('\n').enumerate() {
            if transaction_string.is_empty() {
                continue;
            }

            let transaction = serde_json::from_str(transaction_string)
                .map_err(|e| StorageError::CorruptTransaction(line + 1, e.to_string()))?;

            transactions.push(transaction);
        }

        Ok(transactions)
    }
}

/// Borrowed form of [`Transaction`] so a commit does not need to clone the change
#[derive(Serialize)]
struct TransactionRef<'a> {
    id: &'a TransactionId,
    change: &'a Change,
    status: TransactionStatus,
}
