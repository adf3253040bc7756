use std::path::PathBuf;

use uuid::Uuid;

use crate::persistence::{
    storage::StorageEngine,
    transaction::{TransactionFileWriteMode, TransactionWriteMode},
};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub restore: bool,
    pub write_mode: TransactionWriteMode,
    pub storage_engine: StorageEngine,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    /// Defines whether we should replay the transaction log on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Defines whether we should sync the file write to disk before marking the
    /// transaction as committed. This is useful for durability but can be slow ~3ms per sync
    pub fn set_sync_file_write(mut self, write_mode: TransactionWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    /// Shorthand for a file storage engine rooted at `data_directory`
    pub fn set_data_directory(self, data_directory: PathBuf) -> Self {
        self.set_storage_engine(StorageEngine::File(data_directory))
    }

    /// Throwaway database under the system temp directory, nothing is written to the log
    pub fn new_test() -> Self {
        let database_dir = std::env::temp_dir()
            .join("peopledb")
            .join(Uuid::new_v4().to_string());

        DatabaseOptions::default()
            .set_data_directory(database_dir)
            .set_restore(false)
            .set_sync_file_write(TransactionWriteMode::Off)
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            write_mode: TransactionWriteMode::File(TransactionFileWriteMode::Sync),
            // Defaults to $CWD/data
            storage_engine: StorageEngine::File(PathBuf::from("data")),
            restore: true,
        }
    }
}
