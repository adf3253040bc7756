use std::{thread, time::Instant};

use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use crate::{
    model::statement::{Statement, StatementResult},
    persistence::{
        storage::{Storage, StorageError},
        transaction::TransactionWAL,
    },
};

use super::{
    options::DatabaseOptions,
    request_manager::{DatabaseCommand, DatabaseRequest, DatabaseResponse, RequestManager},
    table::table::{ApplyErrors, PersonTable},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatabaseError {
    #[error("Rolled back: {0}")]
    Apply(#[from] ApplyErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unable to start database worker: {0}")]
    WorkerSpawn(String),
}

pub struct Database {
    person_table: PersonTable,
    transaction_wal: TransactionWAL,
    database_options: DatabaseOptions,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> Result<Self, DatabaseError> {
        let storage = options.storage_engine.get_engine()?;

        Self::with_storage(options, storage)
    }

    /// Same as [`Database::new`] over an already built storage, the options' storage engine is ignored
    pub fn with_storage(
        options: DatabaseOptions,
        storage: Box<dyn Storage + Send>,
    ) -> Result<Self, DatabaseError> {
        storage.init()?;

        let mut database = Self {
            person_table: PersonTable::new(),
            transaction_wal: TransactionWAL::new(options.write_mode.clone(), storage),
            database_options: options,
        };

        if database.database_options.restore {
            database.restore()?;
        }

        Ok(database)
    }

    /// Replays the transaction log into the (empty) table
    fn restore(&mut self) -> Result<(), DatabaseError> {
        log::info!(
            "Storage Engine: [{:?}]",
            self.database_options.storage_engine
        );

        let now = Instant::now();

        let restored_transactions = self.transaction_wal.restore()?;
        let restored_transaction_count = restored_transactions.len();

        for transaction in restored_transactions {
            self.person_table.restore(transaction.change)?;
            self.transaction_wal.set_current_transaction_id(transaction.id);
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [Rows: {}, TransactionsApplied: {}, CurrentTxId: {}]",
            self.person_table.len().to_formatted_string(&Locale::en),
            restored_transaction_count.to_formatted_string(&Locale::en),
            self.transaction_wal
                .get_current_transaction_id()
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(())
    }

    /// Moves the database onto its own worker thread, all mutations are serialized through it.
    ///
    /// The returned request manager is the handle for talking to the worker, clone it per caller.
    pub fn run(self) -> Result<RequestManager, DatabaseError> {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        thread::Builder::new()
            .name("Database".to_string())
            .spawn(move || self.serve(database_receiver))
            .map_err(|e| DatabaseError::WorkerSpawn(e.to_string()))?;

        Ok(RequestManager::new(database_sender))
    }

    fn serve(mut self, database_receiver: flume::Receiver<DatabaseRequest>) {
        // Exits once a shutdown is requested or every request manager has been dropped
        while let Ok(DatabaseRequest { command, resolver }) = database_receiver.recv() {
            log::debug!("Received request: {}", command.log_format());

            match command {
                DatabaseCommand::Statement(statement) => {
                    let response = self.process_statement(statement);

                    // Caller may have timed out and gone away, nothing left to do with the response
                    let _ = resolver.send(response);
                }
                DatabaseCommand::Shutdown => {
                    let response = self
                        .transaction_wal
                        .sync()
                        .map(|_| {
                            StatementResult::SuccessStatus(
                                "Successfully shutdown database".to_string(),
                            )
                        })
                        .map_err(DatabaseError::from);

                    log::info!("Shutting down database");

                    let _ = resolver.send(response);

                    return;
                }
            }
        }
    }

    pub fn process_statement(&mut self, statement: Statement) -> DatabaseResponse {
        if statement.is_query() {
            return Ok(self.person_table.query(&statement));
        }

        let change = match self.person_table.prepare(statement) {
            Ok(change) => change,
            Err(e) => {
                log::info!("⚠️  Rolled back: {}", e);
                return Err(e.into());
            }
        };

        // Table is only touched once the change is in the log, a failed write leaves it as it was
        let transaction_id = match self.transaction_wal.commit(&change) {
            Ok(transaction_id) => transaction_id,
            Err(e) => {
                log::error!("Unable to write to transaction log, rolled back: {}", e);
                return Err(e.into());
            }
        };

        let person = self.person_table.commit(change);

        log::info!("✅ Committed: [TX: {}, Id: {}]", transaction_id, person.id);

        Ok(StatementResult::Single(person))
    }
}
