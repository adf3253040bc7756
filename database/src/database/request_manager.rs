use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
    store::{Store, StoreError, StoreResult},
};

use super::{database::DatabaseError, table::table::ApplyErrors};

/// Database commands are how we interact with the database worker
#[derive(Debug)]
pub enum DatabaseCommand {
    Statement(Statement),
    /// Syncs the transaction log and stops the worker, requests queued after this are dropped
    Shutdown,
}

impl DatabaseCommand {
    /// Prints complex logs in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseCommand::Statement(Statement::List) => "List".to_string(),
            _ => format!("{:?}", self),
        }
    }
}

pub type DatabaseResponse = Result<StatementResult, DatabaseError>;

pub struct DatabaseRequest {
    pub resolver: oneshot::Sender<DatabaseResponse>,
    pub command: DatabaseCommand,
}

#[derive(Error, Debug, PartialEq)]
pub enum RequestManagerError {
    #[error("Database worker has exited")]
    DatabaseUnavailable,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Goal of the request manager is to provide a simple interface for interacting with the database
///
/// Handles are cheap to clone, each HTTP request takes its own and drops it once the response is written.
/// The typed CRUD API lives on the [`Store`] implementation, the statement based API is available for
/// anything else.
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseRequest>,
}

impl RequestManager {
    pub fn new(database_sender: flume::Sender<DatabaseRequest>) -> Self {
        Self { database_sender }
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        let result = self.send_database_request(DatabaseCommand::Shutdown)?;

        Ok(result.success_status())
    }

    /// Sends a single statement to the database and returns a single statement result
    pub fn send_single_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        self.send_database_request(DatabaseCommand::Statement(statement))
    }

    fn send_database_request(
        &self,
        command: DatabaseCommand,
    ) -> Result<StatementResult, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseResponse>();

        let request = DatabaseRequest { resolver, command };

        // Sends the request to the database worker, database will respond
        //  on the response_receiver once it's finished processing the request
        self.database_sender
            .send(request)
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?;

        // No deadline, a mutation that is still queued will commit, so the caller waits to hear
        // how it went
        response_receiver
            .recv()
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?
            .map_err(RequestManagerError::from)
    }
}

impl From<RequestManagerError> for StoreError {
    fn from(error: RequestManagerError) -> Self {
        match error {
            RequestManagerError::DatabaseUnavailable => StoreError::Unavailable,
            RequestManagerError::Database(e) => StoreError::Internal(e.to_string()),
        }
    }
}

impl Store for RequestManager {
    fn list(&self) -> StoreResult<Vec<Person>> {
        Ok(self.send_single_statement(Statement::List)?.list())
    }

    fn get(&self, id: PersonId) -> StoreResult<Option<Person>> {
        Ok(self.send_single_statement(Statement::Get(id))?.get_single())
    }

    fn add(&self, person: Person) -> StoreResult<Person> {
        Ok(self.send_single_statement(Statement::Add(person))?.single())
    }

    fn update(&self, person: Person) -> StoreResult<Person> {
        match self.send_single_statement(Statement::Update(person)) {
            Ok(result) => Ok(result.single()),
            Err(RequestManagerError::Database(DatabaseError::Apply(
                ApplyErrors::CannotUpdateDoesNotExist(id),
            ))) => Err(StoreError::Conflict(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, id: PersonId) -> StoreResult<Option<Person>> {
        match self.send_single_statement(Statement::Remove(id)) {
            Ok(result) => Ok(Some(result.single())),
            Err(RequestManagerError::Database(DatabaseError::Apply(
                ApplyErrors::CannotDeleteDoesNotExist(_),
            ))) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, id: PersonId) -> StoreResult<bool> {
        Ok(self.send_single_statement(Statement::Exists(id))?.exists())
    }
}
