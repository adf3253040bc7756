use thiserror::Error;

use crate::{consts::consts::PersonId, model::person::Person};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The write targeted a record that changed or vanished since it was read
    #[error("Concurrency conflict, record was modified or removed before commit: {0}")]
    Conflict(PersonId),

    #[error("Store is no longer accepting requests")]
    Unavailable,

    #[error("Store failure: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence of person records. Calls block until the store has answered, every mutating call
/// has committed by the time it returns Ok.
pub trait Store {
    /// Every live record, in store order
    fn list(&self) -> StoreResult<Vec<Person>>;

    fn get(&self, id: PersonId) -> StoreResult<Option<Person>>;

    /// Assigns a new id, the returned record carries it
    fn add(&self, person: Person) -> StoreResult<Person>;

    /// Replaces every field of the record with `person.id`, `Conflict` if it no longer exists
    fn update(&self, person: Person) -> StoreResult<Person>;

    /// Deletes the record and returns what it held
    fn remove(&self, id: PersonId) -> StoreResult<Option<Person>>;

    fn exists(&self, id: PersonId) -> StoreResult<bool>;
}
