use std::collections::BTreeMap;
use thiserror::Error;

use crate::{
    consts::consts::{PersonId, FIRST_PERSON_ID},
    model::{
        person::Person,
        statement::{Statement, StatementResult},
    },
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(PersonId),

    // CRUD - UPDATE
    #[error("Cannot update, record does not exist: {0}")]
    CannotUpdateDoesNotExist(PersonId),

    // CRUD - DELETE
    #[error("Cannot delete, record does not exist: {0}")]
    CannotDeleteDoesNotExist(PersonId),

    #[error("Statement is not a mutation: {0}")]
    NotAMutation(String),
}

/// A verified mutation, ready to be written to the transaction log and applied to the table
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub enum Change {
    Insert(Person),
    Replace { previous: Person, current: Person },
    Delete(Person),
}

pub struct PersonTable {
    pub person_rows: BTreeMap<PersonId, Person>,
    /// Identity counter, never handed out twice even once the row is deleted
    pub next_id: PersonId,
}

impl Default for PersonTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonTable {
    pub fn new() -> Self {
        Self {
            person_rows: BTreeMap::new(),
            next_id: FIRST_PERSON_ID,
        }
    }

    pub fn query(&self, statement: &Statement) -> StatementResult {
        match statement {
            Statement::Get(id) => StatementResult::GetSingle(self.person_rows.get(id).cloned()),
            Statement::Exists(id) => StatementResult::Exists(self.person_rows.contains_key(id)),
            Statement::List => StatementResult::List(self.person_rows.values().cloned().collect()),
            Statement::Add(_) | Statement::Update(_) | Statement::Remove(_) => {
                panic!("Should only contain query statements")
            }
        }
    }

    // Each mutation statement is broken up into 2 steps
    //  - Verifying validity / assigning identity (prepare), does not touch the table
    //  - Applying the change (commit), only after it has been logged
    pub fn prepare(&self, statement: Statement) -> Result<Change, ApplyErrors> {
        match statement {
            Statement::Add(person) => Ok(Change::Insert(Person {
                id: self.next_id,
                ..person
            })),
            Statement::Update(person) => {
                let previous = self
                    .person_rows
                    .get(&person.id)
                    .ok_or(ApplyErrors::CannotUpdateDoesNotExist(person.id))?;

                Ok(Change::Replace {
                    previous: previous.clone(),
                    current: person,
                })
            }
            Statement::Remove(id) => {
                let previous = self
                    .person_rows
                    .get(&id)
                    .ok_or(ApplyErrors::CannotDeleteDoesNotExist(id))?;

                Ok(Change::Delete(previous.clone()))
            }
            statement => Err(ApplyErrors::NotAMutation(format!("{:?}", statement))),
        }
    }

    /// Returns the person the caller should see: the stored record for inserts / replaces, the prior value for deletes
    pub fn commit(&mut self, change: Change) -> Person {
        match change {
            Change::Insert(person) => {
                self.bump_identity(person.id);
                self.person_rows.insert(person.id, person.clone());
                person
            }
            Change::Replace { current, .. } => {
                self.person_rows.insert(current.id, current.clone());
                current
            }
            Change::Delete(previous) => {
                self.person_rows.remove(&previous.id);
                previous
            }
        }
    }

    /// Used when replaying the transaction log, rows keep the ids they were given originally
    pub fn restore(&mut self, change: Change) -> Result<(), ApplyErrors> {
        match &change {
            Change::Insert(person) if self.person_rows.contains_key(&person.id) => {
                return Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id))
            }
            Change::Replace { current, .. } if !self.person_rows.contains_key(&current.id) => {
                return Err(ApplyErrors::CannotUpdateDoesNotExist(current.id))
            }
            Change::Delete(previous) if !self.person_rows.contains_key(&previous.id) => {
                return Err(ApplyErrors::CannotDeleteDoesNotExist(previous.id))
            }
            _ => {}
        }

        self.commit(change);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.person_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.person_rows.is_empty()
    }

    fn bump_identity(&mut self, id: PersonId) {
        if id >= self.next_id {
            self.next_id = id.increment();
        }
    }
}
