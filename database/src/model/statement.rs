use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

use super::person::Person;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    /// Id on the person is ignored, the table assigns one
    Add(Person),
    /// Full replace of every field except the id
    Update(Person),
    Remove(PersonId),
    Get(PersonId),
    Exists(PersonId),
    /// Returns a list of Person
    List,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::Remove(_) | Statement::Update(_) => true,
            Statement::List | Statement::Get(_) | Statement::Exists(_) => false,
        }
    }
}

// TODO: Is there a better way to type this? Like if we know we are going to get a Single, we should be able to unwrap it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    /// Used for database status messages
    SuccessStatus(String),
    Single(Person),
    GetSingle(Option<Person>),
    List(Vec<Person>),
    Exists(bool),
}

impl StatementResult {
    pub fn single(self) -> Person {
        if let StatementResult::Single(p) = self {
            p
        } else {
            panic!("Statement result is not of type Single")
        }
    }

    pub fn get_single(self) -> Option<Person> {
        if let StatementResult::GetSingle(p) = self {
            p
        } else {
            panic!("Statement result is not of type GetSingle")
        }
    }

    pub fn list(self) -> Vec<Person> {
        if let StatementResult::List(l) = self {
            l
        } else {
            panic!("Statement result is not of type List")
        }
    }

    pub fn exists(self) -> bool {
        if let StatementResult::Exists(e) = self {
            e
        } else {
            panic!("Statement result is not of type Exists")
        }
    }

    pub fn success_status(self) -> String {
        if let StatementResult::SuccessStatus(s) = self {
            s
        } else {
            panic!("Statement result is not of type SuccessStatus")
        }
    }
}
