use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

/// A person record, field names on the wire follow the PascalCase shape of the public API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(default)]
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Person {
            id: PersonId::default(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email_address: None,
            phone_number: None,
            address: None,
        }
    }

    pub fn with_id(mut self, id: PersonId) -> Self {
        self.id = id;
        self
    }

    pub fn with_email(mut self, email_address: &str) -> Self {
        self.email_address = Some(email_address.to_string());
        self
    }

    pub fn with_phone(mut self, phone_number: &str) -> Self {
        self.phone_number = Some(phone_number.to_string());
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn new_test() -> Self {
        Person::new("Dale", "Salter")
            .with_email("dalejsalter@outlook.com")
            .with_phone("123-456-7890")
            .with_address("1 Test Street")
    }
}
