use std::collections::BTreeMap;

use database::model::person::Person;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// Only .com addresses. Dots and dashes may join groups before the @, never lead and never
// appear in the domain.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]+([.-][A-Za-z0-9]+)*@[A-Za-z0-9]+\.[Cc][Oo][Mm]$")
        .expect("email pattern is valid")
});

// North American numbers: optional 1 country code, area code bare or in parentheses, optional
// dashes between groups. Unanchored, surrounding characters are tolerated.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(1-?)?([0-9]{3}|\([0-9]{3}\))-?[0-9]{3}-?[0-9]{4}")
        .expect("phone pattern is valid")
});

const INVALID_REQUEST_MESSAGE: &str = "The request is invalid.";

/// Field keyed validation failures, serialized in the shape clients of the API expect
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationErrors {
    pub message: String,
    pub model_state: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self {
            message: INVALID_REQUEST_MESSAGE.to_string(),
            model_state: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.model_state
            .entry(format!("person.{}", field))
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.model_state.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.model_state.keys().map(String::as_str).collect();

        write!(f, "{} [{}]", self.message, fields.join(", "))
    }
}

/// Structural check every write runs, required names must be present and non-empty
pub fn check_required_fields(person: &Person) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if person.first_name.trim().is_empty() {
        errors.add("FirstName", "The FirstName field is required.");
    }

    if person.last_name.trim().is_empty() {
        errors.add("LastName", "The LastName field is required.");
    }

    errors.into_result()
}

/// Absent is valid, the field is optional
pub fn valid_email(email_address: Option<&str>) -> bool {
    email_address.map_or(true, |email| EMAIL_PATTERN.is_match(email))
}

/// Absent is valid, the field is optional
pub fn valid_phone(phone_number: Option<&str>) -> bool {
    phone_number.map_or(true, |phone| PHONE_PATTERN.is_match(phone))
}

/// Stops at the first failing field
pub fn is_valid(person: &Person) -> bool {
    valid_email(person.email_address.as_deref()) && valid_phone(person.phone_number.as_deref())
}

/// [`is_valid`] with a message for the failing field
pub fn check_contact_fields(person: &Person) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !valid_email(person.email_address.as_deref()) {
        errors.add("EmailAddress", "The EmailAddress field is not a valid e-mail address.");
    } else if !valid_phone(person.phone_number.as_deref()) {
        errors.add("PhoneNumber", "The PhoneNumber field is not a valid phone number.");
    }

    errors.into_result()
}
