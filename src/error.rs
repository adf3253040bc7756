use actix_web::{
    error::BlockingError, http::StatusCode, HttpResponse, HttpResponseBuilder, ResponseError,
};
use database::{consts::consts::PersonId, store::StoreError};
use serde_json::json;
use thiserror::Error;

use crate::{config::ConfigError, notifier::NotifierError, validation::ValidationErrors};

#[derive(Error, Debug)]
pub enum PeopleError {
    /// Structural or contact field validation failed
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(PersonId),

    #[error("Path id {path} does not match body id {body}")]
    IdMismatch { path: PersonId, body: PersonId },

    /// The record still exists but the write could not be applied, nothing retries this
    #[error("Unresolved concurrency conflict on record {0}")]
    ConcurrencyConflict(PersonId),

    #[error("Notification failed: {0}")]
    Notification(#[from] NotifierError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Request handler was cancelled: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for PeopleError {
    fn status_code(&self) -> StatusCode {
        match self {
            PeopleError::Validation(_) | PeopleError::IdMismatch { .. } => StatusCode::BAD_REQUEST,
            PeopleError::NotFound(_) => StatusCode::NOT_FOUND,
            PeopleError::ConcurrencyConflict(_)
            | PeopleError::Notification(_)
            | PeopleError::Configuration(_)
            | PeopleError::Store(_)
            | PeopleError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            PeopleError::Validation(errors) => HttpResponseBuilder::new(status).json(errors),
            PeopleError::NotFound(_) | PeopleError::IdMismatch { .. } => {
                HttpResponseBuilder::new(status).finish()
            }
            _ => {
                log::error!("Request failed: {}", self);

                HttpResponseBuilder::new(status).json(json!({ "Message": "An error has occurred." }))
            }
        }
    }
}
