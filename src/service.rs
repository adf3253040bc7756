use std::sync::Arc;

use database::{
    consts::consts::PersonId,
    model::person::Person,
    store::{Store, StoreError},
};

use crate::{
    config::{ConfigProvider, MESSAGE_QUEUE_SETTING},
    error::PeopleError,
    notifier::{format_person, Notifier},
    validation::{check_contact_fields, check_required_fields},
};

pub type PeopleResult<T> = Result<T, PeopleError>;

/// Which checks a create / update runs before touching the queue or the store
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ValidationPolicy {
    /// Names must be present, contact fields are accepted as sent
    #[default]
    RequiredFieldsOnly,
    /// Email and phone must also match their patterns
    Strict,
}

/// Ordering of the two side effects of a write
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum NotificationOrder {
    /// All or nothing: the record is only persisted once the notification has been sent, a failed
    /// send fails the request and nothing is written
    #[default]
    NotifyThenPersist,
    /// The record is persisted first, the notification is best effort and a failure is only logged
    PersistThenNotify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WritePolicy {
    pub validation: ValidationPolicy,
    pub notification: NotificationOrder,
}

/// Request scoped orchestration of validation, notification and persistence for people.
///
/// A service is built for every request and owns that request's store handle, dropping the service
/// releases it whatever the outcome.
pub struct PeopleService<S: Store> {
    store: S,
    notifier: Arc<Notifier>,
    config: Arc<dyn ConfigProvider>,
    policy: WritePolicy,
}

impl<S: Store> PeopleService<S> {
    pub fn new(
        store: S,
        notifier: Arc<Notifier>,
        config: Arc<dyn ConfigProvider>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            policy,
        }
    }

    pub fn list(&self) -> PeopleResult<Vec<Person>> {
        Ok(self.store.list()?)
    }

    pub fn get(&self, id: PersonId) -> PeopleResult<Person> {
        self.store.get(id)?.ok_or(PeopleError::NotFound(id))
    }

    /// Returns the stored record, carrying its new id
    pub fn create(&self, person: Person) -> PeopleResult<Person> {
        self.validate(&person)?;

        self.write(&person, || Ok(self.store.add(person.clone())?))
    }

    pub fn update(&self, id: PersonId, person: Person) -> PeopleResult<()> {
        self.validate(&person)?;

        if person.id != id {
            return Err(PeopleError::IdMismatch {
                path: id,
                body: person.id,
            });
        }

        self.write(&person, || match self.store.update(person.clone()) {
            Ok(stored) => Ok(stored),
            Err(StoreError::Conflict(_)) => {
                // Vanished since it was read is a not found, anything else is not ours to resolve
                if self.store.exists(id)? {
                    Err(PeopleError::ConcurrencyConflict(id))
                } else {
                    Err(PeopleError::NotFound(id))
                }
            }
            Err(e) => Err(e.into()),
        })?;

        Ok(())
    }

    /// Returns the record as it was before removal
    pub fn delete(&self, id: PersonId) -> PeopleResult<Person> {
        self.store.remove(id)?.ok_or(PeopleError::NotFound(id))
    }

    fn validate(&self, person: &Person) -> PeopleResult<()> {
        check_required_fields(person).map_err(PeopleError::Validation)?;

        if self.policy.validation == ValidationPolicy::Strict {
            check_contact_fields(person).map_err(PeopleError::Validation)?;
        }

        Ok(())
    }

    /// Runs `persist` and the queue notification in the order the policy declares
    fn write<F>(&self, inbound: &Person, persist: F) -> PeopleResult<Person>
    where
        F: FnOnce() -> PeopleResult<Person>,
    {
        let notify = self.config.get_bool(MESSAGE_QUEUE_SETTING)?;

        match self.policy.notification {
            NotificationOrder::NotifyThenPersist => {
                if notify {
                    self.notifier.send(&format_person(inbound))?;
                }

                persist()
            }
            NotificationOrder::PersistThenNotify => {
                let stored = persist()?;

                if notify {
                    if let Err(e) = self.notifier.send(&format_person(&stored)) {
                        log::warn!("Record {} saved but notification failed: {}", stored.id, e);
                    }
                }

                Ok(stored)
            }
        }
    }
}
