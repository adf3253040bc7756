use std::sync::Arc;

use database::model::person::Person;
use once_cell::sync::OnceCell;
use thiserror::Error;

pub mod file;

/// The one queue person writes are announced on
pub const QUEUE_NAME: &str = "people-queue";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifierError {
    #[error("Unable to check whether queue {0} exists: {1}")]
    Lookup(String, String),

    #[error("Unable to create queue {0}: {1}")]
    Create(String, String),

    #[error("Unable to send message to queue {0}: {1}")]
    Send(String, String),
}

/// Transport level access to named, durable queues
pub trait QueueTransport: Send + Sync {
    fn exists(&self, queue_name: &str) -> Result<bool, NotifierError>;

    /// Must tolerate the queue already existing, racing creators are expected
    fn create(&self, queue_name: &str) -> Result<(), NotifierError>;

    /// Fire and forget, returns once the transport has accepted the message
    fn send(&self, queue_name: &str, body: &str) -> Result<(), NotifierError>;
}

/// Proof that the queue has been looked up or created
#[derive(Debug, Clone, PartialEq)]
pub struct QueueHandle {
    pub name: String,
}

/// Sends text messages to the fixed queue, creating the queue on first use
pub struct Notifier {
    transport: Arc<dyn QueueTransport>,
    queue_name: String,
    queue: OnceCell<QueueHandle>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self {
            transport,
            queue_name: QUEUE_NAME.to_string(),
            queue: OnceCell::new(),
        }
    }

    /// Looks the queue up, creating it if absent. Safe to call concurrently, callers that arrive while
    /// another is initialising wait for it and all of them get the same handle. A failure leaves the
    /// notifier uninitialised so the next call tries again.
    pub fn init(&self) -> Result<&QueueHandle, NotifierError> {
        self.queue.get_or_try_init(|| {
            if !self.transport.exists(&self.queue_name)? {
                log::info!("Creating message queue [{}]", self.queue_name);

                self.transport.create(&self.queue_name)?;
            }

            Ok(QueueHandle {
                name: self.queue_name.clone(),
            })
        })
    }

    pub fn send(&self, text: &str) -> Result<(), NotifierError> {
        let queue = self.init()?;

        self.transport.send(&queue.name, text)?;

        log::debug!("Queued message on [{}]", queue.name);

        Ok(())
    }
}

/// Fixed layout text block describing a person, one field per line
pub fn format_person(person: &Person) -> String {
    let optional = |value: &Option<String>| value.clone().unwrap_or_default();

    format!(
        "ID: {}.\nName: {} {}\nEmail address: {}\nPhone number: {}\nAddress: {}",
        person.id,
        person.first_name,
        person.last_name,
        optional(&person.email_address),
        optional(&person.phone_number),
        optional(&person.address),
    )
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Barrier, Mutex,
        },
        thread,
    };

    use database::consts::consts::PersonId;

    use super::*;

    /// Counts calls, can be told to fail the next create
    #[derive(Default)]
    struct CountingTransport {
        exists: AtomicBool,
        creates: AtomicUsize,
        fail_create: AtomicBool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl QueueTransport for CountingTransport {
        fn exists(&self, _: &str) -> Result<bool, NotifierError> {
            Ok(self.exists.load(Ordering::SeqCst))
        }

        fn create(&self, queue_name: &str) -> Result<(), NotifierError> {
            if self.fail_create.swap(false, Ordering::SeqCst) {
                return Err(NotifierError::Create(queue_name.to_string(), "boom".to_string()));
            }

            self.creates.fetch_add(1, Ordering::SeqCst);
            self.exists.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn send(&self, queue_name: &str, body: &str) -> Result<(), NotifierError> {
            self.sent
                .lock()
                .unwrap()
                .push((queue_name.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn first_send_creates_the_queue_once() {
        let transport = Arc::new(CountingTransport::default());
        let notifier = Notifier::new(transport.clone());

        notifier.send("one").unwrap();
        notifier.send("two").unwrap();

        assert_eq!(transport.creates.load(Ordering::SeqCst), 1);
        assert_eq!(
            *transport.sent.lock().unwrap(),
            vec![
                (QUEUE_NAME.to_string(), "one".to_string()),
                (QUEUE_NAME.to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn existing_queue_is_not_created() {
        let transport = Arc::new(CountingTransport::default());
        transport.exists.store(true, Ordering::SeqCst);

        let notifier = Notifier::new(transport.clone());

        notifier.send("hello").unwrap();

        assert_eq!(transport.creates.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_init_is_retried_on_next_send() {
        let transport = Arc::new(CountingTransport::default());
        transport.fail_create.store(true, Ordering::SeqCst);

        let notifier = Notifier::new(transport.clone());

        assert!(matches!(notifier.send("lost"), Err(NotifierError::Create(_, _))));
        assert!(transport.sent.lock().unwrap().is_empty());

        notifier.send("kept").unwrap();

        assert_eq!(transport.creates.load(Ordering::SeqCst), 1);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_init_returns_the_same_queue() {
        let transport = Arc::new(CountingTransport::default());
        let notifier = Arc::new(Notifier::new(transport.clone()));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let notifier = notifier.clone();
                let barrier = barrier.clone();

                thread::spawn(move || {
                    barrier.wait();
                    notifier.init().cloned()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                Ok(QueueHandle {
                    name: QUEUE_NAME.to_string()
                })
            );
        }

        assert_eq!(transport.creates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn formats_every_field_on_its_own_line() {
        let person = Person::new("Dale", "Salter")
            .with_id(PersonId(3))
            .with_email("dale@test.com");

        assert_eq!(
            format_person(&person),
            "ID: 3.\nName: Dale Salter\nEmail address: dale@test.com\nPhone number: \nAddress: "
        );
    }
}
