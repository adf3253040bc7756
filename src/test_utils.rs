use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use crate::notifier::{NotifierError, QueueTransport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportBehaviour {
    Accept,
    FailCreate,
    FailSend,
}

/// In memory queue transport that records every accepted message
pub struct RecordingTransport {
    behaviour: TransportBehaviour,
    created: AtomicBool,
    calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new(behaviour: TransportBehaviour) -> Self {
        Self {
            behaviour,
            created: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(vec![]),
        }
    }

    /// Every transport call, including lookups and failed attempts
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl QueueTransport for RecordingTransport {
    fn exists(&self, _: &str) -> Result<bool, NotifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(self.created.load(Ordering::SeqCst))
    }

    fn create(&self, queue_name: &str) -> Result<(), NotifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.behaviour == TransportBehaviour::FailCreate {
            return Err(NotifierError::Create(
                queue_name.to_string(),
                "access denied".to_string(),
            ));
        }

        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn send(&self, queue_name: &str, body: &str) -> Result<(), NotifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.behaviour == TransportBehaviour::FailSend {
            return Err(NotifierError::Send(
                queue_name.to_string(),
                "queue unreachable".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}
