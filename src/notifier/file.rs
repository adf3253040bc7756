use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NotifierError, QueueTransport};

const MESSAGE_EXTENSION: &str = "json";

/// Envelope written for every message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct QueuedMessage {
    pub id: Uuid,
    pub label: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Local durable queues, one directory per queue under `root`, one file per message.
///
/// Messages are written to a hidden temp file, synced, then renamed into place, so a reader
/// listing the directory only ever sees complete messages. File names sort in send order.
pub struct FileQueueTransport {
    root: PathBuf,
}

impl FileQueueTransport {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn queue_path(&self, queue_name: &str) -> PathBuf {
        self.root.join(queue_name)
    }
}

impl QueueTransport for FileQueueTransport {
    fn exists(&self, queue_name: &str) -> Result<bool, NotifierError> {
        match fs::metadata(self.queue_path(queue_name)) {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(NotifierError::Lookup(queue_name.to_string(), e.to_string())),
        }
    }

    fn create(&self, queue_name: &str) -> Result<(), NotifierError> {
        // create_dir_all succeeds when another creator got there first
        fs::create_dir_all(self.queue_path(queue_name))
            .map_err(|e| NotifierError::Create(queue_name.to_string(), e.to_string()))
    }

    fn send(&self, queue_name: &str, body: &str) -> Result<(), NotifierError> {
        let send_error = |e: String| NotifierError::Send(queue_name.to_string(), e);

        let message = QueuedMessage {
            id: Uuid::new_v4(),
            label: queue_name.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&message).map_err(|e| send_error(e.to_string()))?;

        let file_name = format!(
            "{:020}-{}.{}",
            message
                .sent_at
                .timestamp_nanos_opt()
                .unwrap_or_default(),
            message.id,
            MESSAGE_EXTENSION
        );

        let queue_path = self.queue_path(queue_name);
        let temp_path = queue_path.join(format!(".{}.tmp", message.id));

        let mut file = File::create(&temp_path).map_err(|e| send_error(e.to_string()))?;

        file.write_all(&bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| send_error(e.to_string()))?;

        fs::rename(&temp_path, queue_path.join(file_name)).map_err(|e| send_error(e.to_string()))
    }
}
