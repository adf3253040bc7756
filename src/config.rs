use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use serde_json::Value;
use thiserror::Error;

/// Setting that decides whether writes are announced on the message queue
pub const MESSAGE_QUEUE_SETTING: &str = "MessageQueue";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unable to read settings file {0}: {1}")]
    Unreadable(String, String),

    #[error("Settings file {0} is not a JSON object: {1}")]
    Malformed(String, String),

    #[error("Setting is missing: {0}")]
    MissingSetting(String),

    #[error("Setting {0} is not a boolean: {1}")]
    NotABoolean(String, String),
}

/// Source of application settings, consulted at request time rather than cached at start-up
pub trait ConfigProvider: Send + Sync {
    fn get_bool(&self, key: &str) -> Result<bool, ConfigError>;
}

/// Reads a flat JSON object of settings, the file is opened again on every lookup so edits
/// apply to the next request without a restart
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let location = self.path.display().to_string();

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::Unreadable(location.clone(), e.to_string()))?;

        let settings: HashMap<String, Value> = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Malformed(location, e.to_string()))?;

        let value = settings
            .get(key)
            .ok_or_else(|| ConfigError::MissingSetting(key.to_string()))?;

        parse_bool(key, value)
    }
}

/// Accepts JSON booleans, or strings holding true / false in any case
fn parse_bool(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(ConfigError::NotABoolean(key.to_string(), other.to_string())),
    }
}

/// Settings held in memory, can be changed while the server is running
#[derive(Default)]
pub struct InMemoryConfigProvider {
    settings: RwLock<HashMap<String, bool>>,
}

impl InMemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: bool) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: &str, value: bool) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

impl ConfigProvider for InMemoryConfigProvider {
    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .ok_or_else(|| ConfigError::MissingSetting(key.to_string()))
    }
}
