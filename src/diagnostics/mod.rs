pub mod publisher;
pub mod updater;

use std::fmt;

use serde::Serialize;

pub use publisher::{JsonPublisher, LogPublisher, Publisher};
pub use updater::Updater;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "OK"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Result of one named check: a severity, a short message and ordered details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticStatus {
    pub level: Severity,
    pub name: String,
    pub message: String,
    pub hardware_id: String,
    pub values: Vec<KeyValue>,
}

impl DiagnosticStatus {
    pub fn new(name: impl Into<String>, hardware_id: impl Into<String>) -> Self {
        DiagnosticStatus {
            level: Severity::Ok,
            name: name.into(),
            message: String::new(),
            hardware_id: hardware_id.into(),
            values: Vec::new(),
        }
    }

    pub fn summary(&mut self, level: Severity, message: impl Into<String>) {
        self.level = level;
        self.message = message.into();
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push(KeyValue {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|kv| kv.key.as_str())
    }
}

/// Every status produced by one publish, in registration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticArray {
    pub stamp_ms: u64,
    pub status: Vec<DiagnosticStatus>,
}

impl DiagnosticArray {
    pub fn get(&self, name: &str) -> Option<&DiagnosticStatus> {
        self.status.iter().find(|s| s.name == name)
    }
}
