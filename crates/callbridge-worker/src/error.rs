use std::collections::BTreeMap;
use std::fmt;

use callbridge_codec::{CallFailure, Value};

/// Error raised by a registered action.
///
/// Carries a machine-readable kind, a display message, and any structured
/// properties the action wants to travel with the failure across the
/// bridge. The dispatcher converts this into the wire failure envelope
/// without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionError {
    pub kind: String,
    pub message: String,
    pub properties: BTreeMap<String, Value>,
}

pub type ActionResult = Result<Value, ActionError>;

impl ActionError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Shorthand for argument-shape complaints.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new("invalid_args", message)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ActionError {}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        Self::new("io", err.to_string())
    }
}

impl From<ActionError> for CallFailure {
    fn from(err: ActionError) -> Self {
        CallFailure {
            kind: err.kind,
            message: err.message,
            properties: err.properties,
        }
    }
}
