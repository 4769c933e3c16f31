use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One call crossing the bridge: an action name and positional arguments.
///
/// The bridge never interprets the payload; `method` is looked up in the
/// worker's registry and `args` are handed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct CallRequest {
    pub method: String,
    pub args: Vec<Value>,
}

impl CallRequest {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Structured failure envelope.
///
/// Replaces reflection over arbitrary error shapes with an explicit
/// contract: a machine-readable kind, a display message, and any number of
/// structured properties that travel with the error across the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct CallFailure {
    pub kind: String,
    pub message: String,
    pub properties: BTreeMap<String, Value>,
}

impl CallFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Look up a captured property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The worker's answer to a single call. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum CallResponse {
    Success(Value),
    Failure(CallFailure),
}
