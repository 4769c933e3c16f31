use std::collections::BTreeMap;

use callbridge_codec::Value;

use crate::error::ActionError;

/// A registered action: positional arguments in, value or error out.
pub type ActionFn = dyn Fn(Vec<Value>) -> Result<Value, ActionError> + Send + Sync;

/// Mapping from action name to callable.
///
/// Populated once with the builder-style `with_action` before the worker
/// launches; the bridge wraps it in an `Arc` and never mutates it again.
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Box<ActionFn>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under `name`, replacing any previous entry.
    pub fn with_action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Box::new(action));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionFn> {
        self.actions.get(name).map(|boxed| boxed.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered action names, sorted. This is the callable index the
    /// socket protocol returns on `INIT`.
    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
