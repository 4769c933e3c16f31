//! Action registry and dispatcher for the worker side of the bridge.
//!
//! The worker owns a registry of named actions, populated once before
//! launch and immutable afterwards. The dispatcher executes exactly one
//! call at a time and converts every outcome — returned value, raised
//! error, unknown method — into a [`callbridge_codec::CallResponse`].

mod dispatcher;
mod error;
mod registry;

pub use dispatcher::{Dispatcher, UNKNOWN_ACTION};
pub use error::{ActionError, ActionResult};
pub use registry::{ActionFn, ActionRegistry};
