use std::sync::Arc;

use callbridge_codec::{CallFailure, CallRequest, CallResponse, Value};

use crate::registry::ActionRegistry;

/// Failure kind reported when a call names an unregistered action.
pub const UNKNOWN_ACTION: &str = "unknown_action";

/// Executes calls against the registry, one at a time.
///
/// Every outcome becomes a `CallResponse`: the dispatcher itself never
/// returns an error, so the transport layer always has something to send
/// back and the caller is always unblocked.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Execute one call.
    ///
    /// Unknown methods are a reported failure, never a silent no-op.
    pub fn dispatch(&self, request: CallRequest) -> CallResponse {
        let Some(action) = self.registry.get(&request.method) else {
            tracing::warn!(method = %request.method, "call to unregistered action");
            return CallResponse::Failure(
                CallFailure::new(
                    UNKNOWN_ACTION,
                    format!("no action registered under '{}'", request.method),
                )
                .with_property("method", Value::Text(request.method)),
            );
        };

        tracing::debug!(method = %request.method, argc = request.args.len(), "dispatching call");
        match action(request.args) {
            Ok(value) => CallResponse::Success(value),
            Err(err) => {
                tracing::debug!(method = %request.method, error = %err, "action failed");
                CallResponse::Failure(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use callbridge_codec::Value;

    use super::*;
    use crate::error::ActionError;

    fn incr_registry() -> Dispatcher {
        let registry = ActionRegistry::new()
            .with_action("incr", |args| {
                let n = args
                    .first()
                    .and_then(Value::as_int)
                    .ok_or_else(|| ActionError::invalid_args("incr expects one integer"))?;
                Ok(Value::Int(n + 1))
            })
            .with_action("boom", |_args| {
                Err(ActionError::new("MyError", "boom")
                    .with_property("extra", Value::Text("x".to_string())))
            });
        Dispatcher::new(Arc::new(registry))
    }

    #[test]
    fn success_wraps_returned_value() {
        let dispatcher = incr_registry();
        let response = dispatcher.dispatch(CallRequest::new("incr", vec![Value::Int(3)]));
        assert_eq!(response, CallResponse::Success(Value::Int(4)));
    }

    #[test]
    fn action_error_becomes_failure_with_properties() {
        let dispatcher = incr_registry();
        let response = dispatcher.dispatch(CallRequest::new("boom", vec![]));

        let CallResponse::Failure(failure) = response else {
            panic!("expected failure response");
        };
        assert_eq!(failure.kind, "MyError");
        assert_eq!(failure.message, "boom");
        assert_eq!(
            failure.property("extra"),
            Some(&Value::Text("x".to_string()))
        );
    }

    #[test]
    fn unknown_method_is_reported_not_ignored() {
        let dispatcher = incr_registry();
        let response = dispatcher.dispatch(CallRequest::new("missing", vec![]));

        let CallResponse::Failure(failure) = response else {
            panic!("expected failure response");
        };
        assert_eq!(failure.kind, UNKNOWN_ACTION);
        assert_eq!(
            failure.property("method"),
            Some(&Value::Text("missing".to_string()))
        );
    }

    #[test]
    fn bad_args_surface_as_failure() {
        let dispatcher = incr_registry();
        let response =
            dispatcher.dispatch(CallRequest::new("incr", vec![Value::Text("x".to_string())]));

        let CallResponse::Failure(failure) = response else {
            panic!("expected failure response");
        };
        assert_eq!(failure.kind, "invalid_args");
    }
}
