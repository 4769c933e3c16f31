use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use callbridge_codec::Value;
use callbridge_socket::CallServer;
use callbridge_worker::{ActionError, ActionRegistry};

use crate::cmd::ServeArgs;
use crate::exit::{socket_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let server = CallServer::bind(&args.path, demo_registry())
        .map_err(|err| socket_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    tracing::info!(path = ?server.path(), "serving demo actions");
    server
        .serve(&running)
        .map_err(|err| socket_error("serve failed", err))?;

    Ok(SUCCESS)
}

/// Built-in demo actions, enough to exercise every calling path: plain
/// values in and out, binary payloads, timestamps, deliberate failure.
pub fn demo_registry() -> Arc<ActionRegistry> {
    Arc::new(
        ActionRegistry::new()
            .with_action("echo", |args| {
                Ok(args.into_iter().next().unwrap_or(Value::Null))
            })
            .with_action("incr", |args| {
                let n = args
                    .first()
                    .and_then(Value::as_int)
                    .ok_or_else(|| ActionError::invalid_args("incr expects one integer"))?;
                Ok(Value::Int(n + 1))
            })
            .with_action("ping", |_| Ok(Value::Text("pong".to_string())))
            .with_action("now", |_| {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|err| ActionError::new("clock_error", err.to_string()))?
                    .as_millis() as i64;
                Ok(Value::Timestamp(millis))
            })
            .with_action("reverse", |args| {
                let bytes = args
                    .first()
                    .and_then(Value::as_bytes)
                    .ok_or_else(|| ActionError::invalid_args("reverse expects a byte buffer"))?;
                Ok(Value::Bytes(bytes.iter().rev().copied().collect()))
            })
            .with_action("boom", |_| {
                Err(ActionError::new("MyError", "boom")
                    .with_property("extra", Value::Text("x".to_string())))
            }),
    )
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
