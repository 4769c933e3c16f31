#![cfg(all(unix, feature = "cli"))]

//! End-to-end flow for the process-based bridge: spawn the CLI's serve
//! command as the worker and drive it through [`ProcessBridge`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use callbridge::codec::Value;
use callbridge::socket::{ProcessBridge, SocketConfig, SocketError, SpawnConfig};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/cbcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn launch_serve(sock_path: &std::path::Path) -> ProcessBridge {
    let config = SpawnConfig::new(env!("CARGO_BIN_EXE_callbridge"), sock_path)
        .with_arg("serve")
        .with_arg(sock_path.to_string_lossy())
        .with_arg("--log-level")
        .with_arg("warn")
        .with_socket_config(SocketConfig::default().with_ready_timeout(Duration::from_secs(10)));
    ProcessBridge::launch(config).expect("worker process should launch")
}

#[test]
fn spawned_worker_answers_calls() {
    let dir = unique_temp_dir("calls");
    let sock_path = dir.join("worker.sock");
    let bridge = launch_serve(&sock_path);
    let client = bridge.client();

    client.ping().expect("ping should succeed");

    let incr = client
        .call("incr", vec![Value::Int(41)])
        .expect("incr should succeed");
    assert_eq!(incr, Value::Int(42));

    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::Int(7));
    row.insert("name".to_string(), Value::Text("alice".to_string()));
    let echoed = client
        .call("echo", vec![Value::Map(row.clone())])
        .expect("echo should succeed");
    assert_eq!(echoed, Value::Map(row));

    drop(bridge);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn init_lists_the_demo_actions() {
    let dir = unique_temp_dir("init");
    let sock_path = dir.join("worker.sock");
    let bridge = launch_serve(&sock_path);

    let names = bridge.client().init().expect("init should succeed");
    assert_eq!(names, vec!["boom", "echo", "incr", "now", "ping", "reverse"]);

    drop(bridge);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn binary_payloads_cross_the_process_boundary() {
    let dir = unique_temp_dir("bytes");
    let sock_path = dir.join("worker.sock");
    let bridge = launch_serve(&sock_path);

    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let reversed = bridge
        .client()
        .call("reverse", vec![Value::Bytes(payload.clone())])
        .expect("reverse should succeed");

    let expected: Vec<u8> = payload.iter().rev().copied().collect();
    assert_eq!(reversed, Value::Bytes(expected));

    drop(bridge);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn remote_failures_surface_code_and_message() {
    let dir = unique_temp_dir("boom");
    let sock_path = dir.join("worker.sock");
    let bridge = launch_serve(&sock_path);

    let err = bridge
        .client()
        .call("boom", vec![])
        .expect_err("boom should fail");
    match err {
        SocketError::Call { code, message } => {
            assert_eq!(code, "MyError");
            assert_eq!(message, "boom");
        }
        other => panic!("expected call failure, got {other:?}"),
    }

    drop(bridge);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn stop_is_idempotent_and_kills_the_worker() {
    let dir = unique_temp_dir("stop");
    let sock_path = dir.join("worker.sock");
    let mut bridge = launch_serve(&sock_path);
    let client = bridge.client();

    bridge.stop();
    assert!(bridge.is_stopped());
    bridge.stop();

    assert!(
        client.ping().is_err(),
        "a stopped worker should not answer the liveness probe"
    );

    let _ = std::fs::remove_dir_all(dir);
}
