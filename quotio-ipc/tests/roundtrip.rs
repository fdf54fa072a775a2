use std::time::Duration;

use quotio_ipc::{IpcServer, MessageReader, MessageWriter, MethodRegistry};
use serde_json::{Value, json};
use tokio::net::UnixStream;

fn socket_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(name)
}

#[tokio::test]
async fn request_gets_a_matching_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let mut registry = MethodRegistry::new();
    registry.register("daemon.ping", |_: Value| async move { Ok(json!({"pong": true})) });

    let server = IpcServer::bind(&path, registry).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    let stream = UnixStream::connect(&path).await.unwrap();
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);
    let mut writer = MessageWriter::new(write_half);

    writer
        .write(&json!({"jsonrpc": "2.0", "id": 1, "method": "daemon.ping", "params": {}}))
        .await
        .unwrap();

    let response = reader.next::<Value>().await.unwrap().unwrap().unwrap();
    assert_eq!(response["id"], json!(1));
    assert_eq!(response["result"], json!({"pong": true}));

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_method_gets_method_not_found_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let server = IpcServer::bind(&path, MethodRegistry::new()).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    let stream = UnixStream::connect(&path).await.unwrap();
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);
    let mut writer = MessageWriter::new(write_half);

    writer
        .write(&json!({"jsonrpc": "2.0", "id": "a", "method": "nope.nope", "params": {}}))
        .await
        .unwrap();

    let response = reader.next::<Value>().await.unwrap().unwrap().unwrap();
    assert_eq!(response["id"], json!("a"));
    assert_eq!(response["error"]["code"], json!(-32601));

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
}

#[tokio::test]
async fn notification_produces_no_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let mut registry = MethodRegistry::new();
    registry.register("stats.bump", |_: Value| async move { Ok(Value::Null) });
    registry.register("daemon.ping", |_: Value| async move { Ok(json!("pong")) });

    let server = IpcServer::bind(&path, registry).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    let stream = UnixStream::connect(&path).await.unwrap();
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);
    let mut writer = MessageWriter::new(write_half);

    writer
        .write(&json!({"jsonrpc": "2.0", "method": "stats.bump", "params": {}}))
        .await
        .unwrap();
    writer
        .write(&json!({"jsonrpc": "2.0", "id": 7, "method": "daemon.ping", "params": {}}))
        .await
        .unwrap();

    // The notification produced no response; the next line on the wire is
    // the reply to the follow-up request.
    let response = reader.next::<Value>().await.unwrap().unwrap().unwrap();
    assert_eq!(response["id"], json!(7));
    assert_eq!(response["result"], json!("pong"));

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
}

#[tokio::test]
async fn concurrent_connections_are_each_served() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let mut registry = MethodRegistry::new();
    registry.register("daemon.ping", |_: Value| async move { Ok(json!("pong")) });

    let server = IpcServer::bind(&path, registry).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    let mut clients = Vec::new();
    for i in 0..4 {
        let path = path.clone();
        clients.push(tokio::spawn(async move {
            let stream = UnixStream::connect(&path).await.unwrap();
            let (read_half, write_half) = stream.into_split();
            let mut reader = MessageReader::new(read_half);
            let mut writer = MessageWriter::new(write_half);
            writer
                .write(&json!({"jsonrpc": "2.0", "id": i, "method": "daemon.ping", "params": {}}))
                .await
                .unwrap();
            let response = reader.next::<Value>().await.unwrap().unwrap().unwrap();
            assert_eq!(response["id"], json!(i));
        }));
    }

    for client in clients {
        tokio::time::timeout(Duration::from_secs(2), client).await.unwrap().unwrap();
    }

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_removes_the_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let server = IpcServer::bind(&path, MethodRegistry::new()).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    assert!(path.exists());
    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn bind_fails_cleanly_when_directory_missing_is_unwritable() {
    let err = IpcServer::bind("/nonexistent-root-only-dir/quotio.sock", MethodRegistry::new());
    assert!(err.is_err());
}

#[tokio::test]
async fn a_slow_handler_does_not_block_a_faster_request_behind_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "quotio.sock");

    let mut registry = MethodRegistry::new();
    registry.register("slow.thing", |_: Value| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(json!("slow"))
    });
    registry.register("daemon.ping", |_: Value| async move { Ok(json!("pong")) });

    let server = IpcServer::bind(&path, registry).unwrap();
    let shutdown = server.shutdown_handle();
    let serve_task = tokio::spawn(server.serve());

    let stream = UnixStream::connect(&path).await.unwrap();
    let (read_half, write_half) = stream.into_split();
    let mut reader = MessageReader::new(read_half);
    let mut writer = MessageWriter::new(write_half);

    writer
        .write(&json!({"jsonrpc": "2.0", "id": 1, "method": "slow.thing", "params": {}}))
        .await
        .unwrap();
    writer
        .write(&json!({"jsonrpc": "2.0", "id": 2, "method": "daemon.ping", "params": {}}))
        .await
        .unwrap();

    // The fast request was queued second but its handler finishes first,
    // so its response is the first line back on the wire.
    let first = reader.next::<Value>().await.unwrap().unwrap().unwrap();
    assert_eq!(first["id"], json!(2));
    assert_eq!(first["result"], json!("pong"));

    let second = reader.next::<Value>().await.unwrap().unwrap().unwrap();
    assert_eq!(second["id"], json!(1));
    assert_eq!(second["result"], json!("slow"));

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), serve_task).await.unwrap().unwrap();
}
