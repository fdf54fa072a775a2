//! Black-box: binds a real `IpcServer` over every registered handler
//! against a temp socket and temp-rooted stores, then drives requests
//! through a real client connection, end to end.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quotio_daemon::oauth::OAuthSessions;
use quotio_daemon::state::AppState;
use quotio_daemon::handlers;
use quotio_ipc::{IpcServer, MessageReader, MessageWriter, MethodRegistry};
use quotio_proxy::{BinaryLocator, ProxySupervisor};
use quotio_providers::QuotaRegistry;
use quotio_refresh::TokenRefresher;
use quotio_store::{AuthStore, Config};
use quotio_tracker::RequestTracker;
use serde_json::{json, Value};
use tokio::net::UnixStream;
use tokio::sync::{Notify, RwLock};

struct Harness {
    socket_path: std::path::PathBuf,
    _auth_dir: tempfile::TempDir,
    _data_dir: tempfile::TempDir,
    _socket_dir: tempfile::TempDir,
    _config_dir: tempfile::TempDir,
    shutdown: Arc<Notify>,
    serve_task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start() -> Self {
        let auth_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let socket_dir = tempfile::tempdir().unwrap();
        let config_dir = tempfile::tempdir().unwrap();
        // `Config::save` always targets `default_config_dir()`; point it at
        // a temp dir so the config round-trip test doesn't touch the real
        // machine's `~/.config/quotio/config.json`.
        unsafe {
            std::env::set_var("QUOTIO_CONFIG_DIR", config_dir.path());
        }
        let socket_path = socket_dir.path().join("quotio.sock");

        let store = AuthStore::at(auth_dir.path());
        let refresher = Arc::new(TokenRefresher::new(store.clone()));
        let quotas = Arc::new(QuotaRegistry::new(store.clone(), refresher.clone()));
        let locator = BinaryLocator::new(data_dir.path());
        let proxy = Arc::new(ProxySupervisor::new(locator, data_dir.path(), 8317));
        let tracker = Arc::new(RequestTracker::new(100));

        let state = Arc::new(AppState {
            store,
            refresher,
            quotas,
            proxy,
            tracker,
            config: Arc::new(RwLock::new(Config::default())),
            oauth: Arc::new(OAuthSessions::default()),
            ipc_shutdown: Arc::new(Notify::new()),
            started_at: Utc::now(),
            version: "test",
        });

        let mut registry = MethodRegistry::new();
        handlers::register_all(&mut registry, state.clone());

        let server = IpcServer::bind(&socket_path, registry).unwrap();
        let shutdown = server.shutdown_handle();
        let serve_task = tokio::spawn(server.serve());

        Self {
            socket_path,
            _auth_dir: auth_dir,
            _data_dir: data_dir,
            _socket_dir: socket_dir,
            _config_dir: config_dir,
            shutdown,
            serve_task,
        }
    }

    async fn call(&self, method: &str, params: Value, id: i64) -> Value {
        let stream = UnixStream::connect(&self.socket_path).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut reader = MessageReader::new(read_half);
        let mut writer = MessageWriter::new(write_half);

        writer
            .write(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await
            .unwrap();

        reader.next::<Value>().await.unwrap().unwrap().unwrap()
    }

    async fn stop(self) {
        self.shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(2), self.serve_task).await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn ping_and_status_round_trip() {
    let harness = Harness::start().await;

    let pong = harness.call("daemon.ping", json!({}), 1).await;
    assert_eq!(pong["result"]["pong"], json!(true));

    let status = harness.call("daemon.status", json!({}), 2).await;
    assert_eq!(status["result"]["running"], json!(true));
    assert_eq!(status["result"]["proxy_running"], json!(false));

    harness.stop().await;
}

#[tokio::test]
async fn auth_list_is_empty_against_a_fresh_store() {
    let harness = Harness::start().await;

    let resp = harness.call("auth.list", json!({}), 1).await;
    assert_eq!(resp["result"]["accounts"], json!([]));

    harness.stop().await;
}

#[tokio::test]
async fn disabling_an_unknown_account_reports_agent_not_found() {
    let harness = Harness::start().await;

    let resp = harness
        .call("auth.setDisabled", json!({"name": "codex-nobody", "disabled": true}), 1)
        .await;
    assert_eq!(resp["error"]["code"], json!(1004));

    harness.stop().await;
}

#[tokio::test]
async fn deleting_an_unknown_account_is_a_no_op_success() {
    let harness = Harness::start().await;

    let resp = harness.call("auth.delete", json!({"name": "codex-nobody"}), 1).await;
    assert_eq!(resp["result"]["success"], json!(true));

    harness.stop().await;
}

#[tokio::test]
async fn config_set_then_get_round_trips() {
    let harness = Harness::start().await;

    let set = harness
        .call("config.set", json!({"key": "http_proxy_url", "value": "http://localhost:9"}), 1)
        .await;
    assert_eq!(set["result"]["success"], json!(true));

    let get = harness.call("config.get", json!({"key": "http_proxy_url"}), 2).await;
    assert_eq!(get["result"]["value"], json!("http://localhost:9"));

    harness.stop().await;
}

#[tokio::test]
async fn api_key_lifecycle() {
    let harness = Harness::start().await;

    let add = harness.call("apiKeys.add", json!({"label": "ci"}), 1).await;
    assert_eq!(add["result"]["success"], json!(true));
    let key_id = add["result"]["key"]["id"].as_str().unwrap().to_string();

    let list = harness.call("apiKeys.list", json!({}), 2).await;
    assert_eq!(list["result"]["keys"].as_array().unwrap().len(), 1);

    let delete = harness.call("apiKeys.delete", json!({"key": key_id}), 3).await;
    assert_eq!(delete["result"]["success"], json!(true));

    let list_after = harness.call("apiKeys.list", json!({}), 4).await;
    assert_eq!(list_after["result"]["keys"].as_array().unwrap().len(), 0);

    harness.stop().await;
}

#[tokio::test]
async fn oauth_poll_is_pending_until_an_account_shows_up() {
    let harness = Harness::start().await;

    let start = harness.call("oauth.start", json!({"provider": "codex"}), 1).await;
    let state_token = start["result"]["state"].as_str().unwrap().to_string();

    let poll = harness.call("oauth.poll", json!({"state": state_token}), 2).await;
    assert_eq!(poll["result"]["status"], json!("pending"));

    harness.stop().await;
}

#[tokio::test]
async fn quota_fetch_against_zero_accounts_is_an_empty_partial_success() {
    let harness = Harness::start().await;

    let resp = harness.call("quota.fetch", json!({}), 1).await;
    assert_eq!(resp["result"]["success"], json!(true));
    assert_eq!(resp["result"]["quotas"], json!([]));
    assert_eq!(resp["result"]["errors"], json!([]));

    harness.stop().await;
}
