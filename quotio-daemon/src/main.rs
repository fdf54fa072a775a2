//! `quotiod` — boots every collaborator, binds the JSON-RPC socket, and
//! serves until `daemon.shutdown` or a signal arrives.

use std::sync::Arc;

use clap::Parser;
use quotio_daemon::error::DaemonError;
use quotio_daemon::oauth::OAuthSessions;
use quotio_daemon::state::{AppState, DEFAULT_PROXY_PORT};
use quotio_daemon::{handlers, pidfile, scheduler};
use quotio_ipc::{IpcServer, MethodRegistry};
use quotio_proxy::{BinaryLocator, ProxySupervisor};
use quotio_refresh::TokenRefresher;
use quotio_store::{AuthStore, Config};
use quotio_tracker::RequestTracker;
use tokio::sync::{Notify, RwLock};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Background daemon brokering quota/token/proxy access to AI coding
/// assistant accounts over a local JSON-RPC socket.
#[derive(Parser)]
#[command(name = "quotiod")]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level for this crate).
    #[arg(long, short)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_new("quotio_daemon=debug,quotio_providers=debug,info")
    } else {
        EnvFilter::try_from_default_env()
    }
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!(error = %e, "quotiod exiting");
        let code = match e {
            DaemonError::AlreadyRunning(pid) => {
                eprintln!("quotiod: already running (pid {pid})");
                2
            }
            other => {
                eprintln!("quotiod: {other}");
                1
            }
        };
        std::process::exit(code);
    }
}

async fn run(_cli: Cli) -> Result<(), DaemonError> {
    let config_dir = quotio_store::default_config_dir();
    let pidfile_path = pidfile::default_path();
    pidfile::claim(&pidfile_path).await?;

    let result = serve(&config_dir).await;

    pidfile::release(&pidfile_path).await;
    result
}

async fn serve(config_dir: &std::path::Path) -> Result<(), DaemonError> {
    let config = Config::load().await.unwrap_or_default();
    let config = Arc::new(RwLock::new(config));

    let store = AuthStore::new();
    let refresher = Arc::new(TokenRefresher::new(store.clone()));
    let quotas = Arc::new(quotio_providers::QuotaRegistry::new(store.clone(), refresher.clone()));

    let data_dir = quotio_store::default_data_dir();
    let locator = BinaryLocator::new(&data_dir);
    let proxy = Arc::new(ProxySupervisor::new(locator, &data_dir, DEFAULT_PROXY_PORT));
    proxy.adopt_or_cleanup_orphan(DEFAULT_PROXY_PORT).await;

    let tracker_capacity = config.read().await.tracker_capacity();
    let tracker = Arc::new(RequestTracker::new(tracker_capacity));

    let state = Arc::new(AppState {
        store,
        refresher,
        quotas,
        proxy: proxy.clone(),
        tracker,
        config,
        oauth: Arc::new(OAuthSessions::default()),
        ipc_shutdown: Arc::new(Notify::new()),
        started_at: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    });

    let mut registry = MethodRegistry::new();
    handlers::register_all(&mut registry, state.clone());

    let socket_path = config_dir.join("quotio.sock");
    let server = IpcServer::bind(&socket_path, registry)?;

    let server_shutdown = server.shutdown_handle();
    let app_shutdown = state.ipc_shutdown.clone();
    tokio::spawn(async move {
        app_shutdown.notified().await;
        server_shutdown.notify_waiters();
    });

    tokio::spawn(scheduler::run(state.clone()));
    tokio::spawn(proxy.clone().run_health_monitor());
    tokio::spawn(signal_task(state.clone()));

    info!(socket = %socket_path.display(), "quotiod listening");
    server.serve().await;
    info!("quotiod shut down");
    Ok(())
}

/// Waits for SIGINT or SIGTERM and routes either into the same shutdown
/// path `daemon.shutdown` uses.
async fn signal_task(state: Arc<AppState>) {
    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    state.initiate_shutdown().await;
}
