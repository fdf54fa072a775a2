//! Quotio CLI - a thin JSON-RPC client over `quotiod`'s Unix socket.
//!
//! Every subcommand here is a direct call into the method catalog the
//! daemon exposes; this binary has no fetch, refresh, or provider logic
//! of its own.

mod rpc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rpc::Client;

/// Quotio CLI - drives the `quotiod` daemon over its local socket.
#[derive(Parser)]
#[command(name = "quotio")]
#[command(about = "Drive the quotiod daemon from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbose output (debug logging).
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show daemon status (pid, uptime, proxy state).
    Status,
    /// Fetch current quota usage.
    Usage {
        /// Restrict to one provider (e.g. "codex").
        #[arg(long, short)]
        provider: Option<String>,
    },
    /// Read the last cached quota fetch without triggering a new one.
    Cached,
    /// Manage stored account credentials.
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Control the supervised proxy process.
    #[command(subcommand)]
    Proxy(ProxyCommands),
    /// Read or write a daemon config key.
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Recent request log entries.
    Logs {
        /// Only entries after this cursor id.
        #[arg(long)]
        after: Option<String>,
    },
    /// Manage API keys that gate the proxy's HTTP surface.
    #[command(subcommand)]
    ApiKeys(ApiKeyCommands),
    /// Ask the daemon to shut down.
    Shutdown,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// List stored accounts, optionally filtered by provider.
    List {
        #[arg(long, short)]
        provider: Option<String>,
    },
    /// Delete one account by name.
    Delete { name: String },
    /// Delete every stored account.
    DeleteAll,
    /// Enable or disable an account without deleting it.
    SetDisabled { name: String, disabled: bool },
}

#[derive(Subcommand)]
pub enum ProxyCommands {
    /// Start the supervised proxy.
    Start {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop the supervised proxy.
    Stop,
    /// Show whether the proxy is running and healthy.
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    Get { key: String },
    Set { key: String, value: String },
}

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    List,
    Add {
        #[arg(long)]
        label: Option<String>,
    },
    Delete { key: String },
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("quotio=debug,info")
    } else {
        EnvFilter::new("quotio=warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut client = Client::connect_default().await?;

    let (method, params) = match &cli.command {
        Commands::Status => ("daemon.status", json!({})),
        Commands::Usage { provider } => ("quota.fetch", json!({"provider": provider})),
        Commands::Cached => ("quota.list", json!({})),
        Commands::Auth(AuthCommands::List { provider }) => ("auth.list", json!({"provider": provider})),
        Commands::Auth(AuthCommands::Delete { name }) => ("auth.delete", json!({"name": name})),
        Commands::Auth(AuthCommands::DeleteAll) => ("auth.deleteAll", json!({})),
        Commands::Auth(AuthCommands::SetDisabled { name, disabled }) => {
            ("auth.setDisabled", json!({"name": name, "disabled": disabled}))
        }
        Commands::Proxy(ProxyCommands::Start { port }) => ("proxy.start", json!({"port": port})),
        Commands::Proxy(ProxyCommands::Stop) => ("proxy.stop", json!({})),
        Commands::Proxy(ProxyCommands::Status) => ("proxy.status", json!({})),
        Commands::Config(ConfigCommands::Get { key }) => ("config.get", json!({"key": key})),
        Commands::Config(ConfigCommands::Set { key, value }) => {
            ("config.set", json!({"key": key, "value": parse_scalar(value)}))
        }
        Commands::Logs { after } => ("logs.fetch", json!({"after": after})),
        Commands::ApiKeys(ApiKeyCommands::List) => ("apiKeys.list", json!({})),
        Commands::ApiKeys(ApiKeyCommands::Add { label }) => ("apiKeys.add", json!({"label": label})),
        Commands::ApiKeys(ApiKeyCommands::Delete { key }) => ("apiKeys.delete", json!({"key": key})),
        Commands::Shutdown => ("daemon.shutdown", json!({})),
    };

    let result = client.call(method, params).await?;
    print_result(cli.format, &result);
    Ok(())
}

/// `config.set`/`apiKeys` values arrive as CLI strings; try numbers and
/// booleans before falling back to a plain JSON string so `quotio config
/// set tracker_capacity 500` doesn't stick a string in a numeric field.
fn parse_scalar(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return json!(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return json!(f);
    }
    Value::String(raw.to_string())
}

fn print_result(format: OutputFormat, result: &Value) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result).unwrap()),
        OutputFormat::Text => print_text(result, 0),
    }
}

/// A small recursive indented-key/value printer. Good enough for the
/// flat-ish objects every method in the catalog returns; nested arrays
/// of objects (accounts, quotas, logs) get one line per entry.
fn print_text(value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{pad}{key}:");
                        print_text(val, indent + 1);
                    }
                    _ => println!("{pad}{key}: {}", scalar(val)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                print_text(item, indent);
                println!();
            }
        }
        other => println!("{pad}{}", scalar(other)),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
