/// Version injected at compile time via HCP_ADAPTER_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("HCP_ADAPTER_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hcp_adapter::config::Config;
use hcp_adapter::diag::Diagnostic;
use hcp_adapter::hcp::client::HcpClient;
use hcp_adapter::scope::configure_scope;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Scope doctor for the HCP adapter
///
/// Loads the adapter configuration, authenticates against HCP, resolves the
/// default (organization, project) scope exactly as embedded resources would
/// see it, and prints the outcome.
#[derive(Parser, Debug)]
#[command(name = "hcp-adapter", version, about, long_about = None)]
struct Args {
    /// HCP project to pin the default scope to
    #[arg(short, long)]
    project: Option<String>,

    /// Override the HCP API host (useful against test endpoints)
    #[arg(long)]
    api_host: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return None;
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("hcp-adapter {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("hcp-adapter").join("hcp-adapter.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".hcp-adapter").join("hcp-adapter.log");
    }
    PathBuf::from("hcp-adapter.log")
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    eprintln!("{}: {}", diagnostic.severity.as_str(), diagnostic.summary);
    if !diagnostic.detail.is_empty() {
        eprintln!("  {}", diagnostic.detail);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    // Step 1: Load configuration and fold in CLI overrides
    let mut config = Config::load();
    if let Some(project) = args.project.clone() {
        config.project_id = Some(project);
    }
    if let Some(api_host) = args.api_host.clone() {
        config.api_host = Some(api_host);
    }

    tracing::info!("Using API endpoint: {}", config.api_base());

    // Step 2: Initialize the HCP client
    let client = HcpClient::new(&config).context("failed to initialize the HCP client")?;

    // Step 3: Resolve the default scope the way resources will see it
    match configure_scope(&client).await {
        Ok(configured) => {
            for warning in &configured.warnings {
                print_diagnostic(warning);
            }
            println!("organization_id: {}", configured.scope.organization_id);
            println!("project_id:      {}", configured.scope.project_id);
            Ok(())
        }
        Err(err) => {
            print_diagnostic(&Diagnostic::error(
                "Unable to configure the default scope",
                err.to_string(),
            ));
            std::process::exit(1);
        }
    }
}
