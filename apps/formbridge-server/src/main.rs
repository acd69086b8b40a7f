use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use form_submissions::domain::service::SubmissionsService;
use form_submissions::infra::firestore::credentials;
use form_submissions::infra::gate::StoreGate;
use form_submissions::infra::memory::InMemorySubmissions;
use runtime::{AppConfig, CliArgs};

mod http;
mod request_id;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Formbridge Server - form intake backend over a managed document store
#[derive(Parser)]
#[command(name = "formbridge-server")]
#[command(about = "Formbridge Server - form intake backend over a managed document store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory store instead of the managed one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration and credentials
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Layering: defaults → YAML → APP__ env → deployment env vars → CLI
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides();
    config.apply_cli_overrides(&args);

    let logging = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging(&logging, Path::new("."));
    tracing::info!("Formbridge Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args).await,
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let gate = if args.mock {
        tracing::warn!("running with an in-memory store; submissions are not persisted");
        Arc::new(StoreGate::ready(Arc::new(InMemorySubmissions::new())))
    } else {
        if !config.firestore.has_credential_source() {
            return Err(anyhow!(
                "Firebase service account not provided. Set FIREBASE_SERVICE_ACCOUNT_FILE or FIREBASE_SERVICE_ACCOUNT"
            ));
        }
        let gate = Arc::new(StoreGate::new(config.firestore.clone()));
        // Eager first attempt; a failure here stays retryable per request.
        if let Err(e) = gate.ensure_ready().await {
            tracing::warn!(error = %e, "store initialization failed at startup, will retry on demand");
        }
        gate
    };

    let service = Arc::new(SubmissionsService::new(gate.clone()));
    let app = http::build_router(service, gate);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow!("Invalid bind address: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow!(e))
}

async fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    if args.mock {
        println!("Configuration check passed (in-memory store)");
        return Ok(());
    }

    let account = credentials::resolve(&config.firestore)?;
    tracing::info!(
        project_id = %account.project_id,
        client_email = %account.client_email,
        "service account resolved"
    );

    println!("Configuration check passed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("HTTP server shutting down gracefully");
}
