mod db;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::ConnectionTrait;
use std::path::{Path, PathBuf};
use subscriptions::{Subscriptions, SubscriptionsConfig};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SUBSCRIPTIONS_MODULE: &str = "subscriptions";
const API_INGRESS_MODULE: &str = "api_ingress";

/// Subscriptions Server - user subscription records over HTTP
#[derive(Parser)]
#[command(name = "subscriptions-server")]
#[command(about = "Subscriptions Server - user subscription records over HTTP")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Subscriptions Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
        Commands::Migrate => migrate(config, args).await,
    }
}

async fn open_database(config: &AppConfig, args: &CliArgs) -> Result<sea_orm::DatabaseConnection> {
    let db_config = config.database.clone().unwrap_or_else(|| {
        tracing::warn!("No database configuration found, using the default SQLite file");
        DatabaseConfig::default()
    });

    let base_dir = PathBuf::from(&config.server.home_dir);
    let dsn = db::effective_dsn(&db_config, &base_dir, args.mock)?;

    tracing::info!("Connecting to database: {}", db::redact_dsn(&dsn));
    let conn = db::connect(&dsn, Some(&db_config)).await?;
    tracing::info!(backend = ?conn.get_database_backend(), "Connected to database");

    Ok(conn)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let subs_cfg: SubscriptionsConfig = config.module_config(SUBSCRIPTIONS_MODULE)?;
    let mut ingress_cfg: ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;
    // server.timeout_sec = 0 keeps the ingress default
    if config.server.timeout_sec > 0 {
        ingress_cfg.request_timeout_sec = config.server.timeout_sec;
    }

    let ingress = ApiIngress::new(ingress_cfg);
    let addr = ingress.resolve_bind_addr(&config.server.host, config.server.port)?;

    let conn = open_database(&config, &args).await?;
    Subscriptions::migrate(&conn).await?;

    let module = Subscriptions::init(conn, &subs_cfg);
    let router = ingress.build_router(
        module.register_rest(axum::Router::new()),
        Some(module.openapi()),
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match runtime::shutdown::wait_for_shutdown().await {
            Ok(()) => tracing::info!("shutdown: signal received"),
            Err(e) => tracing::warn!(error = %e, "shutdown: signal handler failed, cancelling"),
        }
        signal_cancel.cancel();
    });

    ingress.serve(addr, router, cancel).await?;
    tracing::info!("Subscriptions Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    if !args.mock {
        if let Some(db_config) = &config.database {
            db::detect_from_dsn(&db_config.url).context("Invalid database configuration")?;
        }
    }

    let _: SubscriptionsConfig = config.module_config(SUBSCRIPTIONS_MODULE)?;
    let ingress_cfg: ApiIngressConfig = config.module_config(API_INGRESS_MODULE)?;
    ApiIngress::new(ingress_cfg).resolve_bind_addr(&config.server.host, config.server.port)?;

    // AppConfig::load_* already normalized & created home_dir
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

async fn migrate(config: AppConfig, args: CliArgs) -> Result<()> {
    let conn = open_database(&config, &args).await?;
    Subscriptions::migrate(&conn).await?;
    println!("Migrations applied");
    Ok(())
}
