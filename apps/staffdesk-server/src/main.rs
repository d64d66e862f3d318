mod shutdown;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use db::{absolutize_sqlite_dsn, ConnectOpts, DbHandle};
use employees::{Employees, EmployeesConfig};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use tokio_util::sync::CancellationToken;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MOCK_DSN: &str = "sqlite::memory:";

/// Staffdesk Server - employee records over HTTP
#[derive(Parser)]
#[command(name = "staffdesk-server")]
#[command(about = "Staffdesk Server - employee records over HTTP")]
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

    /// Use an in-memory database instead of the configured one
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

    // home_dir is normalized and created while loading
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Staffdesk Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if db::is_memory_dsn(raw) {
        return Ok("sqlite");
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// The DSN to connect to: the mock override, or the configured one with
/// relative SQLite paths resolved under `home_dir`.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<String> {
    if args.mock {
        return Ok(MOCK_DSN.to_string());
    }
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configured; add a `database` section or pass --mock"))?;
    detect_from_dsn(db_config)?;

    let dsn = db_config.url.trim().to_string();
    if dsn.starts_with("sqlite://") {
        Ok(absolutize_sqlite_dsn(&dsn, &config.home_dir(), true)?)
    } else {
        Ok(dsn)
    }
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    Ok(config
        .module_config::<ApiIngressConfig>("api_ingress")?
        .with_fallback_bind(&config.server.host, config.server.port))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let dsn = resolve_dsn(&config, &args)?;
    let employees_cfg: EmployeesConfig = config.module_config(Employees::NAME)?;
    let ingress = ApiIngress::new(ingress_config(&config)?);

    let db_config = config.database.clone().unwrap_or(DatabaseConfig {
        url: dsn.clone(),
        max_conns: None,
        busy_timeout_ms: None,
    });
    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts)
        .await
        .context("cannot connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    Employees::migrate(&db.sea()).await?;
    let module = Employees::init(employees_cfg, db.sea());
    let router = ingress.build_router(module.register_rest(Router::new()), Employees::openapi());

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());

    let served = ingress.serve(router, cancel).await;
    db.close().await?;
    tracing::info!("Staffdesk Server stopped");
    served
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    resolve_dsn(&config, &args)?;
    config.module_config::<EmployeesConfig>(Employees::NAME)?;
    let ingress = ingress_config(&config)?;
    ingress
        .bind_addr
        .parse::<std::net::SocketAddr>()
        .with_context(|| format!("Invalid bind address '{}'", ingress.bind_addr))?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
