use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use accounts::{AccountsConfig, AccountsModule, Migrator};
use anyhow::{anyhow, Context, Result};
use api_ingress::ApiIngressConfig;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit_db::{sqlite::absolutize_sqlite_dsn, ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Account Service - identity-keyed account registration and lookup
#[derive(Parser)]
#[command(name = "account-server")]
#[command(about = "Account Service - identity-keyed account registration and lookup")]
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

    /// Use an in-memory database
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
    /// Apply pending database migrations and exit
    Migrate,
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
    runtime::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!(home_dir = %config.server.home_dir, "Account Service starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Migrate => migrate(config).await,
    }
}

fn database_config(config: &AppConfig) -> Result<&DatabaseConfig> {
    let db = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("database section is not configured"))?;
    if db.url.trim().is_empty() {
        return Err(anyhow!("database.url is empty"));
    }
    DbHandle::detect(db.url.trim())
        .with_context(|| format!("unsupported database url '{}'", db.url))?;
    Ok(db)
}

async fn connect_db(config: &AppConfig) -> Result<DbHandle> {
    let db_config = database_config(config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, &config.home_dir(), true)?;
    }

    let opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    tracing::info!(dsn = %dsn, "connecting to database");
    let db = DbHandle::connect(&dsn, opts)
        .await
        .context("failed to connect to database")?;
    tracing::info!(engine = ?db.engine(), "database connected");
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let auth = config
        .auth
        .as_ref()
        .ok_or_else(|| anyhow!("auth section is required to serve account routes"))?;
    let verifier = modkit_auth::build_verifier(auth)?;

    let accounts_cfg: AccountsConfig = config.module_config("accounts")?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let db = connect_db(&config).await?;
    let applied = db.migrate::<Migrator>().await?;
    tracing::info!(applied, "schema up to date");

    let module = AccountsModule::new(db.sea(), accounts_cfg);
    let safety_net =
        (config.server.timeout_sec > 0).then(|| Duration::from_secs(config.server.timeout_sec));
    let router = api_ingress::build_router(module.router(verifier), &ingress_cfg, safety_net);

    let cancel = modkit::runtime::shutdown_on_signals();
    let served = api_ingress::serve(router, addr, cancel).await;

    db.close().await;
    tracing::info!("Account Service stopped");
    served
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    database_config(&config)?;
    if let Some(auth) = &config.auth {
        modkit_auth::build_verifier(auth)?;
    } else {
        tracing::warn!("no auth section; `run` will refuse to start");
    }
    config.module_config::<AccountsConfig>("accounts")?;
    config.module_config::<ApiIngressConfig>("api_ingress")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn migrate(config: AppConfig) -> Result<()> {
    let db = connect_db(&config).await?;
    let applied = db.migrate::<Migrator>().await;
    db.close().await;
    println!("Applied {} migration(s)", applied?);
    Ok(())
}
