//! Stockroom - inventory and storefront server.
//!
//! Commands:
//! - `stockroom serve` - Run the HTTP server
//! - `stockroom init-db` - Create the SQLite schema
//! - `stockroom seed` - Insert default accounts and a sample catalog
//! - `stockroom config show` - Print the effective configuration

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use stockroom_db::{init_schema, BackendKind, Db};
use stockroom_server::seed::{self, SeedReport};
use stockroom_server::{telemetry, AppConfig, AppState};

use output::Output;

/// Stockroom - inventory and storefront server
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Create the SQLite tables and indexes
    InitDb,

    /// Insert default accounts and a sample catalog
    Seed,

    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Seed default accounts and sample data before serving
    #[arg(long)]
    seed: bool,

    /// Override the listen address
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.verbose, cli.json);

    let result = run(cli, &output).await;
    if let Err(e) = result {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            telemetry::init_tracing(&config.logging, cli.verbose)?;
            let state = AppState::open(config).await?;
            if args.seed {
                let report = seed::seed(&state).await?;
                print_report(output, &report);
            }
            stockroom_server::serve(state).await
        }
        Commands::InitDb => init_db(&config, output).await,
        Commands::Seed => {
            telemetry::init_tracing(&config.logging, cli.verbose)?;
            if config.storage.backend == BackendKind::Memory {
                output.warn("The memory backend keeps nothing after this command exits");
            }
            let state = AppState::open(config).await?;
            let report = seed::seed(&state).await?;
            print_report(output, &report);
            Ok(())
        }
        Commands::Config(args) => match args.command {
            ConfigCommand::Show => {
                show_config(&config, output);
                Ok(())
            }
        },
    }
}

async fn init_db(config: &AppConfig, output: &Output) -> Result<()> {
    if config.storage.backend != BackendKind::Sqlite {
        bail!(
            "init-db needs the sqlite backend (configured: {})",
            config.storage.backend
        );
    }
    output.debug(&format!("Connecting to {}", config.storage.database_url));
    let db = Db::connect(&config.storage.database_url)
        .await
        .with_context(|| format!("Failed to open {}", config.storage.database_url))?;
    init_schema(&db).await?;
    output.success(&format!("Schema ready at {}", config.storage.database_url));
    Ok(())
}

fn print_report(output: &Output, report: &SeedReport) {
    if output.is_json() {
        output.json(report);
        return;
    }
    if report.is_empty() {
        output.info("Nothing to seed, data already present");
        return;
    }
    output.header("Seeded");
    for user in &report.users {
        output.list_item(&format!("user {}", user));
    }
    for category in &report.categories {
        output.list_item(&format!("category {}", category));
    }
    for product in &report.products {
        output.list_item(&format!("product {}", product));
    }
    output.success(&format!(
        "{} users, {} categories, {} products",
        report.users.len(),
        report.categories.len(),
        report.products.len()
    ));
}

fn show_config(config: &AppConfig, output: &Output) {
    if output.is_json() {
        output.json(config);
        return;
    }
    output.header("Current Configuration");

    output.info("[server]");
    output.kv("bind", &config.server.bind);
    output.kv("page_size", &config.server.page_size.to_string());
    output.kv("currency", config.server.currency.code());

    output.info("[storage]");
    output.kv("backend", &config.storage.backend.to_string());
    output.kv("database_url", &config.storage.database_url);

    output.info("[media]");
    output.kv("dir", &config.media.dir.display().to_string());
    output.kv("base_url", &config.media.base_url);

    output.info("[session]");
    output.kv("cookie_name", &config.session.cookie_name);
    output.kv("ttl_secs", &config.session.ttl_secs.to_string());

    output.info("[logging]");
    output.kv("json", &config.logging.json.to_string());
    if let Some(filter) = &config.logging.filter {
        output.kv("filter", filter);
    }
}
