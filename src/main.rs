use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use configuration::{Config, LogFormat};
use core_types::EntityKind;
use database::{DbRepository, connect, run_migrations};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// The main entry point for the bookstore tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config().context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // One connection for the whole run, closed before exit.
    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to create the bookstore schema")?;
    let db_repo = DbRepository::new(db_pool);

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Load(args) => handle_load(&db_repo, args, &config).await,
        Commands::Query(args) => handle_query(&db_repo, args).await,
    };

    db_repo.close().await;
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Bookstore inventory: seed the database from fixtures and report publisher sales.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides `logging.format` from the configuration.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace all tables with the contents of the fixture files.
    Load(LoadArgs),
    /// Print every sale of a publisher's books across shops.
    Query(QueryArgs),
}

#[derive(Parser)]
struct LoadArgs {
    /// Directory holding publisher.json, book.json, shop.json, stock.json and sale.json.
    /// Defaults to `fixtures.directory` from the configuration.
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct QueryArgs {
    /// Publisher id or part of its name. Prompted for on stdin when omitted.
    #[arg(long)]
    publisher: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_load(db_repo: &DbRepository, args: LoadArgs, config: &Config) -> anyhow::Result<()> {
    let dir = args
        .fixtures_dir
        .unwrap_or_else(|| config.fixtures.directory.clone());
    tracing::info!(dir = %dir.display(), "Loading fixtures.");

    // Per-file lines go out as each file is read, so they show even if the insert fails.
    let report = fixture_loader::run_with(db_repo, &dir, |outcome| println!("{}", outcome))
        .await
        .context("Fixture load failed; the load transaction was rolled back")?;

    println!("Tables now hold:");
    for kind in EntityKind::LOAD_ORDER {
        println!("  {:<10}{}", kind.table_name(), report.counts.get(kind));
    }

    Ok(())
}

async fn handle_query(db_repo: &DbRepository, args: QueryArgs) -> anyhow::Result<()> {
    let identifier = match args.publisher {
        Some(publisher) => publisher,
        None => prompt_publisher()?,
    };

    let records = sales_query::query_publisher_sales(db_repo, &identifier).await?;
    for line in sales_query::render_report(&records) {
        println!("{}", line);
    }

    Ok(())
}

/// Reads one line from stdin, without its line ending.
fn prompt_publisher() -> anyhow::Result<String> {
    print!("Enter publisher name or ID: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("No publisher given: standard input is closed");
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
