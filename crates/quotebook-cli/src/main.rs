//! Quotebook CLI
//!
//! Command-line interface for Quotebook - a local quote collection that
//! syncs with a remote quote source.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotebook_core::{Config, QuoteStore};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Quotebook - Collect, browse and sync quotes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start with connectivity down (no network calls)
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random quote (default)
    Show {
        /// Category to draw from (defaults to the saved filter)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List quotes
    #[command(alias = "ls")]
    List {
        /// Category to list (defaults to the saved filter)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Category
        #[arg(short, long)]
        category: String,
    },
    /// List categories
    Categories,
    /// Save the category filter ("all" clears it)
    Filter {
        /// Category name
        category: String,
    },
    /// Import quotes from a JSON file
    Import {
        /// JSON file containing an array of quotes
        file: PathBuf,
    },
    /// Export all quotes to a JSON file
    Export {
        /// Output file ("-" for stdout)
        #[arg(short, long, default_value_os_t = commands::quote::default_export_path())]
        output: PathBuf,
    },
    /// Replace all quotes with the default set
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Sync with the remote quote source
    Sync,
    /// Show status (counts, filter, last sync)
    Status,
    /// Keep syncing on a schedule until interrupted
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, remote_url, sync_enabled, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let online = !(cli.offline || config.offline);
    let mut store = QuoteStore::open(&config);
    info!("Opened store with {} quotes", store.len());

    let result = match cli.command.unwrap_or(Commands::Show { category: None }) {
        Commands::Show { category } => commands::quote::show(&store, category, &output),
        Commands::List { category } => commands::quote::list(&store, category, &output),
        Commands::Categories => commands::category::list(&store, &output),
        Commands::Filter { category } => commands::category::filter(&mut store, category, &output),
        Commands::Import { file } => commands::quote::import(&mut store, &file, &output),
        Commands::Export { output: path } => commands::quote::export(&store, &path, &output),
        Commands::Reset { yes } => commands::quote::reset(&mut store, yes, &output),
        Commands::Status => commands::status::show(&store, &config, online, &output),
        Commands::Add { text, category } => {
            let engine = shared_engine(&config, store, online, output)?;
            commands::quote::add(&engine, &config, text, category, &output).await
        }
        Commands::Sync => {
            let notices = commands::sync::pass_output(output);
            let engine = shared_engine(&config, store, online, notices)?;
            commands::sync::sync(&engine, &config, output.is_json()).await
        }
        Commands::Watch => {
            let engine = shared_engine(&config, store, online, output)?;
            commands::watch::watch(engine, &config, &output).await
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    if let Err(e) = &result {
        if let Some(hint) = commands::recovery_hint(e) {
            output.hint(hint);
        }
    }

    result
}

/// Hand the store to a sync engine that reports through the terminal
fn shared_engine(
    config: &Config,
    store: QuoteStore,
    online: bool,
    output: Output,
) -> Result<Arc<quotebook_core::sync::SyncEngine>> {
    commands::sync::engine(
        config,
        Arc::new(Mutex::new(store)),
        online,
        Arc::new(output),
    )
}

/// Initialize logging if QUOTEBOOK_LOG is set
///
/// Logs go to the configured log file, or stderr when none is set.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("QUOTEBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "quotebook_core={},quotebook={}",
        log_level, log_level
    ));

    let Some(log_path) = config.log_file.clone() else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .try_init();

    info!("Logging to {:?}", log_path);
}
