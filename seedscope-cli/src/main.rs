//! Seedscope CLI - Command-line interface
//!
//! Inspects torrent files, checks tracker health, and manages the saved
//! torrent library.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use seedscope_core::config::SeedscopeConfig;
use seedscope_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "seedscope")]
#[command(about = "Inspect torrent files and check tracker health")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Library file, overrides SEEDSCOPE_LIBRARY
    #[arg(long, global = true)]
    library: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), None) {
        eprintln!("Warning: debug log disabled: {e}");
    }

    let mut config = SeedscopeConfig::from_env()?;
    if let Some(library) = cli.library {
        config.storage.library_path = library;
    }
    tracing::debug!(
        "Library: {}, probe timeout: {:?}",
        config.storage.library_path.display(),
        config.probe.timeout
    );

    commands::handle_command(cli.command, config).await
}
