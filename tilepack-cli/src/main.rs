//! Tilepack CLI - offline map pack manager demo.
//!
//! Drives the `tilepack` library's region controller against the in-memory
//! store: list cached packs, run a simulated viewport download with a live
//! progress bar (Ctrl+C cancels and tears the pack down), and manage the
//! configuration file.

use clap::{Parser, Subcommand};

mod commands;
mod error;

use commands::config::ConfigCommands;
use commands::download::DownloadArgs;

#[derive(Debug, Parser)]
#[command(name = "tilepack", version, about = "Offline map pack manager demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List cached offline packs
    List(commands::list::ListArgs),

    /// Download an offline pack for the demo viewport
    Download(DownloadArgs),

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let _log_guard = tilepack::logging::init(&tilepack::logging::LogConfig::default());

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::List(args) => commands::list::run(args).await,
        Commands::Download(args) => commands::download::run(args).await,
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
