//! # dermabot-cli
//!
//! Command-line interface for Dermabot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dermabot_core::error::format_error_with_suggestion;
use dermabot_core::Config;

mod commands;
mod logging;

/// Dermabot - menu-driven dermatology study bot
#[derive(Parser)]
#[command(name = "dermabot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file, merged over the defaults
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Base directory for data/, backups/ and logs/
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot against the terminal
    Chat {
        /// User id to start as
        #[arg(short, long, value_name = "ID")]
        user: Option<i64>,
    },
    /// Inspect content sections
    Sections {
        #[command(subcommand)]
        action: SectionsAction,
    },
    /// Inspect backup snapshots
    Backups {
        #[command(subcommand)]
        action: BackupsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Diagnose installation issues
    Doctor,
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum SectionsAction {
    /// List sections with their item counts
    List,
    /// Show the items of one section
    Show {
        /// Section key or directory (e.g. tests, theory)
        section: String,
    },
}

#[derive(Subcommand)]
pub enum BackupsAction {
    /// List snapshots, oldest first
    List {
        /// Only snapshots of this file name
        #[arg(short, long)]
        basename: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where configuration is read from
    Path,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load_validated(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!(format_error_with_suggestion(&e)))?;
    if let Some(root) = &cli.root {
        config.rebase(root);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("dermabot {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Chat { user } => {
            let _guard = logging::init_file(&config.logging, cli.verbose)?;
            commands::chat::run(&config, *user, cli.verbose).await?;
        }
        Commands::Sections { action } => {
            logging::init_console(cli.verbose);
            commands::sections::handle(action, &config)?;
        }
        Commands::Backups { action } => {
            logging::init_console(cli.verbose);
            commands::backups::handle(action, &config)?;
        }
        Commands::Config { action } => {
            logging::init_console(cli.verbose);
            commands::config::handle(action, &config, cli.config.as_deref())?;
        }
        Commands::Doctor => {
            logging::init_console(cli.verbose);
            commands::doctor::run(&config)?;
        }
        Commands::Version => {}
    }

    Ok(())
}
