//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use festival_core::Config;
use std::path::PathBuf;

pub mod actions;
pub mod delete;
pub mod filter;
pub mod link;
pub mod popup;
pub mod upload;
pub mod watch;

/// Festival - terminal companion for the festival chronicle application
#[derive(Parser)]
#[command(name = "festival")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (defaults to ~/.config/festival/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Festival server URL (overrides config and FESTIVAL_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch notification badges
    Watch(watch::WatchArgs),

    /// Print the snippet for a chronicle file
    Link(link::LinkArgs),

    /// Upload chronicle files
    Upload(upload::UploadArgs),

    /// Delete a chronicle image
    Delete(delete::DeleteArgs),

    /// Show a user's popup card
    Popup(popup::PopupArgs),

    /// Print the file-action popover for a chronicle file
    Actions(actions::ActionsArgs),

    /// Filter a tab-separated list table
    Filter(filter::FilterArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load config")?;
        if let Some(url) = self.url {
            config.base_url = url;
        }
        tracing::debug!(
            base_url = %config.base_url,
            festival_id = ?config.festival_id,
            user_id = ?config.user_id,
            "Configuration loaded"
        );

        match self.command {
            Commands::Watch(args) => watch::execute(args, &config).await,
            Commands::Link(args) => link::execute(args, &config),
            Commands::Upload(args) => upload::execute(args, &config).await,
            Commands::Delete(args) => delete::execute(args, &config).await,
            Commands::Popup(args) => popup::execute(args, &config).await,
            Commands::Actions(args) => actions::execute(args, &config),
            Commands::Filter(args) => filter::execute(args),
        }
    }
}
