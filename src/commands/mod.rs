//! CLI command definitions and dispatch.

pub mod folder;
pub mod item;
pub mod recent;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use stockroom_core::config::AppConfig;
use stockroom_core::result::AppResult;
use stockroom_service::folder::{FetchOutcome, FolderStore};
use stockroom_service::relocate::{BulkRelocator, RecentFolders};

use crate::output::{self, OutputFormat};

/// Stockroom: inventory folder hierarchy management
#[derive(Debug, Parser)]
#[command(name = "stockroom", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to load, e.g. `development` or `production`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder management
    Folder(folder::FolderArgs),
    /// Item operations
    Item(item::ItemArgs),
    /// Recently used destination folders
    Recent(recent::RecentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        let ctx = Context::build(config).await?;
        match &self.command {
            Commands::Folder(args) => folder::execute(args, &ctx, self.format).await,
            Commands::Item(args) => item::execute(args, &ctx, self.format).await,
            Commands::Recent(args) => recent::execute(args, &ctx, self.format).await,
        }
    }
}

/// Services shared by every command.
#[derive(Debug)]
pub struct Context {
    /// Folder store, already loaded from the remote.
    pub store: Arc<FolderStore>,
    /// Bulk item relocator.
    pub relocator: BulkRelocator,
}

impl Context {
    /// Wire the remote, store, preferences and relocator from `config`,
    /// then load folders once.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let remote = stockroom_remote::from_config(&config.remote).await?;
        let degraded = stockroom_service::folder::degraded::from_config(&config.store).await?;
        let store = Arc::new(FolderStore::new(
            remote.clone(),
            degraded,
            config.store.clone(),
        ));

        let preferences = stockroom_service::preferences::from_config(&config.preferences).await?;
        let recent = RecentFolders::new(preferences, config.relocate.recent_limit);
        let relocator = BulkRelocator::new(remote, recent, &config.relocate);

        if let FetchOutcome::Degraded { reason } = store.fetch_folders().await? {
            output::print_warning(&format!("Working offline: {reason}"));
        }

        Ok(Self {
            store,
            relocator,
        })
    }
}
