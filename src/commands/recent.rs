//! Recently used destination folders.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use stockroom_core::result::AppResult;

use super::Context;
use crate::output::{self, OutputFormat};

/// Arguments for the recent command
#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Forget every entry
    #[arg(long)]
    pub clear: bool,
}

/// Recent folder display row
#[derive(Debug, Serialize, Tabled)]
struct RecentRow {
    /// Position, most recent first
    rank: usize,
    /// Folder ID
    id: String,
    /// Name
    name: String,
}

/// Execute the recent command
pub async fn execute(args: &RecentArgs, ctx: &Context, format: OutputFormat) -> AppResult<()> {
    let recent = ctx.relocator.recent();
    if args.clear {
        recent.clear().await;
        output::print_success("Recent folders cleared");
        return Ok(());
    }

    let mut rows = Vec::new();
    for (index, id) in recent.list().await.into_iter().enumerate() {
        let name = ctx
            .store
            .folder(id)
            .await
            .map(|f| f.name)
            .unwrap_or_else(|| "(unknown)".to_string());
        rows.push(RecentRow {
            rank: index + 1,
            id: id.to_string(),
            name,
        });
    }
    output::print_list(&rows, format);
    Ok(())
}
