//! Item CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, ItemId};
use stockroom_service::relocate::{RelocateReport, RelocateStatus};

use super::Context;
use crate::output::{self, OutputFormat};

/// Arguments for item commands
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Item subcommand
    #[command(subcommand)]
    pub command: ItemCommand,
}

/// Item subcommands
#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Move items into a folder in batches
    Relocate {
        /// Destination folder
        #[arg(long, required_unless_present = "root", conflicts_with = "root")]
        to: Option<FolderId>,
        /// Unassign the items instead
        #[arg(long)]
        root: bool,
        /// Item IDs
        #[arg(required = true)]
        ids: Vec<ItemId>,
    },
}

/// Failed batch display row
#[derive(Debug, Serialize, Tabled)]
struct BatchErrorRow {
    /// Batch number (1-based)
    batch: usize,
    /// Items in the batch
    items: usize,
    /// Error message
    error: String,
}

/// Execute item commands
pub async fn execute(args: &ItemArgs, ctx: &Context, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        ItemCommand::Relocate { to, root, ids } => {
            let destination = if *root { None } else { *to };
            let show_progress = format == OutputFormat::Table;
            let report = ctx
                .relocator
                .relocate_with_progress(ids, destination, |p| {
                    if show_progress {
                        eprintln!("  {:>3}%  {}/{} items", p.percent, p.processed, p.total);
                    }
                })
                .await;

            if report.completed > 0 {
                ctx.store.fetch_folders().await?;
            }
            print_report(&report, format);
        }
    }
    Ok(())
}

fn print_report(report: &RelocateReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_item(report, format);
        return;
    }

    let summary = format!("{} of {} items moved", report.completed, report.total);
    match report.status {
        RelocateStatus::AllSucceeded => output::print_success(&summary),
        RelocateStatus::PartialSuccess | RelocateStatus::AllFailed => {
            output::print_warning(&format!("{summary} ({})", report.status));
            let rows: Vec<BatchErrorRow> = report
                .errors
                .iter()
                .map(|e| BatchErrorRow {
                    batch: e.batch_index + 1,
                    items: e.item_count,
                    error: e.message.clone(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
    output::print_kv("batches", &report.batch_count.to_string());
    output::print_kv("failed", &report.failed().to_string());
}
