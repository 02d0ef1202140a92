//! Folder management CLI commands.

use std::collections::BTreeSet;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use stockroom_core::result::AppResult;
use stockroom_core::types::{FolderId, PageRequest};
use stockroom_entity::folder::{
    CloneFolder, CreateFolder, FolderFilter, FolderHistoryEntry, FolderRecord, UpdateFolder,
};
use stockroom_entity::item::{ItemQuery, ItemRecord};
use stockroom_service::folder::DeleteOutcome;

use super::Context;
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List folders
    List {
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
        /// Only direct children of this folder
        #[arg(short, long)]
        parent: Option<FolderId>,
        /// Only folders carrying this tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Show the folder tree
    Tree,
    /// Show the breadcrumb path to a folder
    Path {
        /// Folder ID
        id: FolderId,
    },
    /// List folders that may become the new parent of a folder
    Parents {
        /// Folder ID
        id: FolderId,
    },
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<FolderId>,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: FolderId,
        /// New name
        name: String,
    },
    /// Update folder fields
    Update {
        /// Folder ID
        id: FolderId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New parent folder
        #[arg(short, long, conflicts_with = "root")]
        parent: Option<FolderId>,
        /// Move to the top level
        #[arg(long)]
        root: bool,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Move a folder under another folder or to the top level
    Move {
        /// Folder ID
        id: FolderId,
        /// New parent folder
        #[arg(long, required_unless_present = "root", conflicts_with = "root")]
        to: Option<FolderId>,
        /// Move to the top level
        #[arg(long)]
        root: bool,
    },
    /// Clone a folder beside the original
    Clone {
        /// Folder ID
        id: FolderId,
        /// Name of the clone
        new_name: String,
        /// Duplicate contained items into the clone
        #[arg(long)]
        include_items: bool,
        #[command(flatten)]
        meta: MetaArgs,
    },
    /// Delete a folder
    Delete {
        /// Folder ID
        id: FolderId,
        /// Folder receiving the subfolders and items
        #[arg(long)]
        move_items_to: Option<FolderId>,
    },
    /// List the items in a folder
    Items {
        /// Folder ID
        id: FolderId,
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show a folder's change history
    History {
        /// Folder ID
        id: FolderId,
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Optional descriptive fields
#[derive(Debug, Args)]
pub struct MetaArgs {
    /// Description
    #[arg(long)]
    description: Option<String>,
    /// Notes
    #[arg(long)]
    notes: Option<String>,
    /// Tag (repeatable; replaces existing tags when given)
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl MetaArgs {
    fn tag_set(&self) -> Option<BTreeSet<String>> {
        (!self.tags.is_empty()).then(|| self.tags.iter().cloned().collect())
    }

    fn to_update(&self) -> UpdateFolder {
        UpdateFolder {
            description: self.description.clone(),
            notes: self.notes.clone(),
            tags: self.tag_set(),
            ..UpdateFolder::default()
        }
    }
}

/// Page selection
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    page: u64,
    /// Rows per page
    #[arg(long, default_value = "25")]
    page_size: u64,
}

impl PageArgs {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent
    parent: String,
    /// Items
    items: u64,
    /// Value
    value: String,
    /// Tags
    tags: String,
}

impl FolderRow {
    fn from_record(folder: &FolderRecord, all: &[FolderRecord]) -> Self {
        let parent = folder
            .parent_id
            .map(|pid| {
                all.iter()
                    .find(|f| f.id == pid)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| pid.to_string())
            })
            .unwrap_or_else(|| "-".to_string());
        Self {
            id: folder.id.to_string(),
            name: folder.name.clone(),
            parent,
            items: folder.item_count,
            value: format!("{:.2}", folder.total_value),
            tags: folder.tags.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Item display row
#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    /// Item ID
    id: String,
    /// Name
    name: String,
    /// Quantity
    quantity: u64,
    /// Unit value
    value: String,
    /// Updated at
    updated_at: String,
}

impl From<&ItemRecord> for ItemRow {
    fn from(item: &ItemRecord) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            value: format!("{:.2}", item.value),
            updated_at: item.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// History display row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// When
    occurred_at: String,
    /// Action
    action: String,
    /// Actor
    actor: String,
    /// Details
    details: String,
}

impl From<&FolderHistoryEntry> for HistoryRow {
    fn from(entry: &FolderHistoryEntry) -> Self {
        Self {
            occurred_at: entry.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: entry.action.clone(),
            actor: entry.actor.clone().unwrap_or_else(|| "-".to_string()),
            details: entry.details.to_string(),
        }
    }
}

/// Execute folder commands
pub async fn execute(args: &FolderArgs, ctx: &Context, format: OutputFormat) -> AppResult<()> {
    let store = &ctx.store;

    match &args.command {
        FolderCommand::List {
            search,
            parent,
            tags,
        } => {
            let filter = FolderFilter {
                search: search.clone(),
                parent_id: *parent,
                tags: tags.clone(),
            };
            let all = store.folders().await;
            let folders = if filter.is_unfiltered() {
                all.clone()
            } else {
                store.search_folders(&filter).await?
            };
            let rows: Vec<FolderRow> = folders
                .iter()
                .map(|f| FolderRow::from_record(f, &all))
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Tree => {
            let tree = store.hierarchy().await?;
            output::print_tree(&tree, format);
        }
        FolderCommand::Path { id } => {
            let path = store.path_to(*id).await;
            match format {
                OutputFormat::Table => {
                    let names: Vec<&str> = path.iter().map(|f| f.name.as_str()).collect();
                    println!("{}", names.join(" / "));
                }
                OutputFormat::Json => output::print_item(&path, format),
            }
        }
        FolderCommand::Parents { id } => {
            let all = store.folders().await;
            let rows: Vec<FolderRow> = store
                .parent_options(*id)
                .await
                .iter()
                .map(|f| FolderRow::from_record(f, &all))
                .collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Create { name, parent, meta } => {
            let data = CreateFolder {
                name: name.clone(),
                parent_id: *parent,
                description: meta.description.clone(),
                notes: meta.notes.clone(),
                tags: meta.tag_set().unwrap_or_default(),
                images: Vec::new(),
            };
            let folder = store.create_folder(data).await?;
            output::print_success(&format!("Created folder '{}' ({})", folder.name, folder.id));
        }
        FolderCommand::Rename { id, name } => {
            let folder = store.update_folder(*id, UpdateFolder::rename(name)).await?;
            output::print_success(&format!("Renamed folder to '{}'", folder.name));
        }
        FolderCommand::Update {
            id,
            name,
            parent,
            root,
            meta,
        } => {
            let mut update = meta.to_update();
            update.name = name.clone();
            update.parent_id = if *root { Some(None) } else { parent.map(Some) };
            if update.is_empty() {
                output::print_warning("Nothing to update");
                return Ok(());
            }
            let folder = store.update_folder(*id, update).await?;
            output::print_success(&format!("Updated folder '{}'", folder.name));
        }
        FolderCommand::Move { id, to, root } => {
            let target = if *root { None } else { *to };
            let folder = store.move_folder(*id, target).await?;
            let path: Vec<String> = store
                .path_to(folder.id)
                .await
                .into_iter()
                .map(|f| f.name)
                .collect();
            output::print_success(&format!("Moved folder to {}", path.join(" / ")));
        }
        FolderCommand::Clone {
            id,
            new_name,
            include_items,
            meta,
        } => {
            let request = CloneFolder {
                new_name: new_name.clone(),
                include_items: *include_items,
            };
            let outcome = store
                .clone_folder(*id, request, Some(meta.to_update()))
                .await?;
            output::print_success(&format!(
                "Cloned folder as '{}' ({})",
                outcome.folder.name, outcome.folder.id
            ));
            if let Some(err) = outcome.metadata_error {
                output::print_warning(&format!("Clone created, but its details were not saved: {err}"));
            }
        }
        FolderCommand::Delete { id, move_items_to } => {
            match store.delete_folder(*id, *move_items_to).await? {
                DeleteOutcome::Committed => output::print_success("Folder deleted"),
                DeleteOutcome::LocalOnly { reason } => output::print_warning(&format!(
                    "Folder removed locally; the service did not confirm: {reason}"
                )),
            }
            ctx.relocator.recent().forget(*id).await;
        }
        FolderCommand::Items { id, search, page } => {
            store.select_folder(*id).await?;
            let query = ItemQuery {
                page: page.request(),
                search: search.clone(),
            };
            if query != ItemQuery::default() {
                store.refresh_items(&query).await?;
            }
            let items = store.folder_items().await;
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::History { id, page } => {
            let history = store.folder_history(*id, &page.request()).await?;
            let rows: Vec<HistoryRow> = history.items.iter().map(HistoryRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table && history.has_next() {
                output::print_kv("page", &format!("{} of {}", history.page, history.total_pages));
            }
        }
    }

    Ok(())
}
