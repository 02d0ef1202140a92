//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use stockroom_entity::folder::{FolderNode, FolderTree};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of rows in the selected format
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => print_json(rows),
    }
}

/// Print a single value in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => print_json(item),
    }
}

/// Print a folder tree as an indented outline or JSON
pub fn print_tree(tree: &FolderTree, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if tree.roots.is_empty() {
                println!("No folders.");
                return;
            }
            for node in tree.walk() {
                println!("{}", outline_line(node));
            }
            if tree.truncated > 0 {
                print_warning(&format!(
                    "{} folders below the depth limit are not shown",
                    tree.truncated
                ));
            }
        }
        OutputFormat::Json => print_json(tree),
    }
}

fn outline_line(node: &FolderNode) -> String {
    let indent = "  ".repeat(node.depth);
    let suffix = if node.children.is_empty() { "" } else { "/" };
    format!(
        "{indent}{}{suffix}  ({} items, {:.2})",
        node.name, node.item_count, node.total_value
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
