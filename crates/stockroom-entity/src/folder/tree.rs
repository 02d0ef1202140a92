//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use stockroom_core::types::FolderId;

use super::model::FolderRecord;

/// A node in a folder tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Depth level (0 for top-level nodes of the tree).
    pub depth: usize,
    /// Number of items directly in this folder.
    pub item_count: u64,
    /// Summed value of contained items.
    pub total_value: f64,
    /// Child folder nodes.
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// A leaf node for `folder` at `depth`.
    pub fn leaf(folder: &FolderRecord, depth: usize) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            depth,
            item_count: folder.item_count,
            total_value: folder.total_value,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> u64 {
        1 + self.children.iter().map(FolderNode::size).sum::<u64>()
    }
}

/// A folder forest rooted at the top level or at a specific folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTree {
    /// The root node(s) of the tree.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: u64,
    /// Folders left out because they sit below the depth bound.
    #[serde(default)]
    pub truncated: u64,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            total_folders: 0,
            truncated: 0,
        }
    }

    /// All nodes in depth-first, pre-order sequence.
    pub fn walk(&self) -> Vec<&FolderNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&FolderNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_depth_first() {
        let a = FolderRecord::new(FolderId::new(), "A", None);
        let b = FolderRecord::new(FolderId::new(), "B", Some(a.id));
        let c = FolderRecord::new(FolderId::new(), "C", None);
        let mut node_a = FolderNode::leaf(&a, 0);
        node_a.children.push(FolderNode::leaf(&b, 1));
        let tree = FolderTree {
            roots: vec![node_a, FolderNode::leaf(&c, 0)],
            total_folders: 3,
            truncated: 0,
        };
        let names: Vec<&str> = tree.walk().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(tree.roots[0].size(), 2);
    }
}
