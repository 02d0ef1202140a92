//! Parent/child index over a flat folder collection.
//!
//! Every traversal of the hierarchy goes through [`TreeIndex`]. The index
//! is rebuilt per call from a slice of records, so it never goes stale
//! relative to the store's collection.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::warn;

use stockroom_core::types::FolderId;
use stockroom_entity::folder::{FolderNode, FolderRecord, FolderTree};

/// Depth bound used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Why an ancestor chain could not be fully resolved.
///
/// Each variant carries the part of the chain that did resolve, ordered
/// from the highest resolvable ancestor down to the requested folder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The requested folder is not in the index.
    #[error("folder {0} is not in the index")]
    UnknownFolder(FolderId),
    /// A `parent_id` points at a folder that is not in the index.
    #[error("parent {missing} of folder {child} does not resolve")]
    BrokenChain {
        /// Folder whose parent is missing.
        child: FolderId,
        /// The unresolvable parent id.
        missing: FolderId,
        /// Resolved part of the chain.
        partial: Vec<FolderId>,
    },
    /// The chain revisits a folder or runs past the depth bound.
    #[error("ancestor chain of {folder} loops or exceeds depth {limit}")]
    CorruptChain {
        /// The requested folder.
        folder: FolderId,
        /// Depth bound in force.
        limit: usize,
        /// Resolved part of the chain.
        partial: Vec<FolderId>,
    },
}

impl PathError {
    /// The resolved part of the chain.
    pub fn partial(&self) -> &[FolderId] {
        match self {
            Self::UnknownFolder(_) => &[],
            Self::BrokenChain { partial, .. } | Self::CorruptChain { partial, .. } => partial,
        }
    }
}

/// Arena-style index: records by id plus ordered child lists by parent.
#[derive(Debug, Clone)]
pub struct TreeIndex<'a> {
    by_id: HashMap<FolderId, &'a FolderRecord>,
    children: HashMap<Option<FolderId>, Vec<&'a FolderRecord>>,
    ordered: Vec<&'a FolderRecord>,
    max_depth: usize,
}

impl<'a> TreeIndex<'a> {
    /// Index `folders` with the default depth bound.
    pub fn new(folders: &'a [FolderRecord]) -> Self {
        Self::with_max_depth(folders, DEFAULT_MAX_DEPTH)
    }

    /// Index `folders`, bounding walks and tree building at `max_depth`.
    pub fn with_max_depth(folders: &'a [FolderRecord], max_depth: usize) -> Self {
        let mut by_id = HashMap::with_capacity(folders.len());
        let mut children: HashMap<Option<FolderId>, Vec<&'a FolderRecord>> = HashMap::new();
        for folder in folders {
            by_id.insert(folder.id, folder);
            children.entry(folder.parent_id).or_default().push(folder);
        }
        Self {
            by_id,
            children,
            ordered: folders.iter().collect(),
            max_depth: max_depth.max(1),
        }
    }

    /// Depth bound in force.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of indexed folders.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Look up a folder by id.
    pub fn get(&self, id: FolderId) -> Option<&'a FolderRecord> {
        self.by_id.get(&id).copied()
    }

    /// Whether `id` is indexed.
    pub fn contains(&self, id: FolderId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All folders in collection order.
    pub fn folders(&self) -> &[&'a FolderRecord] {
        &self.ordered
    }

    /// Folders whose parent is `parent_id` (`None` for root), in collection order.
    pub fn children_of(&self, parent_id: Option<FolderId>) -> &[&'a FolderRecord] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Folders whose `parent_id` does not resolve.
    pub fn orphans(&self) -> Vec<&'a FolderRecord> {
        self.ordered
            .iter()
            .copied()
            .filter(|f| f.parent_id.is_some_and(|p| !self.by_id.contains_key(&p)))
            .collect()
    }

    /// Root folders followed by orphans, so corrupted data still renders.
    pub fn roots_with_orphans(&self) -> Vec<&'a FolderRecord> {
        let mut roots = self.children_of(None).to_vec();
        roots.extend(self.orphans());
        roots
    }

    /// Ancestor chain from the root down to `id`, inclusive.
    pub fn path_to(&self, id: FolderId) -> Result<Vec<&'a FolderRecord>, PathError> {
        let mut current = self.get(id).ok_or(PathError::UnknownFolder(id))?;
        let mut chain = vec![current];
        let mut visited = HashSet::from([id]);

        while let Some(parent_id) = current.parent_id {
            let partial = || chain.iter().rev().map(|f| f.id).collect::<Vec<_>>();
            let Some(parent) = self.get(parent_id) else {
                return Err(PathError::BrokenChain {
                    child: current.id,
                    missing: parent_id,
                    partial: partial(),
                });
            };
            if !visited.insert(parent_id) || chain.len() >= self.max_depth {
                return Err(PathError::CorruptChain {
                    folder: id,
                    limit: self.max_depth,
                    partial: partial(),
                });
            }
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Like [`path_to`](Self::path_to), but clamps at the last resolvable
    /// ancestor instead of failing. Unknown folders yield an empty path.
    pub fn path_to_clamped(&self, id: FolderId) -> Vec<&'a FolderRecord> {
        match self.path_to(id) {
            Ok(path) => path,
            Err(err) => {
                warn!(folder_id = %id, error = %err, "Folder path clamped");
                err.partial().iter().filter_map(|id| self.get(*id)).collect()
            }
        }
    }

    /// Ancestor ids of `id`, nearest first, excluding `id` itself.
    pub fn ancestors_of(&self, id: FolderId) -> Vec<FolderId> {
        let path = match self.path_to(id) {
            Ok(path) => path.into_iter().map(|f| f.id).collect(),
            Err(err) => err.partial().to_vec(),
        };
        path.into_iter().rev().skip(1).collect()
    }

    /// Depth of `id` below the root (roots are 0).
    pub fn depth_of(&self, id: FolderId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors_of(id).len())
    }

    /// Every folder below `id`, excluding `id`.
    pub fn descendants_of(&self, id: FolderId) -> HashSet<FolderId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(Some(current)) {
                if child.id != id && seen.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }
        seen
    }

    /// Whether `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: FolderId, candidate: FolderId) -> bool {
        ancestor != candidate && self.descendants_of(ancestor).contains(&candidate)
    }

    /// Nested tree under `parent_id` (`None` for the whole forest).
    ///
    /// Nodes deeper than the depth bound are left out and counted in
    /// [`FolderTree::truncated`].
    pub fn build_tree(&self, parent_id: Option<FolderId>) -> FolderTree {
        let top = match parent_id {
            None => self.roots_with_orphans(),
            Some(id) => self.children_of(Some(id)).to_vec(),
        };
        let mut total = 0;
        let mut truncated = 0;
        let roots = top
            .into_iter()
            .map(|f| self.build_node(f, 0, &mut total, &mut truncated))
            .collect();

        if truncated > 0 {
            warn!(
                truncated,
                max_depth = self.max_depth,
                "Folder tree truncated at depth bound"
            );
        }

        FolderTree {
            roots,
            total_folders: total,
            truncated,
        }
    }

    fn build_node(
        &self,
        folder: &FolderRecord,
        depth: usize,
        total: &mut u64,
        truncated: &mut u64,
    ) -> FolderNode {
        *total += 1;
        let mut node = FolderNode::leaf(folder, depth);
        if depth + 1 >= self.max_depth {
            *truncated += self.descendants_of(folder.id).len() as u64;
            return node;
        }
        node.children = self
            .children_of(Some(folder.id))
            .iter()
            .map(|child| self.build_node(child, depth + 1, total, truncated))
            .collect();
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, parent: Option<&FolderRecord>) -> FolderRecord {
        FolderRecord::new(FolderId::new(), name, parent.map(|p| p.id))
    }

    /// Root, A(Root), B(A), C(Root).
    fn sample() -> Vec<FolderRecord> {
        let root = folder("Root", None);
        let a = folder("A", Some(&root));
        let b = folder("B", Some(&a));
        let c = folder("C", Some(&root));
        vec![root, a, b, c]
    }

    #[test]
    fn test_children_of_preserves_order() {
        let folders = sample();
        let index = TreeIndex::new(&folders);
        let names: Vec<&str> = index
            .children_of(Some(folders[0].id))
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(index.children_of(None).len(), 1);
        assert!(index.children_of(Some(folders[2].id)).is_empty());
    }

    #[test]
    fn test_path_to_runs_root_first() {
        let folders = sample();
        let index = TreeIndex::new(&folders);
        let path: Vec<&str> = index
            .path_to(folders[2].id)
            .unwrap()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(path, vec!["Root", "A", "B"]);
        assert_eq!(index.depth_of(folders[2].id), Some(2));
        assert_eq!(index.ancestors_of(folders[2].id), vec![folders[1].id, folders[0].id]);
    }

    #[test]
    fn test_path_to_broken_chain_is_clamped() {
        let mut folders = sample();
        let ghost = FolderId::new();
        folders[1].parent_id = Some(ghost);
        let index = TreeIndex::new(&folders);

        let err = index.path_to(folders[2].id).unwrap_err();
        match &err {
            PathError::BrokenChain { child, missing, partial } => {
                assert_eq!(*child, folders[1].id);
                assert_eq!(*missing, ghost);
                assert_eq!(partial, &vec![folders[1].id, folders[2].id]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let clamped: Vec<&str> = index
            .path_to_clamped(folders[2].id)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(clamped, vec!["A", "B"]);
    }

    #[test]
    fn test_path_to_detects_corrupt_loop() {
        let mut folders = sample();
        // A <-> B loop, detached from Root.
        folders[1].parent_id = Some(folders[2].id);
        let index = TreeIndex::new(&folders);
        let err = index.path_to(folders[2].id).unwrap_err();
        assert!(matches!(err, PathError::CorruptChain { .. }));
        let unique: HashSet<_> = err.partial().iter().collect();
        assert_eq!(unique.len(), err.partial().len());
    }

    #[test]
    fn test_path_to_unknown_folder() {
        let folders = sample();
        let index = TreeIndex::new(&folders);
        let id = FolderId::new();
        assert_eq!(index.path_to(id).unwrap_err(), PathError::UnknownFolder(id));
        assert!(index.path_to_clamped(id).is_empty());
        assert_eq!(index.depth_of(id), None);
    }

    #[test]
    fn test_descendants_of() {
        let folders = sample();
        let index = TreeIndex::new(&folders);
        let below_root = index.descendants_of(folders[0].id);
        assert_eq!(below_root.len(), 3);
        assert!(!below_root.contains(&folders[0].id));
        assert!(index.is_descendant(folders[1].id, folders[2].id));
        assert!(!index.is_descendant(folders[2].id, folders[1].id));
        assert!(!index.is_descendant(folders[1].id, folders[1].id));
    }

    #[test]
    fn test_build_tree_nests_children() {
        let folders = sample();
        let index = TreeIndex::new(&folders);
        let tree = index.build_tree(None);
        assert_eq!(tree.total_folders, 4);
        assert_eq!(tree.truncated, 0);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].children.len(), 2);
        assert_eq!(tree.roots[0].children[0].children[0].name, "B");
        assert_eq!(tree.roots[0].children[0].children[0].depth, 2);

        let subtree = index.build_tree(Some(folders[1].id));
        assert_eq!(subtree.total_folders, 1);
        assert_eq!(subtree.roots[0].name, "B");
    }

    #[test]
    fn test_build_tree_respects_depth_bound() {
        let mut folders = vec![folder("L0", None)];
        for level in 1..10 {
            let parent = folders[level - 1].clone();
            folders.push(folder(&format!("L{level}"), Some(&parent)));
        }
        let index = TreeIndex::with_max_depth(&folders, 4);
        let tree = index.build_tree(None);
        assert_eq!(tree.total_folders, 4);
        assert_eq!(tree.truncated, 6);
        assert_eq!(tree.total_folders + tree.truncated, folders.len() as u64);
    }

    #[test]
    fn test_orphans_render_as_roots() {
        let mut folders = sample();
        folders[3].parent_id = Some(FolderId::new());
        let index = TreeIndex::new(&folders);
        let names: Vec<&str> = index
            .roots_with_orphans()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Root", "C"]);
        assert_eq!(index.build_tree(None).total_folders, 4);
    }
}
