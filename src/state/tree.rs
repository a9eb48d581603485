//! Arena-backed lazy file tree for a remote repository.
//!
//! Nodes live in a flat `Vec` with parent/child indices; rendering walks
//! `visible()` and never touches the network. Child listings are fetched at
//! most once per path: `None` children means unfetched, `Some` (possibly
//! empty) means cached for the rest of the session. A per-path in-flight
//! registry prevents duplicate concurrent fetches of the same listing.

use std::collections::HashSet;

use crate::github::{ContentsEntry, EntryKind};

/// Path key used for the repository root listing.
pub const ROOT_PATH: &str = "";

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    /// Repo-relative path, '/'-delimited, unique within the repo
    pub path: String,
    pub kind: EntryKind,
    pub parent: Option<usize>,
    /// Directory cache: `None` = never fetched, `Some` = fetched (possibly
    /// empty). Files stay `None`.
    pub children: Option<Vec<usize>>,
    /// UI expansion, independent of cache presence
    pub open: bool,
}

/// What a toggle on a directory path amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Node closed; cached children kept
    Closed,
    /// Cache hit; node opened without a fetch
    Opened,
    /// Caller must dispatch a listing fetch for this path
    Fetch,
    /// A fetch for this path is already in flight
    AlreadyFetching,
    /// Path unknown or not a directory
    Ignored,
}

#[derive(Debug, Default)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    /// Cache entry for the root listing (`None` = unfetched)
    roots: Option<Vec<usize>>,
    in_flight: HashSet<String>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: usize) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn find(&self, path: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.path == path)
    }

    /// Whether the root listing has been fetched (or recorded as failed).
    pub fn root_loaded(&self) -> bool {
        self.roots.is_some()
    }

    pub fn is_fetching(&self, path: &str) -> bool {
        self.in_flight.contains(path)
    }

    /// Register the root fetch. Returns false if the root is already cached
    /// or a fetch is already running.
    pub fn begin_root_fetch(&mut self) -> bool {
        if self.roots.is_some() || self.in_flight.contains(ROOT_PATH) {
            return false;
        }
        self.in_flight.insert(ROOT_PATH.to_string());
        true
    }

    /// Apply a toggle to the directory at `path`.
    ///
    /// Open directories close and keep their cache. Closed directories open
    /// from cache when present; otherwise the path is marked in flight and
    /// the caller dispatches exactly one fetch. A second toggle while the
    /// fetch runs is a no-op.
    pub fn toggle(&mut self, path: &str) -> Toggle {
        let Some(id) = self.find(path) else {
            return Toggle::Ignored;
        };
        if self.nodes[id].kind != EntryKind::Dir {
            return Toggle::Ignored;
        }
        if self.nodes[id].open {
            self.nodes[id].open = false;
            return Toggle::Closed;
        }
        if self.nodes[id].children.is_some() {
            self.nodes[id].open = true;
            return Toggle::Opened;
        }
        if self.in_flight.contains(path) {
            return Toggle::AlreadyFetching;
        }
        self.in_flight.insert(path.to_string());
        Toggle::Fetch
    }

    /// Write a fetched listing into the cache under `path` and open the node.
    /// Children keep the order the listing returned; files and directories
    /// are not regrouped.
    pub fn insert_listing(&mut self, path: &str, entries: &[ContentsEntry]) {
        self.in_flight.remove(path);

        let parent = if path == ROOT_PATH { None } else { self.find(path) };
        if path != ROOT_PATH && parent.is_none() {
            return; // listing for a node we no longer know (repo switched)
        }

        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = self.nodes.len();
            self.nodes.push(TreeNode {
                name: entry.name.clone(),
                path: entry.path.clone(),
                kind: entry.kind,
                parent,
                children: None,
                open: false,
            });
            ids.push(id);
        }

        match parent {
            None => self.roots = Some(ids),
            Some(pid) => {
                self.nodes[pid].children = Some(ids);
                self.nodes[pid].open = true;
            }
        }
    }

    /// Record a failed listing fetch: cache an empty child list and open the
    /// node. At the data level this is indistinguishable from a genuinely
    /// empty directory.
    pub fn record_failed(&mut self, path: &str) {
        self.insert_listing(path, &[]);
    }

    /// Flatten the tree into renderable `(node id, depth)` rows, honoring
    /// open state and listing order.
    pub fn visible(&self) -> Vec<(usize, usize)> {
        let mut rows = Vec::new();
        let Some(roots) = &self.roots else {
            return rows;
        };
        let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            rows.push((id, depth));
            let node = &self.nodes[id];
            if node.open
                && let Some(children) = &node.children
            {
                for &child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        rows
    }
}
