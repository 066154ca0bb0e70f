//! Boundary-safe directory traversal
//!
//! [`TreeWalker`] yields one [`DirListing`] per visited directory in
//! depth-first pre-order, children in name order. Excluded directories are
//! skipped by name before any boundary check, and a child whose resolved path
//! leaves the root is pruned together with its whole subtree.

use crate::config::DetectorConfig;
use crate::detection::boundary::{admits, relative_path};
use tokio_util::sync::CancellationToken;
use crate::detection::error::ScanWarning;
use crate::detection::types::{DirListing, EntryKind, ListingEntry};
use crate::fs::{FileSystem, FileType};
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub struct TreeWalker {
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
    cancel: CancellationToken,
}

impl TreeWalker {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<DetectorConfig>) -> Self {
        Self {
            fs,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Starts a walk at `root`, which also acts as the boundary
    pub fn walk(&self, root: &Path) -> Walk<'_> {
        let root = self
            .fs
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());

        let mut visited = HashSet::new();
        visited.insert(root.clone());

        Walk {
            walker: self,
            stack: vec![root.clone()],
            root,
            visited,
            cancelled: false,
        }
    }

    /// Lists `dir`, returning its listing and the child directories to descend into
    fn list(&self, root: &Path, dir: &Path) -> Result<(DirListing, Vec<PathBuf>)> {
        let mut raw = self.fs.read_dir(dir)?;
        raw.sort_by(|a, b| a.file_name().cmp(b.file_name()));

        let mut entries = Vec::with_capacity(raw.len());
        let mut children = Vec::new();

        for entry in raw {
            let name = entry.file_name().to_string();
            let path = dir.join(&name);

            match entry.file_type() {
                FileType::File => entries.push(ListingEntry {
                    name,
                    kind: EntryKind::File,
                }),
                FileType::Directory => {
                    if self.config.is_excluded_dir(&name) {
                        trace!(path = %path.display(), "Skipping excluded directory");
                    } else if !admits(root, &path) {
                        debug!(path = %path.display(), "Pruning directory outside root");
                    } else {
                        children.push(path);
                    }
                    entries.push(ListingEntry {
                        name,
                        kind: EntryKind::Directory,
                    });
                }
                FileType::Symlink => {
                    if let Some((kind, target)) = self.resolve_symlink(root, &path, &name) {
                        if let Some(target) = target {
                            children.push(target);
                        }
                        entries.push(ListingEntry { name, kind });
                    }
                }
            }
        }

        Ok((DirListing::new(dir.to_path_buf(), entries), children))
    }

    /// Resolves a symlinked entry. Returns `None` when the entry must be
    /// hidden entirely, otherwise its kind and, for followable directories,
    /// the canonical path to descend into.
    fn resolve_symlink(
        &self,
        root: &Path,
        path: &Path,
        name: &str,
    ) -> Option<(EntryKind, Option<PathBuf>)> {
        let target = match self.fs.canonicalize(path) {
            Ok(target) => target,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Skipping unresolvable symlink");
                return None;
            }
        };

        if !admits(root, &target) {
            debug!(
                path = %path.display(),
                target = %target.display(),
                "Pruning symlink that escapes root"
            );
            return None;
        }

        if !self.fs.is_dir(&target) {
            return Some((EntryKind::File, None));
        }

        if !self.config.follow_symlinks
            || self.config.is_excluded_dir(name)
            || self.passes_excluded_dir(root, &target)
        {
            trace!(path = %path.display(), "Not following symlinked directory");
            return Some((EntryKind::Directory, None));
        }

        Some((EntryKind::Directory, Some(target)))
    }

    /// True when `target`, relative to `root`, runs through an excluded directory
    fn passes_excluded_dir(&self, root: &Path, target: &Path) -> bool {
        relative_path(root, target).map_or(false, |rel| {
            rel.components().any(|component| match component {
                Component::Normal(segment) => segment
                    .to_str()
                    .map_or(false, |name| self.config.is_excluded_dir(name)),
                _ => false,
            })
        })
    }
}

/// Iterator over the directories of one walk
pub struct Walk<'a> {
    walker: &'a TreeWalker,
    root: PathBuf,
    stack: Vec<PathBuf>,
    visited: HashSet<PathBuf>,
    cancelled: bool,
}

impl Walk<'_> {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True once the walk stopped because its token was cancelled
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Iterator for Walk<'_> {
    type Item = std::result::Result<DirListing, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancelled {
            return None;
        }

        let dir = self.stack.pop()?;

        if self.walker.cancel.is_cancelled() {
            debug!(pending = self.stack.len() + 1, "Walk cancelled");
            self.cancelled = true;
            self.stack.clear();
            return None;
        }

        match self.walker.list(&self.root, &dir) {
            Ok((listing, children)) => {
                // Reverse so the first child by name is popped next
                for child in children.into_iter().rev() {
                    if self.visited.insert(child.clone()) {
                        self.stack.push(child);
                    } else {
                        trace!(path = %child.display(), "Directory already visited");
                    }
                }
                Some(Ok(listing))
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                Some(Err(ScanWarning::new(dir, format!("{:#}", e))))
            }
        }
    }
}
