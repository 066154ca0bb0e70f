//! Workspace root resolution
//!
//! A workspace root is the nearest directory, at or above a starting point,
//! that holds one of the configured marker files. [`WorkspaceDetector`] ties
//! resolution and scanning together so the root is derived exactly once and
//! then handed to the scanner.

use crate::config::DetectorConfig;
use tokio_util::sync::CancellationToken;
use crate::detection::error::ScanError;
use crate::detection::scanner::{ProjectScanner, ScanReport};
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceRoot {
    pub root: PathBuf,
    /// Marker file that decided the root; `None` when the start directory was used as-is
    pub marker_file: Option<PathBuf>,
}

pub struct WorkspaceRootResolver {
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
}

impl WorkspaceRootResolver {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<DetectorConfig>) -> Self {
        Self { fs, config }
    }

    /// First marker file found walking from `start` up to the file system root
    pub fn find_marker(&self, start: &Path) -> Option<PathBuf> {
        let start = self
            .fs
            .canonicalize(start)
            .unwrap_or_else(|_| start.to_path_buf());

        for dir in start.ancestors() {
            for marker in &self.config.workspace_markers {
                let candidate = dir.join(marker);
                if self.fs.is_file(&candidate) {
                    debug!(marker = %candidate.display(), "Found workspace marker");
                    return Some(candidate);
                }
            }
        }

        None
    }

    pub fn resolve(&self, start: &Path) -> Result<WorkspaceRoot, ScanError> {
        if !self.fs.exists(start) {
            return Err(ScanError::RootNotFound(start.to_path_buf()));
        }

        let mut start_dir = self
            .fs
            .canonicalize(start)
            .map_err(|e| ScanError::Canonicalize {
                path: start.to_path_buf(),
                reason: format!("{:#}", e),
            })?;
        if !self.fs.is_dir(&start_dir) {
            start_dir = start_dir
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| ScanError::NotADirectory(start.to_path_buf()))?;
        }

        let marker = self.find_marker(&start_dir);
        let root = match marker.as_deref().and_then(Path::parent) {
            Some(dir) => dir.to_path_buf(),
            None => {
                warn!(
                    start = %start_dir.display(),
                    markers = ?self.config.workspace_markers,
                    "No workspace marker found, using start directory as root"
                );
                start_dir
            }
        };

        Ok(WorkspaceRoot {
            root,
            marker_file: marker,
        })
    }
}

/// Resolves a workspace root and scans it in one pass
pub struct WorkspaceDetector {
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
    resolver: WorkspaceRootResolver,
}

impl WorkspaceDetector {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<DetectorConfig>) -> Self {
        let resolver = WorkspaceRootResolver::new(fs.clone(), config.clone());
        Self {
            fs,
            config,
            resolver,
        }
    }

    pub fn resolver(&self) -> &WorkspaceRootResolver {
        &self.resolver
    }

    pub fn detect(
        &self,
        start: &Path,
        cancel: &CancellationToken,
    ) -> Result<(WorkspaceRoot, ScanReport), ScanError> {
        let workspace = self.resolver.resolve(start)?;
        let scanner = ProjectScanner::new(&workspace.root, self.fs.clone(), self.config.clone())?;
        let report = scanner.scan_with_cancel(cancel);
        Ok((workspace, report))
    }
}
