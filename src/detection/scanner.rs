//! Single-pass project scanning over one workspace root

use crate::config::DetectorConfig;
use crate::detection::aggregate::ResultAggregator;
use crate::detection::boundary::BoundaryGuard;
use tokio_util::sync::CancellationToken;
use crate::detection::classify::ManifestClassifiers;
use crate::detection::error::{ScanError, ScanWarning};
use crate::detection::types::{DetectedProjects, Ecosystem, Project};
use crate::detection::walker::TreeWalker;
use crate::fs::{FileSystem, RealFileSystem};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Everything one scan produced
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub projects: DetectedProjects,
    pub warnings: Vec<ScanWarning>,
    /// True when the scan stopped early; `projects` holds what was found until then
    pub cancelled: bool,
    pub directories_visited: usize,
    pub scan_time_ms: u64,
}

/// Walks a workspace tree and reports the projects found under its root
#[derive(Clone)]
pub struct ProjectScanner {
    root: PathBuf,
    canonical_root: PathBuf,
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
    classifiers: Arc<ManifestClassifiers>,
}

impl ProjectScanner {
    pub fn new(
        root: impl AsRef<Path>,
        fs: Arc<dyn FileSystem>,
        config: Arc<DetectorConfig>,
    ) -> Result<Self, ScanError> {
        let root = root.as_ref();
        if !fs.exists(root) {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !fs.is_dir(root) {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let canonical_root = fs
            .canonicalize(root)
            .map_err(|e| ScanError::Canonicalize {
                path: root.to_path_buf(),
                reason: format!("{:#}", e),
            })?;
        let root = reported_root(root, &canonical_root);

        config.validate()?;
        let classifiers = ManifestClassifiers::new(fs.clone(), config.clone())?;

        debug!(
            root = %root.display(),
            canonical_root = %canonical_root.display(),
            "ProjectScanner initialized"
        );

        Ok(Self {
            root,
            canonical_root,
            fs,
            config,
            classifiers: Arc::new(classifiers),
        })
    }

    /// Scanner over the real file system with the default rules
    pub fn with_defaults(root: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::new(
            root,
            Arc::new(RealFileSystem::new()),
            Arc::new(DetectorConfig::default()),
        )
    }

    /// Root that reported paths are built on
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved root the walk and the boundary checks run against
    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    /// Maps a path under the canonical root onto the reported root
    fn rebase(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.canonical_root) {
            Ok(rest) if rest.as_os_str().is_empty() => self.root.clone(),
            Ok(rest) => self.root.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }

    pub fn scan(&self) -> ScanReport {
        self.scan_with_cancel(&CancellationToken::new())
    }

    pub fn scan_with_cancel(&self, cancel: &CancellationToken) -> ScanReport {
        let start = Instant::now();

        info!(
            root = %self.root.display(),
            excluded_dirs = self.config.excluded_dirs.len(),
            follow_symlinks = self.config.follow_symlinks,
            "Starting project scan"
        );

        let guard = BoundaryGuard::new(self.canonical_root.clone());
        let walker = TreeWalker::new(self.fs.clone(), self.config.clone())
            .with_cancellation(cancel.clone());
        let mut walk = walker.walk(&self.canonical_root);

        let mut aggregator = ResultAggregator::new();
        let mut warnings = Vec::new();
        let mut directories_visited = 0;

        for item in walk.by_ref() {
            let listing = match item {
                Ok(listing) => listing,
                Err(mut warning) => {
                    warning.path = self.rebase(&warning.path);
                    warnings.push(warning);
                    continue;
                }
            };
            directories_visited += 1;

            for mut project in self.classifiers.classify(&listing) {
                if !guard.admits(&project.dir) || !guard.admits(&project.manifest_path) {
                    debug!(
                        dir = %project.dir.display(),
                        manifest = %project.manifest_path.display(),
                        "Dropping project outside root"
                    );
                    continue;
                }

                project.dir = self.rebase(&project.dir);
                project.manifest_path = self.rebase(&project.manifest_path);

                debug!(
                    dir = %project.dir.display(),
                    ecosystem = %project.ecosystem,
                    package_manager = %project.package_manager,
                    "Detected project"
                );
                aggregator.record(project);
            }
        }

        let cancelled = walk.was_cancelled();
        let projects = aggregator.finish();
        let scan_time_ms = start.elapsed().as_millis() as u64;

        info!(
            root = %self.root.display(),
            node = projects.node.len(),
            python = projects.python.len(),
            dotnet = projects.dotnet.len(),
            app_host = projects.app_host.len(),
            warnings = warnings.len(),
            directories_visited,
            cancelled,
            elapsed_ms = scan_time_ms,
            "Project scan completed"
        );

        ScanReport {
            root: self.root.clone(),
            projects,
            warnings,
            cancelled,
            directories_visited,
            scan_time_ms,
        }
    }

    /// Runs the scan on tokio's blocking pool
    pub async fn scan_async(&self, cancel: CancellationToken) -> Result<ScanReport, ScanError> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan_with_cancel(&cancel))
            .await
            .map_err(|e| ScanError::Join(e.to_string()))
    }
}

/// Node projects under `root`, in walk order
pub fn find_node_projects(root: impl AsRef<Path>) -> Result<Vec<Project>, ScanError> {
    find_projects(root, Ecosystem::Node)
}

/// Python projects under `root`, in walk order
pub fn find_python_projects(root: impl AsRef<Path>) -> Result<Vec<Project>, ScanError> {
    find_projects(root, Ecosystem::Python)
}

/// Dotnet projects under `root`, excluding AppHost projects
pub fn find_dotnet_projects(root: impl AsRef<Path>) -> Result<Vec<Project>, ScanError> {
    find_projects(root, Ecosystem::Dotnet)
}

/// First AppHost project under `root`, if any
pub fn find_app_host(root: impl AsRef<Path>) -> Result<Option<Project>, ScanError> {
    Ok(find_projects(root, Ecosystem::AppHost)?.into_iter().next())
}

/// The requested root when it is absolute and free of `..`, else the canonical one
fn reported_root(requested: &Path, canonical: &Path) -> PathBuf {
    let lexical = requested.is_absolute()
        && !requested
            .components()
            .any(|c| matches!(c, Component::ParentDir));
    if lexical {
        requested.components().collect()
    } else {
        canonical.to_path_buf()
    }
}

fn find_projects(root: impl AsRef<Path>, ecosystem: Ecosystem) -> Result<Vec<Project>, ScanError> {
    let report = ProjectScanner::with_defaults(root)?.scan();
    let mut projects = report.projects;
    Ok(std::mem::take(projects.list_mut(ecosystem)))
}
