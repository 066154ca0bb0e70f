//! projectscan - boundary-safe project detection for multi-service workspaces
//!
//! Given a workspace root, projectscan walks the directory tree and reports the
//! Node.js, Python, .NET and .NET AppHost projects it contains. The walk never
//! reports or descends into anything outside the root, even through symlinks
//! or `..` path segments.
//!
//! # Example
//!
//! ```no_run
//! use projectscan::{CancellationToken, DetectorConfig, RealFileSystem, WorkspaceDetector};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), projectscan::ScanError> {
//! let detector = WorkspaceDetector::new(
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(DetectorConfig::from_env()),
//! );
//! let (workspace, report) = detector.detect(Path::new("."), &CancellationToken::new())?;
//!
//! println!("Workspace root: {}", workspace.root.display());
//! for project in report.projects.iter() {
//!     println!("{} {} ({})", project.ecosystem, project.dir.display(), project.package_manager);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`detection`]: traversal, classification and workspace root resolution
//! - [`config`]: detection rules and environment overrides
//! - [`fs`]: file system abstraction with real and in-memory implementations
//! - [`cli`]: command-line interface

pub mod cli;
pub mod config;
pub mod detection;
pub mod fs;
pub mod util;

pub use config::{ConfigError, DetectorConfig};
pub use detection::{
    find_app_host, find_dotnet_projects, find_node_projects, find_python_projects,
    BoundaryGuard, CancellationToken, DetectedProjects, Ecosystem, PackageManager, Project,
    ProjectScanner, ScanError, ScanReport, ScanWarning, WorkspaceDetector, WorkspaceRoot,
    WorkspaceRootResolver,
};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
