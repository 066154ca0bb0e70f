//! Project detection: boundary-safe traversal, manifest classification and
//! workspace root resolution

pub mod aggregate;
pub mod boundary;
pub mod classify;
pub mod error;
pub mod scanner;
pub mod types;
pub mod walker;
pub mod workspace;

pub use aggregate::ResultAggregator;
pub use boundary::{admits, relative_path, BoundaryGuard};
pub use tokio_util::sync::CancellationToken;
pub use classify::ManifestClassifiers;
pub use error::{ScanError, ScanWarning};
pub use scanner::{
    find_app_host, find_dotnet_projects, find_node_projects, find_python_projects,
    ProjectScanner, ScanReport,
};
pub use types::{DetectedProjects, DirListing, Ecosystem, PackageManager, Project};
pub use walker::{TreeWalker, Walk};
pub use workspace::{WorkspaceDetector, WorkspaceRoot, WorkspaceRootResolver};
