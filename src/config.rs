//! Configuration management for projectscan
//!
//! Detection rules are plain data held by [`DetectorConfig`]: which directory
//! names are never descended into, which files identify each ecosystem, the
//! lockfile precedence used to pick a package manager, and the workspace
//! marker files used to locate a root. The configuration is immutable once a
//! scan starts and is shared behind an `Arc`.
//!
//! # Environment Variables
//!
//! - `PROJECTSCAN_EXCLUDE`: comma-separated directory names excluded in
//!   addition to the built-in list
//! - `PROJECTSCAN_MARKERS`: comma-separated workspace marker file names,
//!   replacing the defaults (`azure.yaml`, `azure.yml`)
//! - `PROJECTSCAN_SKIP_HIDDEN`: skip every dot directory (true|false) - default: "false"
//! - `PROJECTSCAN_FOLLOW_SYMLINKS`: follow symlinked directories that stay
//!   inside the root (true|false) - default: "true"
//!
//! # Example
//!
//! ```
//! use projectscan::DetectorConfig;
//!
//! let config = DetectorConfig::from_env();
//! config.validate().expect("Invalid configuration");
//! assert!(config.is_excluded_dir("node_modules"));
//! ```

use crate::detection::types::PackageManager;
use regex::Regex;
use std::env;
use std::fmt;
use thiserror::Error;

/// Directory names never descended into: dependency caches, VCS metadata and
/// build output.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "bin",
    "obj",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    ".turbo",
    ".vs",
    ".idea",
    ".azure",
];

pub const DEFAULT_WORKSPACE_MARKERS: &[&str] = &["azure.yaml", "azure.yml"];

pub const DEFAULT_ORCHESTRATOR_PATTERN: &str = r"DistributedApplication\s*\.\s*CreateBuilder";

const DEFAULT_SKIP_HIDDEN: bool = false;
const DEFAULT_FOLLOW_SYMLINKS: bool = true;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file or directory name is empty or contains a path separator
    #[error("Invalid {field} entry {name:?}: must be a plain, non-empty file name")]
    InvalidName { field: String, name: String },

    /// An orchestrator pattern failed to compile
    #[error("Invalid orchestrator pattern {pattern:?}: {error}")]
    InvalidPattern { pattern: String, error: String },

    /// A list that needs at least one entry is empty
    #[error("{0} must contain at least one entry")]
    EmptyList(String),
}

/// Lockfile name and the package manager it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileRule {
    pub file: String,
    pub package_manager: PackageManager,
}

impl LockfileRule {
    pub fn new(file: &str, package_manager: PackageManager) -> Self {
        Self {
            file: file.to_string(),
            package_manager,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRules {
    pub manifest: String,
    /// Checked in order; the first lockfile present decides the package manager
    pub lockfiles: Vec<LockfileRule>,
}

impl Default for NodeRules {
    fn default() -> Self {
        Self {
            manifest: "package.json".to_string(),
            lockfiles: vec![
                LockfileRule::new("bun.lockb", PackageManager::Bun),
                LockfileRule::new("bun.lock", PackageManager::Bun),
                LockfileRule::new("pnpm-lock.yaml", PackageManager::Pnpm),
                LockfileRule::new("yarn.lock", PackageManager::Yarn),
                LockfileRule::new("package-lock.json", PackageManager::Npm),
                LockfileRule::new("npm-shrinkwrap.json", PackageManager::Npm),
            ],
        }
    }
}

/// One piece of Python evidence, in precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PythonEvidence {
    /// Presence of the file alone decides the package manager
    Marker {
        file: String,
        package_manager: PackageManager,
    },
    /// A `pyproject.toml`-style file whose `[tool.*]` tables decide the package manager
    PyProject { file: String },
}

impl PythonEvidence {
    pub fn marker(file: &str, package_manager: PackageManager) -> Self {
        PythonEvidence::Marker {
            file: file.to_string(),
            package_manager,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            PythonEvidence::Marker { file, .. } => file,
            PythonEvidence::PyProject { file } => file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRules {
    pub evidence: Vec<PythonEvidence>,
}

impl Default for PythonRules {
    fn default() -> Self {
        Self {
            evidence: vec![
                PythonEvidence::marker("uv.lock", PackageManager::Uv),
                PythonEvidence::marker("poetry.lock", PackageManager::Poetry),
                PythonEvidence::marker("Pipfile.lock", PackageManager::Pipenv),
                PythonEvidence::PyProject {
                    file: "pyproject.toml".to_string(),
                },
                PythonEvidence::marker("Pipfile", PackageManager::Pipenv),
                PythonEvidence::marker("setup.py", PackageManager::Pip),
                PythonEvidence::marker("requirements.txt", PackageManager::Pip),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotnetRules {
    /// Project file extensions, without the leading dot
    pub project_extensions: Vec<String>,
    /// Source files inspected for orchestrator evidence
    pub entry_points: Vec<String>,
    /// Regexes that mark an entry point as an orchestrator host
    pub orchestrator_patterns: Vec<String>,
}

impl Default for DotnetRules {
    fn default() -> Self {
        Self {
            project_extensions: vec![
                "csproj".to_string(),
                "fsproj".to_string(),
                "vbproj".to_string(),
            ],
            entry_points: vec!["Program.cs".to_string(), "AppHost.cs".to_string()],
            orchestrator_patterns: vec![DEFAULT_ORCHESTRATOR_PATTERN.to_string()],
        }
    }
}

/// Immutable detection rules shared by every stage of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    pub excluded_dirs: Vec<String>,

    /// Skip every directory whose name starts with a dot
    pub skip_hidden_dirs: bool,

    /// Follow symlinked directories whose targets stay inside the root
    pub follow_symlinks: bool,

    /// Marker files that identify a workspace root, checked in order
    pub workspace_markers: Vec<String>,

    pub node: NodeRules,
    pub python: PythonRules,
    pub dotnet: DotnetRules,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            skip_hidden_dirs: DEFAULT_SKIP_HIDDEN,
            follow_symlinks: DEFAULT_FOLLOW_SYMLINKS,
            workspace_markers: DEFAULT_WORKSPACE_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            node: NodeRules::default(),
            python: PythonRules::default(),
            dotnet: DotnetRules::default(),
        }
    }
}

impl DetectorConfig {
    /// Built-in defaults with `PROJECTSCAN_*` environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(extra) = env::var("PROJECTSCAN_EXCLUDE").ok().map(|v| split_list(&v)) {
            for name in extra {
                if !config.excluded_dirs.contains(&name) {
                    config.excluded_dirs.push(name);
                }
            }
        }

        if let Some(markers) = env::var("PROJECTSCAN_MARKERS").ok().map(|v| split_list(&v)) {
            config.workspace_markers = markers;
        }

        config.skip_hidden_dirs = env::var("PROJECTSCAN_SKIP_HIDDEN")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(DEFAULT_SKIP_HIDDEN);

        config.follow_symlinks = env::var("PROJECTSCAN_FOLLOW_SYMLINKS")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(DEFAULT_FOLLOW_SYMLINKS);

        config
    }

    /// Adds directory names to the exclusion list, ignoring duplicates
    pub fn with_excluded_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.excluded_dirs.contains(&name) {
                self.excluded_dirs.push(name);
            }
        }
        self
    }

    /// Validates the configuration
    ///
    /// Every configured name must be a single path component, the marker
    /// list must not be empty, and every orchestrator pattern must compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_names("excluded_dirs", &self.excluded_dirs)?;
        check_names("workspace_markers", &self.workspace_markers)?;
        check_name("node.manifest", &self.node.manifest)?;
        for rule in &self.node.lockfiles {
            check_name("node.lockfiles", &rule.file)?;
        }
        for evidence in &self.python.evidence {
            check_name("python.evidence", evidence.file())?;
        }
        check_names("dotnet.entry_points", &self.dotnet.entry_points)?;

        if self.workspace_markers.is_empty() {
            return Err(ConfigError::EmptyList("workspace_markers".to_string()));
        }
        if self.dotnet.project_extensions.is_empty() {
            return Err(ConfigError::EmptyList("dotnet.project_extensions".to_string()));
        }
        for ext in &self.dotnet.project_extensions {
            check_name("dotnet.project_extensions", ext.trim_start_matches('.'))?;
        }

        self.compile_orchestrator_patterns()?;

        Ok(())
    }

    pub fn compile_orchestrator_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.dotnet
            .orchestrator_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    error: e.to_string(),
                })
            })
            .collect()
    }

    /// True when a directory called `name` must not be descended into
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        if self.skip_hidden_dirs && name.starts_with('.') && name != "." && name != ".." {
            return true;
        }
        self.excluded_dirs.iter().any(|excluded| excluded == name)
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "projectscan Configuration:")?;
        writeln!(f, "  Excluded Dirs: {}", self.excluded_dirs.join(", "))?;
        writeln!(f, "  Skip Hidden Dirs: {}", self.skip_hidden_dirs)?;
        writeln!(f, "  Follow Symlinks: {}", self.follow_symlinks)?;
        writeln!(f, "  Workspace Markers: {}", self.workspace_markers.join(", "))?;
        Ok(())
    }
}

fn check_names(field: &str, names: &[String]) -> Result<(), ConfigError> {
    names.iter().try_for_each(|name| check_name(field, name))
}

fn check_name(field: &str, name: &str) -> Result<(), ConfigError> {
    let invalid = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name == "."
        || name == "..";
    if invalid {
        return Err(ConfigError::InvalidName {
            field: field.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
