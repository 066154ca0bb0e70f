//! Core types for project detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Language/package-manager family a project belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Node,
    Python,
    Dotnet,
    /// Dotnet project acting as the orchestrator entry point for other services
    AppHost,
}

impl Ecosystem {
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Node,
            Ecosystem::Python,
            Ecosystem::Dotnet,
            Ecosystem::AppHost,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ecosystem::Node => "Node.js",
            Ecosystem::Python => "Python",
            Ecosystem::Dotnet => ".NET",
            Ecosystem::AppHost => ".NET AppHost",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
    Pip,
    Poetry,
    Uv,
    Pipenv,
    Dotnet,
    Unknown,
}

impl PackageManager {
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
            PackageManager::Pip => "pip",
            PackageManager::Poetry => "poetry",
            PackageManager::Uv => "uv",
            PackageManager::Pipenv => "pipenv",
            PackageManager::Dotnet => "dotnet",
            PackageManager::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "npm" => Some(PackageManager::Npm),
            "yarn" => Some(PackageManager::Yarn),
            "pnpm" => Some(PackageManager::Pnpm),
            "bun" => Some(PackageManager::Bun),
            "pip" => Some(PackageManager::Pip),
            "poetry" => Some(PackageManager::Poetry),
            "uv" => Some(PackageManager::Uv),
            "pipenv" => Some(PackageManager::Pipenv),
            "dotnet" => Some(PackageManager::Dotnet),
            "unknown" => Some(PackageManager::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A detected project. Identity is `(dir, ecosystem)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Absolute path to the project directory
    pub dir: PathBuf,
    /// Absolute path to the file that identified the project
    pub manifest_path: PathBuf,
    pub ecosystem: Ecosystem,
    pub package_manager: PackageManager,
}

impl Project {
    pub fn new(
        dir: PathBuf,
        manifest_path: PathBuf,
        ecosystem: Ecosystem,
        package_manager: PackageManager,
    ) -> Self {
        Self {
            dir,
            manifest_path,
            ecosystem,
            package_manager,
        }
    }

    pub fn identity(&self) -> (&Path, Ecosystem) {
        (&self.dir, self.ecosystem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// One directory's contents as seen by the classifiers, sorted by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub dir: PathBuf,
    pub entries: Vec<ListingEntry>,
}

impl DirListing {
    pub fn new(dir: PathBuf, mut entries: Vec<ListingEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self { dir, entries }
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == EntryKind::File && e.name == name)
    }

    /// Files whose extension matches one of `extensions` (leading dot optional, case-insensitive)
    pub fn files_with_extension<'a>(&'a self, extensions: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.name.as_str())
            .filter(move |name| {
                Path::new(name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        extensions
                            .iter()
                            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
                    })
                    .unwrap_or(false)
            })
    }

    pub fn subdirectories(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .map(|e| e.name.as_str())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Projects found by one scan, one ordered list per ecosystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedProjects {
    pub node: Vec<Project>,
    pub python: Vec<Project>,
    pub dotnet: Vec<Project>,
    pub app_host: Vec<Project>,
}

impl DetectedProjects {
    pub fn for_ecosystem(&self, ecosystem: Ecosystem) -> &[Project] {
        match ecosystem {
            Ecosystem::Node => &self.node,
            Ecosystem::Python => &self.python,
            Ecosystem::Dotnet => &self.dotnet,
            Ecosystem::AppHost => &self.app_host,
        }
    }

    pub(crate) fn list_mut(&mut self, ecosystem: Ecosystem) -> &mut Vec<Project> {
        match ecosystem {
            Ecosystem::Node => &mut self.node,
            Ecosystem::Python => &mut self.python,
            Ecosystem::Dotnet => &mut self.dotnet,
            Ecosystem::AppHost => &mut self.app_host,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        Ecosystem::all()
            .iter()
            .flat_map(move |e| self.for_ecosystem(*e).iter())
    }

    pub fn len(&self) -> usize {
        self.node.len() + self.python.len() + self.dotnet.len() + self.app_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> DirListing {
        DirListing::new(
            PathBuf::from("/ws/api"),
            vec![
                ListingEntry {
                    name: "requirements.txt".to_string(),
                    kind: EntryKind::File,
                },
                ListingEntry {
                    name: "Api.CSPROJ".to_string(),
                    kind: EntryKind::File,
                },
                ListingEntry {
                    name: "src".to_string(),
                    kind: EntryKind::Directory,
                },
                ListingEntry {
                    name: "App.csproj".to_string(),
                    kind: EntryKind::File,
                },
            ],
        )
    }

    #[test]
    fn test_listing_sorted_by_name() {
        let listing = listing();
        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Api.CSPROJ", "App.csproj", "requirements.txt", "src"]);
    }

    #[test]
    fn test_has_file_ignores_directories() {
        let listing = listing();
        assert!(listing.has_file("requirements.txt"));
        assert!(!listing.has_file("src"));
        assert!(!listing.has_file("package.json"));
    }

    #[test]
    fn test_files_with_extension() {
        let listing = listing();
        let extensions = vec![".csproj".to_string(), "fsproj".to_string()];
        let found: Vec<&str> = listing.files_with_extension(&extensions).collect();
        assert_eq!(found, vec!["Api.CSPROJ", "App.csproj"]);
    }

    #[test]
    fn test_subdirectories() {
        let listing = listing();
        assert_eq!(listing.subdirectories().collect::<Vec<_>>(), vec!["src"]);
    }

    #[test]
    fn test_package_manager_names() {
        assert_eq!(PackageManager::from_name("PNPM"), Some(PackageManager::Pnpm));
        assert_eq!(PackageManager::from_name("cargo"), None);
        assert_eq!(PackageManager::Uv.to_string(), "uv");
    }

    #[test]
    fn test_ecosystem_serializes_lowercase() {
        let json = serde_json::to_string(&Ecosystem::AppHost).unwrap();
        assert_eq!(json, "\"apphost\"");
    }

    #[test]
    fn test_detected_projects_iteration_order() {
        let mut projects = DetectedProjects::default();
        projects.app_host.push(Project::new(
            PathBuf::from("/ws/AppHost"),
            PathBuf::from("/ws/AppHost/AppHost.csproj"),
            Ecosystem::AppHost,
            PackageManager::Dotnet,
        ));
        projects.node.push(Project::new(
            PathBuf::from("/ws/web"),
            PathBuf::from("/ws/web/package.json"),
            Ecosystem::Node,
            PackageManager::Unknown,
        ));

        let ecosystems: Vec<Ecosystem> = projects.iter().map(|p| p.ecosystem).collect();
        assert_eq!(ecosystems, vec![Ecosystem::Node, Ecosystem::AppHost]);
        assert_eq!(projects.len(), 2);
        assert!(!projects.is_empty());
    }
}
