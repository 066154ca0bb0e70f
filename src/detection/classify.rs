//! Per-directory manifest classification
//!
//! Each classifier looks at a single [`DirListing`] and decides whether the
//! directory is a project root for its ecosystem. The set is closed: Node,
//! Python and Dotnet, where a Dotnet hit may be refined into an AppHost.

use crate::config::{DetectorConfig, PythonEvidence};
use crate::detection::error::ScanError;
use crate::detection::types::{DirListing, Ecosystem, PackageManager, Project};
use crate::fs::FileSystem;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, trace};
use toml::Value;

pub struct ManifestClassifiers {
    fs: Arc<dyn FileSystem>,
    config: Arc<DetectorConfig>,
    orchestrator_patterns: Vec<Regex>,
}

impl ManifestClassifiers {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<DetectorConfig>) -> Result<Self, ScanError> {
        let orchestrator_patterns = config.compile_orchestrator_patterns()?;
        Ok(Self {
            fs,
            config,
            orchestrator_patterns,
        })
    }

    /// All hits for one directory, in Node, Python, Dotnet/AppHost order
    pub fn classify(&self, listing: &DirListing) -> Vec<Project> {
        [
            self.classify_node(listing),
            self.classify_python(listing),
            self.classify_dotnet(listing),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn classify_node(&self, listing: &DirListing) -> Option<Project> {
        let rules = &self.config.node;
        if !listing.has_file(&rules.manifest) {
            return None;
        }

        let package_manager = rules
            .lockfiles
            .iter()
            .find(|rule| listing.has_file(&rule.file))
            .map(|rule| rule.package_manager)
            .unwrap_or(PackageManager::Unknown);

        trace!(dir = %listing.dir.display(), %package_manager, "Node manifest found");

        Some(Project::new(
            listing.dir.clone(),
            listing.path_of(&rules.manifest),
            Ecosystem::Node,
            package_manager,
        ))
    }

    pub fn classify_python(&self, listing: &DirListing) -> Option<Project> {
        let evidence = self
            .config
            .python
            .evidence
            .iter()
            .find(|evidence| listing.has_file(evidence.file()))?;

        let manifest_path = listing.path_of(evidence.file());
        let package_manager = match evidence {
            PythonEvidence::Marker {
                package_manager, ..
            } => *package_manager,
            PythonEvidence::PyProject { .. } => self.inspect_pyproject(&manifest_path),
        };

        trace!(dir = %listing.dir.display(), %package_manager, "Python evidence found");

        Some(Project::new(
            listing.dir.clone(),
            manifest_path,
            Ecosystem::Python,
            package_manager,
        ))
    }

    pub fn classify_dotnet(&self, listing: &DirListing) -> Option<Project> {
        let project_file = listing
            .files_with_extension(&self.config.dotnet.project_extensions)
            .next()?;
        let manifest_path = listing.path_of(project_file);

        let ecosystem = if self.has_orchestrator_entry_point(listing) {
            Ecosystem::AppHost
        } else {
            Ecosystem::Dotnet
        };

        trace!(dir = %listing.dir.display(), %ecosystem, "Dotnet project file found");

        Some(Project::new(
            listing.dir.clone(),
            manifest_path,
            ecosystem,
            PackageManager::Dotnet,
        ))
    }

    fn has_orchestrator_entry_point(&self, listing: &DirListing) -> bool {
        self.config
            .dotnet
            .entry_points
            .iter()
            .filter(|name| listing.has_file(name))
            .any(|name| {
                let path = listing.path_of(name);
                match self.fs.read_to_string(&path) {
                    Ok(content) => self.orchestrator_patterns.iter().any(|re| re.is_match(&content)),
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Unreadable entry point");
                        false
                    }
                }
            })
    }

    fn inspect_pyproject(&self, path: &std::path::Path) -> PackageManager {
        let content = match self.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable pyproject.toml");
                return PackageManager::Unknown;
            }
        };

        let value: Value = match toml::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unparseable pyproject.toml");
                return PackageManager::Unknown;
            }
        };

        let tool = value.get("tool").and_then(|t| t.as_table());
        match tool {
            Some(tool) if tool.contains_key("poetry") => PackageManager::Poetry,
            Some(tool) if tool.contains_key("uv") => PackageManager::Uv,
            _ => PackageManager::Pip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::{EntryKind, ListingEntry};
    use crate::fs::MockFileSystem;
    use std::path::{Path, PathBuf};

    fn classifiers(fs: MockFileSystem) -> ManifestClassifiers {
        ManifestClassifiers::new(Arc::new(fs), Arc::new(DetectorConfig::default())).unwrap()
    }

    fn listing(dir: &str, files: &[&str]) -> DirListing {
        DirListing::new(
            PathBuf::from(dir),
            files
                .iter()
                .map(|name| ListingEntry {
                    name: name.to_string(),
                    kind: EntryKind::File,
                })
                .collect(),
        )
    }

    #[test]
    fn test_node_without_lockfile_is_unknown() {
        let c = classifiers(MockFileSystem::new());
        let project = c
            .classify_node(&listing("/mock/web", &["package.json"]))
            .unwrap();

        assert_eq!(project.package_manager, PackageManager::Unknown);
        assert_eq!(project.manifest_path, Path::new("/mock/web/package.json"));
    }

    #[test]
    fn test_lockfile_without_manifest_is_not_node() {
        let c = classifiers(MockFileSystem::new());
        assert!(c.classify_node(&listing("/mock", &["yarn.lock"])).is_none());
    }

    #[test]
    fn test_python_requirements() {
        let c = classifiers(MockFileSystem::new());
        let project = c
            .classify_python(&listing("/mock/api", &["requirements.txt", "app.py"]))
            .unwrap();

        assert_eq!(project.ecosystem, Ecosystem::Python);
        assert_eq!(project.package_manager, PackageManager::Pip);
        assert_eq!(project.manifest_path, Path::new("/mock/api/requirements.txt"));
    }

    #[test]
    fn test_pyproject_tool_tables() {
        let fs = MockFileSystem::new();
        fs.add_file("poetry/pyproject.toml", "[tool.poetry]\nname = \"svc\"\n");
        fs.add_file("uv/pyproject.toml", "[project]\nname = \"svc\"\n\n[tool.uv]\ndev-dependencies = []\n");
        fs.add_file("plain/pyproject.toml", "[project]\nname = \"svc\"\n");
        fs.add_file("broken/pyproject.toml", "[project\nname = ");
        let c = classifiers(fs);

        let pm = |dir: &str| {
            c.classify_python(&listing(dir, &["pyproject.toml"]))
                .unwrap()
                .package_manager
        };

        assert_eq!(pm("/mock/poetry"), PackageManager::Poetry);
        assert_eq!(pm("/mock/uv"), PackageManager::Uv);
        assert_eq!(pm("/mock/plain"), PackageManager::Pip);
        assert_eq!(pm("/mock/broken"), PackageManager::Unknown);
    }

    #[test]
    fn test_lockfile_beats_pyproject() {
        let c = classifiers(MockFileSystem::new());
        let project = c
            .classify_python(&listing("/mock/svc", &["pyproject.toml", "uv.lock"]))
            .unwrap();

        assert_eq!(project.package_manager, PackageManager::Uv);
        assert_eq!(project.manifest_path, Path::new("/mock/svc/uv.lock"));
    }

    #[test]
    fn test_dotnet_first_project_file_wins() {
        let c = classifiers(MockFileSystem::new());
        let project = c
            .classify_dotnet(&listing("/mock/svc", &["Zeta.fsproj", "Alpha.csproj"]))
            .unwrap();

        assert_eq!(project.ecosystem, Ecosystem::Dotnet);
        assert_eq!(project.manifest_path, Path::new("/mock/svc/Alpha.csproj"));
        assert_eq!(project.package_manager, PackageManager::Dotnet);
    }

    #[test]
    fn test_apphost_requires_orchestrator_evidence() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "AppHost/Program.cs",
            "var builder = DistributedApplication.CreateBuilder(args);\nbuilder.Build().Run();\n",
        );
        fs.add_file("Api/Program.cs", "var app = WebApplication.CreateBuilder(args).Build();\n");
        let c = classifiers(fs);

        let host = c
            .classify_dotnet(&listing("/mock/AppHost", &["AppHost.csproj", "Program.cs"]))
            .unwrap();
        let api = c
            .classify_dotnet(&listing("/mock/Api", &["Api.csproj", "Program.cs"]))
            .unwrap();

        assert_eq!(host.ecosystem, Ecosystem::AppHost);
        assert_eq!(host.manifest_path, Path::new("/mock/AppHost/AppHost.csproj"));
        assert_eq!(api.ecosystem, Ecosystem::Dotnet);
    }

    #[test]
    fn test_apphost_entry_point_without_project_file() {
        let fs = MockFileSystem::new();
        fs.add_file("host/AppHost.cs", "DistributedApplication.CreateBuilder(args);");
        let c = classifiers(fs);

        assert!(c.classify_dotnet(&listing("/mock/host", &["AppHost.cs"])).is_none());
    }

    #[test]
    fn test_polyglot_directory_reported_per_ecosystem() {
        let c = classifiers(MockFileSystem::new());
        let hits = c.classify(&listing(
            "/mock/mixed",
            &["package.json", "requirements.txt", "Mixed.csproj"],
        ));

        let ecosystems: Vec<Ecosystem> = hits.iter().map(|p| p.ecosystem).collect();
        assert_eq!(
            ecosystems,
            vec![Ecosystem::Node, Ecosystem::Python, Ecosystem::Dotnet]
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = DetectorConfig::default();
        config.dotnet.orchestrator_patterns = vec!["(".to_string()];

        let result = ManifestClassifiers::new(Arc::new(MockFileSystem::new()), Arc::new(config));
        assert!(matches!(result, Err(ScanError::Config(_))));
    }
}
