//! De-duplication of classifier hits into per-ecosystem lists

use crate::detection::types::{DetectedProjects, Ecosystem, Project};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::trace;

/// Collects classifier hits in walk order, keeping the first hit per `(dir, ecosystem)`
#[derive(Debug, Default)]
pub struct ResultAggregator {
    seen: HashSet<(PathBuf, Ecosystem)>,
    projects: DetectedProjects,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit. Returns false when the project was already recorded.
    pub fn record(&mut self, project: Project) -> bool {
        if !self.seen.insert((project.dir.clone(), project.ecosystem)) {
            trace!(dir = %project.dir.display(), ecosystem = %project.ecosystem, "Duplicate project ignored");
            return false;
        }
        self.projects.list_mut(project.ecosystem).push(project);
        true
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn finish(self) -> DetectedProjects {
        self.projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::PackageManager;

    fn project(dir: &str, ecosystem: Ecosystem, pm: PackageManager) -> Project {
        Project::new(
            PathBuf::from(dir),
            PathBuf::from(dir).join("manifest"),
            ecosystem,
            pm,
        )
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut aggregator = ResultAggregator::new();

        assert!(aggregator.record(project("/ws/web", Ecosystem::Node, PackageManager::Npm)));
        assert!(!aggregator.record(project("/ws/web", Ecosystem::Node, PackageManager::Yarn)));

        let projects = aggregator.finish();
        assert_eq!(projects.node.len(), 1);
        assert_eq!(projects.node[0].package_manager, PackageManager::Npm);
    }

    #[test]
    fn test_same_dir_different_ecosystems_kept() {
        let mut aggregator = ResultAggregator::new();
        aggregator.record(project("/ws/mixed", Ecosystem::Node, PackageManager::Unknown));
        aggregator.record(project("/ws/mixed", Ecosystem::Python, PackageManager::Pip));

        assert_eq!(aggregator.len(), 2);
        let projects = aggregator.finish();
        assert_eq!(projects.node.len(), 1);
        assert_eq!(projects.python.len(), 1);
    }

    #[test]
    fn test_order_preserved() {
        let mut aggregator = ResultAggregator::new();
        for dir in ["/ws/b", "/ws/a", "/ws/c"] {
            aggregator.record(project(dir, Ecosystem::Python, PackageManager::Pip));
        }

        let dirs: Vec<PathBuf> = aggregator.finish().python.into_iter().map(|p| p.dir).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/ws/b"),
                PathBuf::from("/ws/a"),
                PathBuf::from("/ws/c")
            ]
        );
    }

    #[test]
    fn test_empty() {
        let aggregator = ResultAggregator::new();
        assert!(aggregator.is_empty());
        assert!(aggregator.finish().is_empty());
    }
}
