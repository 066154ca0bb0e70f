//! Workspace boundary checks
//!
//! Every directory the walker enters and every project the scanner reports
//! must be the scan root or lie beneath it. The check is lexical: callers are
//! expected to pass paths that have already been canonicalized (symlinks
//! resolved), which the walker does for symlinked entries.

use std::path::{Component, Path, PathBuf};

/// Decides whether paths belong to the tree anchored at one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryGuard {
    root: PathBuf,
}

impl BoundaryGuard {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn admits(&self, candidate: &Path) -> bool {
        admits(&self.root, candidate)
    }
}

/// Returns true when `candidate` is `root` or a descendant of it.
///
/// A candidate whose relative path cannot be computed (mixed absolute and
/// relative paths, different volumes) is rejected.
pub fn admits(root: &Path, candidate: &Path) -> bool {
    match relative_path(root, candidate) {
        Some(rel) => !matches!(rel.components().next(), Some(Component::ParentDir)),
        None => false,
    }
}

/// Lexical relative path from `root` to `candidate`.
///
/// Returns `"."` when both are the same path and a path starting with `..`
/// when `candidate` lies outside `root`. Returns `None` when no relative path
/// exists between the two.
pub fn relative_path(root: &Path, candidate: &Path) -> Option<PathBuf> {
    if root.is_absolute() != candidate.is_absolute() {
        return None;
    }

    let base = normalize(root);
    let target = normalize(candidate);

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let base_rest = &base[common..];
    let target_rest = &target[common..];

    if base_rest.iter().chain(target_rest.iter()).any(is_anchor) {
        return None;
    }
    // "../x" relative to "../y/z" would need to know what ".." names
    if base_rest.iter().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in base_rest {
        rel.push("..");
    }
    for component in target_rest {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }

    Some(rel)
}

fn is_anchor(component: &Component<'_>) -> bool {
    matches!(component, Component::Prefix(_) | Component::RootDir)
}

fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_admits_itself() {
        assert!(admits(Path::new("/ws"), Path::new("/ws")));
        assert_eq!(
            relative_path(Path::new("/ws"), Path::new("/ws")),
            Some(PathBuf::from("."))
        );
    }

    #[test]
    fn test_descendants_admitted() {
        assert!(admits(Path::new("/ws"), Path::new("/ws/service")));
        assert!(admits(Path::new("/ws"), Path::new("/ws/a/b/c")));
        assert_eq!(
            relative_path(Path::new("/ws"), Path::new("/ws/a/b")),
            Some(PathBuf::from("a/b"))
        );
    }

    #[test]
    fn test_siblings_and_parents_rejected() {
        assert!(!admits(Path::new("/tmp/workspace"), Path::new("/tmp/parent-project")));
        assert!(!admits(Path::new("/tmp/workspace"), Path::new("/tmp")));
        assert!(!admits(Path::new("/tmp/workspace"), Path::new("/")));
        assert_eq!(
            relative_path(Path::new("/tmp/workspace"), Path::new("/tmp/parent-project")),
            Some(PathBuf::from("../parent-project"))
        );
    }

    #[test]
    fn test_upward_then_downward_composition_rejected() {
        assert!(!admits(
            Path::new("/tmp/workspace"),
            Path::new("/tmp/workspace/../parent-project")
        ));
        assert!(admits(
            Path::new("/tmp/workspace"),
            Path::new("/tmp/workspace/service/../api")
        ));
    }

    #[test]
    fn test_prefix_sharing_names_are_not_descendants() {
        assert!(!admits(Path::new("/tmp/work"), Path::new("/tmp/workspace")));
    }

    #[test]
    fn test_dotdot_named_children_are_admitted() {
        assert!(admits(Path::new("/ws"), Path::new("/ws/..hidden")));
    }

    #[test]
    fn test_mixed_absolute_and_relative_rejected() {
        assert_eq!(relative_path(Path::new("/ws"), Path::new("ws/service")), None);
        assert!(!admits(Path::new("ws"), Path::new("/ws/service")));
    }

    #[test]
    fn test_relative_paths() {
        assert!(admits(Path::new("ws"), Path::new("ws/api")));
        assert!(admits(Path::new("./ws"), Path::new("ws/api")));
        assert!(!admits(Path::new("ws"), Path::new("other")));
        assert_eq!(relative_path(Path::new("../a"), Path::new("b")), None);
    }

    #[test]
    fn test_guard_struct() {
        let guard = BoundaryGuard::new("/ws");
        assert_eq!(guard.root(), Path::new("/ws"));
        assert!(guard.admits(Path::new("/ws/api")));
        assert!(!guard.admits(Path::new("/elsewhere")));
    }
}
