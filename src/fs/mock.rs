use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
    pub target: Option<PathBuf>,
    pub readable: bool,
}

impl MockEntry {
    fn dir() -> Self {
        Self {
            content: None,
            file_type: FileType::Directory,
            target: None,
            readable: true,
        }
    }
}

/// In-memory file system for tests, including symlinks and unreadable directories
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(HashMap::new()),
            root,
        };
        let root = fs.root.clone();
        fs.insert(&root, MockEntry::dir());
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        self.insert(
            &path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
                target: None,
                readable: true,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.insert(&path, MockEntry::dir());
    }

    /// Adds a directory whose listing fails with a permission error
    pub fn add_unreadable_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.insert(
            &path,
            MockEntry {
                readable: false,
                ..MockEntry::dir()
            },
        );
    }

    /// Adds a symlink at `path`; a relative `target` is resolved against the link's parent
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let target = target.as_ref();
        let target = if target.is_absolute() {
            target.to_path_buf()
        } else {
            path.parent().unwrap_or(&self.root).join(target)
        };
        self.insert(
            &path,
            MockEntry {
                content: None,
                file_type: FileType::Symlink,
                target: Some(normalize_lexically(&target)),
                readable: true,
            },
        );
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut files = self.files.write().unwrap();
        if let Some(parent) = path.parent() {
            ensure_parents(&mut files, parent);
        }
        files.insert(path.to_path_buf(), entry);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_lexically(path)
        } else {
            normalize_lexically(&self.root.join(path))
        }
    }

    /// Follows symlinks in every component of `path`
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let files = self.files.read().unwrap();
        let mut pending = self.normalize_path(path);

        for _ in 0..=MAX_SYMLINK_HOPS {
            match follow_first_symlink(&files, &pending)? {
                Step::Resolved(resolved) => return Some(resolved),
                Step::Redirect(next) => pending = next,
            }
        }

        None
    }

    fn resolved_entry(&self, path: &Path) -> Option<MockEntry> {
        let resolved = self.resolve(path)?;
        self.files.read().unwrap().get(&resolved).cloned()
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolved_entry(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolved_entry(path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolved_entry(path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entry = self
            .resolved_entry(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let requested = self.normalize_path(path);
        let resolved = self
            .resolve(&requested)
            .ok_or_else(|| anyhow!("Directory not found: {:?}", path))?;
        let files = self.files.read().unwrap();

        let entry = files
            .get(&resolved)
            .ok_or_else(|| anyhow!("Directory not found: {:?}", path))?;
        if entry.file_type != FileType::Directory {
            return Err(anyhow!("Not a directory: {:?}", path));
        }
        if !entry.readable {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        let mut entries = Vec::new();
        for (file_path, entry) in files.iter() {
            if file_path.parent() == Some(resolved.as_path()) && file_path != &resolved {
                let name = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();

                entries.push(DirEntry {
                    path: requested.join(&name),
                    name,
                    file_type: entry.file_type,
                });
            }
        }

        Ok(entries)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))
    }
}

enum Step {
    Resolved(PathBuf),
    Redirect(PathBuf),
}

fn follow_first_symlink(files: &HashMap<PathBuf, MockEntry>, path: &Path) -> Option<Step> {
    let mut current = PathBuf::new();
    let mut components = path.components();

    while let Some(component) = components.next() {
        current.push(component);
        let entry = files.get(&current)?;
        if entry.file_type == FileType::Symlink {
            let mut next = entry.target.clone()?;
            next.push(components.as_path());
            return Some(Step::Redirect(normalize_lexically(&next)));
        }
    }

    Some(Step::Resolved(current))
}

fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        files.entry(current.clone()).or_insert_with(MockEntry::dir);
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
