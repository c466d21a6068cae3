//! Pure in-memory implementation of the `FileSystem` capability.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::*;

/// An in-memory virtual filesystem, keyed by normalized absolute path.
pub struct InMemoryFs {
    data: RwLock<HashMap<String, FsEntry>>,
}

impl InMemoryFs {
    /// An empty filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut data = HashMap::new();
        data.insert(
            "/".to_string(),
            FsEntry::Directory { mtime: SystemTime::now() },
        );
        Self { data: RwLock::new(data) }
    }

    /// Seed the tree from a flat map of absolute path -> text content.
    /// Intermediate directories are created implicitly.
    pub fn with_files(files: &InitialFiles) -> Self {
        let fs = Self::new();
        {
            let mut data = fs.data.blocking_write();
            for (path, content) in files {
                let normalized = normalize_path(path);
                ensure_parent_dirs(&mut data, &normalized);
                data.insert(
                    normalized,
                    FsEntry::File { content: content.as_bytes().to_vec(), mtime: SystemTime::now() },
                );
            }
        }
        fs
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Create every ancestor directory of `path` that doesn't already exist.
fn ensure_parent_dirs(data: &mut HashMap<String, FsEntry>, path: &str) {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return;
    }
    let mut current = String::new();
    for part in &parts[..parts.len() - 1] {
        current = format!("{}/{}", current, part);
        data.entry(current.clone())
            .or_insert(FsEntry::Directory { mtime: SystemTime::now() });
    }
}

fn parent_of(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    let idx = path.rfind('/')?;
    Some(if idx == 0 { "/".to_string() } else { path[..idx].to_string() })
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let data = self.data.read().await;
        match data.get(path) {
            Some(FsEntry::File { content, .. }) => Ok(String::from_utf8_lossy(content).into_owned()),
            Some(FsEntry::Directory { .. }) => Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: "read".to_string(),
            }),
            None => Err(FsError::NotFound { path: path.to_string(), operation: "read".to_string() }),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        if matches!(data.get(path), Some(FsEntry::Directory { .. })) {
            return Err(FsError::IsDirectory { path: path.to_string(), operation: "write".to_string() });
        }
        ensure_parent_dirs(&mut data, path);
        data.insert(
            path.to_string(),
            FsEntry::File { content: content.as_bytes().to_vec(), mtime: SystemTime::now() },
        );
        Ok(())
    }

    async fn append_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        if matches!(data.get(path), Some(FsEntry::Directory { .. })) {
            return Err(FsError::IsDirectory { path: path.to_string(), operation: "write".to_string() });
        }
        ensure_parent_dirs(&mut data, path);
        let mut bytes = match data.get(path) {
            Some(FsEntry::File { content, .. }) => content.clone(),
            _ => Vec::new(),
        };
        bytes.extend_from_slice(content.as_bytes());
        data.insert(path.to_string(), FsEntry::File { content: bytes, mtime: SystemTime::now() });
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.data.read().await.contains_key(path)
    }

    async fn stat(&self, path: &str) -> Result<FsStat, FsError> {
        let data = self.data.read().await;
        match data.get(path) {
            Some(FsEntry::File { content, mtime }) => Ok(FsStat {
                is_file: true,
                is_directory: false,
                size: content.len() as u64,
                mtime: *mtime,
            }),
            Some(FsEntry::Directory { mtime }) => Ok(FsStat {
                is_file: false,
                is_directory: true,
                size: 0,
                mtime: *mtime,
            }),
            None => Err(FsError::NotFound { path: path.to_string(), operation: "stat".to_string() }),
        }
    }

    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        if data.contains_key(path) {
            if options.recursive {
                return Ok(());
            }
            return Err(FsError::AlreadyExists { path: path.to_string(), operation: "mkdir".to_string() });
        }
        if options.recursive {
            ensure_parent_dirs(&mut data, path);
        } else if let Some(parent) = parent_of(path) {
            if !data.contains_key(&parent) {
                return Err(FsError::NotFound { path: parent, operation: "mkdir".to_string() });
            }
        }
        data.insert(path.to_string(), FsEntry::Directory { mtime: SystemTime::now() });
        Ok(())
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let data = self.data.read().await;
        match data.get(path) {
            Some(FsEntry::Directory { .. }) => {}
            Some(FsEntry::File { .. }) => {
                return Err(FsError::NotDirectory { path: path.to_string(), operation: "scandir".to_string() })
            }
            None => return Err(FsError::NotFound { path: path.to_string(), operation: "scandir".to_string() }),
        }
        let prefix = if path == "/" { "/".to_string() } else { format!("{}/", path) };
        let mut names = Vec::new();
        for key in data.keys() {
            if key == path {
                continue;
            }
            if let Some(rest) = key.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    names.push(rest.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn rm(&self, path: &str, recursive: bool) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        match data.get(path) {
            Some(FsEntry::Directory { .. }) => {
                let prefix = format!("{}/", path);
                let children: Vec<String> = data.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
                if !children.is_empty() && !recursive {
                    return Err(FsError::NotEmpty { path: path.to_string(), operation: "rmdir".to_string() });
                }
                for child in children {
                    data.remove(&child);
                }
                data.remove(path);
                Ok(())
            }
            Some(FsEntry::File { .. }) => {
                data.remove(path);
                Ok(())
            }
            None => Err(FsError::NotFound { path: path.to_string(), operation: "unlink".to_string() }),
        }
    }

    fn resolve_path(&self, base: &str, path: &str) -> String {
        if path.starts_with('/') {
            normalize_path(path)
        } else if base == "/" {
            normalize_path(&format!("/{}", path))
        } else {
            normalize_path(&format!("{}/{}", base, path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_files_and_parents() {
        let mut files = InitialFiles::new();
        files.insert("/project/README.md".to_string(), "hello".to_string());
        let fs = InMemoryFs::with_files(&files);
        assert!(fs.exists("/project").await);
        assert_eq!(fs.read_file("/project/README.md").await.unwrap(), "hello");
        let mut names = fs.readdir("/project").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["README.md".to_string()]);
    }

    #[tokio::test]
    async fn write_then_append() {
        let fs = InMemoryFs::new();
        fs.write_file("/a.txt", "one\n").await.unwrap();
        fs.append_file("/a.txt", "two\n").await.unwrap();
        assert_eq!(fs.read_file("/a.txt").await.unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn rm_rejects_nonempty_dir_without_recursive() {
        let mut files = InitialFiles::new();
        files.insert("/d/f.txt".to_string(), "x".to_string());
        let fs = InMemoryFs::with_files(&files);
        assert!(fs.rm("/d", false).await.is_err());
        assert!(fs.rm("/d", true).await.is_ok());
        assert!(!fs.exists("/d").await);
    }

    #[test]
    fn normalizes_dot_dot() {
        assert_eq!(normalize_path("/a/b/../c"), "/a/c");
        assert_eq!(normalize_path("/a/./b/"), "/a/b");
        assert_eq!(normalize_path(""), "/");
    }
}
