//! Virtual Filesystem Types
//!
//! The shell core never touches the host filesystem. Everything it needs —
//! path resolution, stat, read, write, directory listing — is expressed as
//! the `FileSystem` capability, so embedders can swap in whatever storage
//! they like (pure in-memory, copy-on-write overlay, ...).

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised by a `FileSystem` implementation.
#[derive(Error, Debug, Clone)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("ENOTEMPTY: directory not empty, {operation} '{path}'")]
    NotEmpty { path: String, operation: String },

    #[error("{message}")]
    Other { message: String },
}

/// A filesystem entry: either a file's bytes or a directory marker.
#[derive(Debug, Clone)]
pub enum FsEntry {
    File { content: Vec<u8>, mtime: SystemTime },
    Directory { mtime: SystemTime },
}

impl FsEntry {
    pub fn is_file(&self) -> bool {
        matches!(self, FsEntry::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FsEntry::Directory { .. })
    }
}

/// Result of `stat`.
#[derive(Debug, Clone, Copy)]
pub struct FsStat {
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
    pub mtime: SystemTime,
}

/// Options for `mkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MkdirOptions {
    pub recursive: bool,
}

/// Initial tree passed to `BashOptions`/`Bash::new`: absolute path -> text
/// content. Parent directories are created implicitly.
pub type InitialFiles = HashMap<String, String>;

/// The filesystem capability consumed by the shell core.
///
/// All methods are `async` so that implementations backed by real I/O (or by
/// a remote store) can be plugged in without changing the shell; the
/// in-memory implementation shipped here resolves every future immediately.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a file's contents as UTF-8, lossily if necessary.
    async fn read_file(&self, path: &str) -> Result<String, FsError>;

    /// Write `content`, truncating any existing file and creating parent
    /// directories implicitly (bash's `>` redirection semantics).
    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError>;

    /// Append `content` to a file, creating it if absent.
    async fn append_file(&self, path: &str, content: &str) -> Result<(), FsError>;

    /// Whether a path (file or directory) exists.
    async fn exists(&self, path: &str) -> bool;

    /// Stat a path.
    async fn stat(&self, path: &str) -> Result<FsStat, FsError>;

    /// Create a directory, optionally creating parents.
    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError>;

    /// List the basenames of a directory's immediate children, in no
    /// particular order — callers sort as needed.
    async fn readdir(&self, path: &str) -> Result<Vec<String>, FsError>;

    /// Remove a file, or a directory (recursively if requested).
    async fn rm(&self, path: &str, recursive: bool) -> Result<(), FsError>;

    /// Resolve `path` against `base` and normalize it: always absolute, no
    /// `.`, `..`, or trailing `/` (except the root itself).
    fn resolve_path(&self, base: &str, path: &str) -> String;
}

/// Normalize a path: collapse `.`/`..` components and ensure a leading `/`.
/// Pure string manipulation; shared by `resolve_path` implementations.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    let parts: Vec<&str> = normalized
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    let mut resolved: Vec<&str> = Vec::new();
    for part in parts {
        if part == ".." {
            resolved.pop();
        } else {
            resolved.push(part);
        }
    }
    if resolved.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", resolved.join("/"))
    }
}
