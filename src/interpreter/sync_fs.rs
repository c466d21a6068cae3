//! Synchronous filesystem facade used by the evaluator.
//!
//! The public capability (`crate::fs::FileSystem`) is async so embedders can
//! back it with real I/O. The evaluator itself, though, is a plain
//! recursive-descent walk, single-threaded with no interleaving observable
//! within one `exec`, which is far simpler to write against a synchronous
//! interface. `SyncFsAdapter` bridges the two with `block_in_place` +
//! `Handle::block_on`.

use std::sync::Arc;
use std::time::SystemTime;

use crate::fs::{FileSystem as AsyncFileSystem, MkdirOptions};

#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub size: u64,
    pub mtime: SystemTime,
}

pub trait SyncFs {
    fn read_file(&self, path: &str) -> Result<String, String>;
    fn write_file(&self, path: &str, contents: &str) -> Result<(), String>;
    fn append_file(&self, path: &str, contents: &str) -> Result<(), String>;
    fn exists(&self, path: &str) -> bool;
    fn stat(&self, path: &str) -> Result<FileStat, String>;
    fn read_dir(&self, path: &str) -> Result<Vec<String>, String>;
    fn mkdir(&self, path: &str, recursive: bool) -> Result<(), String>;
    fn resolve_path(&self, base: &str, path: &str) -> String;
}

pub struct SyncFsAdapter {
    inner: Arc<dyn AsyncFileSystem>,
    handle: tokio::runtime::Handle,
}

impl SyncFsAdapter {
    pub fn new(inner: Arc<dyn AsyncFileSystem>, handle: tokio::runtime::Handle) -> Self {
        Self { inner, handle }
    }

    fn block_on<F: std::future::Future>(&self, f: F) -> F::Output {
        tokio::task::block_in_place(|| self.handle.block_on(f))
    }
}

impl SyncFs for SyncFsAdapter {
    fn read_file(&self, path: &str) -> Result<String, String> {
        self.block_on(self.inner.read_file(path)).map_err(|e| e.to_string())
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<(), String> {
        self.block_on(self.inner.write_file(path, contents)).map_err(|e| e.to_string())
    }

    fn append_file(&self, path: &str, contents: &str) -> Result<(), String> {
        self.block_on(self.inner.append_file(path, contents)).map_err(|e| e.to_string())
    }

    fn exists(&self, path: &str) -> bool {
        self.block_on(self.inner.exists(path))
    }

    fn stat(&self, path: &str) -> Result<FileStat, String> {
        let s = self.block_on(self.inner.stat(path)).map_err(|e| e.to_string())?;
        Ok(FileStat { is_file: s.is_file, is_dir: s.is_directory, size: s.size, mtime: s.mtime })
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>, String> {
        self.block_on(self.inner.readdir(path)).map_err(|e| e.to_string())
    }

    fn mkdir(&self, path: &str, recursive: bool) -> Result<(), String> {
        self.block_on(self.inner.mkdir(path, &MkdirOptions { recursive })).map_err(|e| e.to_string())
    }

    fn resolve_path(&self, base: &str, path: &str) -> String {
        self.inner.resolve_path(base, path)
    }
}
