/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * In-memory runtime: a virtual filesystem plus grass compilation over it.
 *
 * Useful when the stylesheet and its variable files never touch the disk
 * (embedding in a bundler, tests).
 */

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::sass_native::{FileSource, compile_scss};
use crate::traits::{PathKind, RuntimeError, RuntimeResult, SassOutput, SystemRuntime};

/// Lexically normalize a path: drop `.` components and fold `..` into its parent.
///
/// No symlink resolution happens here; a leading `..` on a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Runtime backed by an immutable in-memory file map.
///
/// Relative paths are interpreted against `cwd` (default `/`).
#[derive(Debug, Clone)]
pub struct MemoryRuntime {
    files: Arc<BTreeMap<PathBuf, Vec<u8>>>,
    cwd: PathBuf,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self {
            files: Arc::new(BTreeMap::new()),
            cwd: PathBuf::from("/"),
        }
    }

    /// Add (or replace) a file.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        let key = self.resolve(path.as_ref());
        Arc::make_mut(&mut self.files).insert(key, contents.into());
        self
    }

    /// Set the working directory relative paths resolve against.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = normalize_path(&cwd.into());
        self
    }

    /// Number of files in the virtual filesystem.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.cwd.join(path))
        }
    }
}

#[async_trait]
impl SystemRuntime for MemoryRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files.get(&self.resolve(path)).cloned().ok_or_else(|| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No such file in memory runtime: {}", path.display()),
            ))
        })
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let path = self.resolve(path);
        let is_file = self.files.contains_key(&path);
        let is_dir = !is_file && self.files.keys().any(|p| p.starts_with(&path));
        Ok(match kind {
            None => is_file || is_dir,
            Some(PathKind::File) => is_file,
            Some(PathKind::Directory) => is_dir,
        })
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn sass_compiler_name(&self) -> Option<&'static str> {
        Some("grass")
    }

    async fn compile_sass(
        &self,
        scss: &str,
        load_paths: &[PathBuf],
        minified: bool,
    ) -> RuntimeResult<SassOutput> {
        let source = FileSource::Memory {
            files: Arc::clone(&self.files),
            cwd: self.cwd.clone(),
        };
        let scss = scss.to_string();
        let load_paths: Vec<PathBuf> = load_paths.iter().map(|p| self.resolve(p)).collect();

        tokio::task::spawn_blocking(move || compile_scss(source, &scss, &load_paths, minified))
            .await
            .map_err(|e| RuntimeError::TaskFailed(e.to_string()))?
    }
}
