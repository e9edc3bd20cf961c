/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Native runtime: full read access through std::fs, grass on the tokio
 * blocking pool.
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::sass_native::{FileSource, compile_scss};
use crate::traits::{PathKind, RuntimeError, RuntimeResult, SassOutput, SystemRuntime};

/// Runtime with direct access to the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemRuntime for NativeRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        Ok(match kind {
            None => path.exists(),
            Some(PathKind::File) => path.is_file(),
            Some(PathKind::Directory) => path.is_dir(),
        })
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(std::env::current_dir()?)
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
        let scss = scss.to_string();
        let load_paths = load_paths.to_vec();

        tokio::task::spawn_blocking(move || {
            compile_scss(FileSource::Disk, &scss, &load_paths, minified)
        })
        .await
        .map_err(|e| RuntimeError::TaskFailed(e.to_string()))?
    }
}
