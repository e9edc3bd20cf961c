//! Compilation context: where relative paths resolve, which runtime does the
//! work, and the compiler options shared by every scope of a request.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scoped_sass_runtime::{NativeRuntime, SystemRuntime};

/// Environment for one scoped compilation request.
#[derive(Clone)]
pub struct ScopeContext {
    base_dir: PathBuf,
    runtime: Arc<dyn SystemRuntime>,
    load_paths: Vec<PathBuf>,
    minified: bool,
    verify_structure: bool,
}

impl std::fmt::Debug for ScopeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeContext")
            .field("base_dir", &self.base_dir)
            .field("runtime", &self.runtime.sass_compiler_name())
            .field("load_paths", &self.load_paths)
            .field("minified", &self.minified)
            .field("verify_structure", &self.verify_structure)
            .finish()
    }
}

impl ScopeContext {
    /// Create a context resolving relative variable paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, runtime: Arc<dyn SystemRuntime>) -> Self {
        Self {
            base_dir: base_dir.into(),
            runtime,
            load_paths: Vec::new(),
            minified: false,
            verify_structure: true,
        }
    }

    /// Context on the host filesystem.
    pub fn native(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, Arc::new(NativeRuntime::new()))
    }

    pub fn with_load_paths(mut self, load_paths: Vec<PathBuf>) -> Self {
        self.load_paths = load_paths;
        self
    }

    pub fn with_minified(mut self, minified: bool) -> Self {
        self.minified = minified;
        self
    }

    /// Toggle the cross-scope structural check done before merging.
    pub fn with_verify_structure(mut self, verify: bool) -> Self {
        self.verify_structure = verify;
        self
    }

    pub fn runtime(&self) -> &dyn SystemRuntime {
        self.runtime.as_ref()
    }

    /// Shared handle for handing the runtime to spawned tasks.
    pub fn shared_runtime(&self) -> Arc<dyn SystemRuntime> {
        Arc::clone(&self.runtime)
    }

    pub fn load_paths(&self) -> &[PathBuf] {
        &self.load_paths
    }

    pub fn minified(&self) -> bool {
        self.minified
    }

    pub fn verify_structure(&self) -> bool {
        self.verify_structure
    }

    /// Resolve a configured path against the base directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
