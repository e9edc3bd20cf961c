/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the SystemRuntime trait and supporting types for the runtime abstraction layer.
 *
 * The scoped compiler only ever needs two capabilities from its environment:
 * - read-only file access (existence checks and reads of variable files)
 * - a SASS compiler that reports the files it pulled in
 *
 * Implementations:
 * - NativeRuntime: std filesystem + grass
 * - MemoryRuntime: in-memory virtual filesystem + grass
 */

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),

    /// Operation not supported on this runtime
    NotSupported(String),

    /// SASS compilation failed
    Sass(CompileError),

    /// A blocking compile task panicked or was cancelled
    TaskFailed(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
            RuntimeError::NotSupported(msg) => write!(f, "Operation not supported: {}", msg),
            RuntimeError::Sass(e) => write!(f, "SASS compilation error: {}", e),
            RuntimeError::TaskFailed(msg) => write!(f, "Compile task failed: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            RuntimeError::Sass(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

impl From<CompileError> for RuntimeError {
    fn from(e: CompileError) -> Self {
        RuntimeError::Sass(e)
    }
}

/// A compiler rejection with whatever location the compiler reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// First line of the compiler's message, without the `Error:` prefix
    pub message: String,
    /// File the error was reported in (`None` for the root stylesheet)
    pub file: Option<String>,
    /// 1-based line
    pub line: Option<usize>,
    /// 1-based column
    pub column: Option<usize>,
}

impl CompileError {
    /// Create an error with no location information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => write!(f, " ({}:{}:{})", file, line, column),
            (None, Some(line), Some(column)) => write!(f, " (line {}, column {})", line, column),
            (Some(file), _, _) => write!(f, " ({})", file),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for CompileError {}

/// Type of filesystem path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Output of one SASS compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SassOutput {
    /// Compiled CSS text
    pub css: String,

    /// Source map, when the compiler produces one (grass does not)
    pub source_map: Option<Vec<u8>>,

    /// Every file the compiler read while resolving `@use`/`@import`, in read order
    pub included_files: Vec<PathBuf>,
}

/// Trait defining the runtime operations the scoped compiler relies on.
///
/// File operations are synchronous; compilation is async so that several
/// compilations can be in flight at once.
#[async_trait]
pub trait SystemRuntime: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════
    // FILE OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in file: {}", e),
            ))
        })
    }

    /// Check if path exists, optionally filtering by type.
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool>;

    /// Check if path exists and is a file.
    fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::File))
    }

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::Directory))
    }

    /// Get current working directory.
    fn cwd(&self) -> RuntimeResult<PathBuf>;

    // ═══════════════════════════════════════════════════════════════════════
    // SASS COMPILATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Get the SASS compiler backend name (for diagnostics).
    fn sass_compiler_name(&self) -> Option<&'static str> {
        None
    }

    /// Compile SCSS source to CSS.
    ///
    /// # Arguments
    ///
    /// * `scss` - The SCSS source code to compile
    /// * `load_paths` - Directories to search for @use/@import resolution
    /// * `minified` - Whether to produce compressed output
    ///
    /// # Returns
    ///
    /// The compiled output on success, `RuntimeError::Sass` on compilation failure,
    /// or `RuntimeError::NotSupported` if SASS compilation is not available.
    async fn compile_sass(
        &self,
        scss: &str,
        load_paths: &[PathBuf],
        minified: bool,
    ) -> RuntimeResult<SassOutput> {
        let _ = (scss, load_paths, minified);
        Err(RuntimeError::NotSupported(
            "SASS compilation is not available on this runtime".to_string(),
        ))
    }
}
