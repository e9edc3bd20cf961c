//! SASS compilation using the grass crate.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This module provides SASS/SCSS compilation using grass, a pure Rust
//! implementation that targets dart-sass.
//!
//! Key components:
//! - `FileSource`: where grass reads files from (disk or a virtual filesystem)
//! - `TrackingFs`: adapter implementing `grass::Fs` that records every file read
//! - `compile_scss`: blocking compilation returning CSS plus included files

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use grass::{Options, OutputStyle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::memory::normalize_path;
use crate::traits::{CompileError, RuntimeError, RuntimeResult, SassOutput};

/// Trailing location line of a grass error, e.g. `  input.scss 3:14  root stylesheet`.
static ERROR_LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(\S+)\s+(\d+):(\d+)\s+root stylesheet\s*$").unwrap());

/// Backing store grass reads from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// The real filesystem via `std::fs`
    Disk,
    /// A virtual filesystem keyed by normalized absolute path. Relative paths
    /// resolve against `cwd`.
    Memory {
        files: Arc<BTreeMap<PathBuf, Vec<u8>>>,
        cwd: PathBuf,
    },
}

impl FileSource {
    /// Path under which `path` is looked up.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match self {
            FileSource::Disk => path.to_path_buf(),
            FileSource::Memory { cwd, .. } if path.is_relative() => normalize_path(&cwd.join(path)),
            FileSource::Memory { .. } => normalize_path(path),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self {
            FileSource::Disk => path.is_dir(),
            FileSource::Memory { files, .. } => {
                let dir = self.resolve(path);
                files.keys().any(|p| p != &dir && p.starts_with(&dir))
            }
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        match self {
            FileSource::Disk => path.is_file(),
            FileSource::Memory { files, .. } => files.contains_key(&self.resolve(path)),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self {
            FileSource::Disk => std::fs::read(path),
            FileSource::Memory { files, .. } => {
                files.get(&self.resolve(path)).cloned().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("File not found: {}", path.display()),
                    )
                })
            }
        }
    }
}

/// Adapter that implements `grass::Fs` and remembers what was read.
///
/// grass only calls `read` for files it actually loads, so the recorded list
/// is the compilation's dependency set (without duplicates, in first-read order).
/// Paths are recorded as the source resolves them.
#[derive(Debug)]
pub struct TrackingFs {
    source: FileSource,
    included: Mutex<Vec<PathBuf>>,
}

impl TrackingFs {
    pub fn new(source: FileSource) -> Self {
        Self {
            source,
            included: Mutex::new(Vec::new()),
        }
    }

    /// Files read so far.
    pub fn included_files(&self) -> Vec<PathBuf> {
        match self.included.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, path: &Path) {
        let mut files = match self.included.lock() {
            Ok(files) => files,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !files.iter().any(|p| p == path) {
            files.push(path.to_path_buf());
        }
    }
}

impl grass::Fs for TrackingFs {
    fn is_dir(&self, path: &Path) -> bool {
        self.source.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.source.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let contents = self.source.read(path)?;
        self.record(&self.source.resolve(path));
        Ok(contents)
    }
}

/// Compile SCSS source to CSS using grass.
///
/// This is blocking; async runtimes call it from `spawn_blocking`.
///
/// # Arguments
///
/// * `source` - Where `@use`/`@import` targets are read from
/// * `scss` - The SCSS source code to compile
/// * `load_paths` - Directories to search for @use/@import resolution
/// * `minified` - Whether to produce compressed output
pub fn compile_scss(
    source: FileSource,
    scss: &str,
    load_paths: &[PathBuf],
    minified: bool,
) -> RuntimeResult<SassOutput> {
    let fs = TrackingFs::new(source);

    let style = if minified {
        OutputStyle::Compressed
    } else {
        OutputStyle::Expanded
    };

    let options = Options::default()
        .fs(&fs)
        .load_paths(load_paths)
        .style(style);

    let css = grass::from_string(scss.to_string(), &options)
        .map_err(|e| RuntimeError::Sass(parse_compile_error(&e.to_string())))?;

    let included_files = fs.included_files();
    tracing::trace!(
        bytes = css.len(),
        included = included_files.len(),
        "grass compilation finished"
    );

    Ok(SassOutput {
        css,
        source_map: None,
        included_files,
    })
}

/// Turn a rendered grass error into a structured `CompileError`.
///
/// The headline becomes the message; the `<file> <line>:<col>  root stylesheet`
/// trailer, when present, becomes the location. `-` and `stdin` name the
/// in-memory root stylesheet and are reported as no file.
pub fn parse_compile_error(rendered: &str) -> CompileError {
    let headline = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown SASS error");
    let message = headline
        .strip_prefix("Error:")
        .map(str::trim)
        .unwrap_or(headline);

    let mut error = CompileError::new(message);
    if let Some(caps) = ERROR_LOCATION.captures_iter(rendered).last() {
        let file = &caps[1];
        if file != "-" && file != "stdin" {
            error.file = Some(file.to_string());
        }
        error.line = caps[2].parse().ok();
        error.column = caps[3].parse().ok();
    }
    error
}
