//! Variable override loading.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A scope's override text is the concatenation of its variable files, each
//! normalized so that its declarations are valid SCSS and always win:
//!
//! ```text
//! // base.less                    // theme.scss
//! @radius: 2px;                   $primary: blue !default;
//!
//! // override text
//! $radius: 2px;
//! $primary: blue;
//! ```
//!
//! The `@` → `$` rewrite is purely textual. An `@` inside a comment or a
//! string of a `.less` file is rewritten as well.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use scoped_sass_runtime::SystemRuntime;

use crate::error::ScopedSassError;

/// `!default` together with the whitespace in front of it.
static DEFAULT_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*!default\b").unwrap());

/// Variable syntax of an override file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableDialect {
    /// `$name: value;`
    Scss,
    /// `@name: value;`
    Less,
}

impl VariableDialect {
    /// Dialect from the file extension; anything but `.less` is SCSS.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("less") => VariableDialect::Less,
            _ => VariableDialect::Scss,
        }
    }
}

/// Normalize one variable file's text.
///
/// 1. `@`-dialect files have every `@` replaced by `$`.
/// 2. Every `!default` flag is removed so overrides apply unconditionally.
pub fn normalize_variables(text: &str, dialect: VariableDialect) -> String {
    let text = match dialect {
        VariableDialect::Less => Cow::Owned(text.replace('@', "$")),
        VariableDialect::Scss => Cow::Borrowed(text),
    };
    DEFAULT_FLAG.replace_all(&text, "").into_owned()
}

/// Load and normalize a scope's variable files, joined in order.
///
/// Returns the empty string when `paths` is empty (the unscoped fallback).
pub fn load_variables(
    runtime: &dyn SystemRuntime,
    scope_name: &str,
    paths: &[PathBuf],
) -> Result<String, ScopedSassError> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let text = runtime
            .file_read_string(path)
            .map_err(|source| ScopedSassError::VariableFile {
                scope_name: scope_name.to_string(),
                path: path.clone(),
                source,
            })?;
        parts.push(normalize_variables(&text, VariableDialect::from_path(path)));
    }
    Ok(parts.join("\n"))
}
