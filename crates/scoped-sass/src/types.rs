//! Core scoped-compilation types.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The request flows through these in order:
//! - ScopeSpec: one named variable-override set, as configured
//! - ValidatedScope: a spec whose variable files were resolved and exist
//! - CompiledScope: one compiler run for one scope
//! - MergeResult: the single merged stylesheet handed back to the caller

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ScopeDiagnostic;

/// Variable file reference of a scope: one path or an ordered list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopePath {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for ScopePath {
    fn default() -> Self {
        ScopePath::Single(String::new())
    }
}

impl From<&str> for ScopePath {
    fn from(path: &str) -> Self {
        ScopePath::Single(path.to_string())
    }
}

impl From<Vec<String>> for ScopePath {
    fn from(paths: Vec<String>) -> Self {
        ScopePath::Multiple(paths)
    }
}

/// A named set of variable overrides.
///
/// Missing fields deserialize to empty values so that validation, not
/// deserialization, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpec {
    /// Class name prepended to every selector of this scope's copy
    #[serde(default, alias = "scopeName", alias = "scope-name", alias = "name")]
    pub scope_name: String,

    /// Variable file(s) holding this scope's overrides
    #[serde(default)]
    pub path: ScopePath,
}

impl ScopeSpec {
    pub fn new(scope_name: impl Into<String>, path: impl Into<ScopePath>) -> Self {
        Self {
            scope_name: scope_name.into(),
            path: path.into(),
        }
    }
}

/// A scope whose variable files all exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedScope {
    /// Empty for the unscoped fallback
    pub scope_name: String,

    /// Resolved variable files, in declaration order
    pub variable_paths: Vec<PathBuf>,
}

impl ValidatedScope {
    pub fn new(scope_name: impl Into<String>, variable_paths: Vec<PathBuf>) -> Self {
        Self {
            scope_name: scope_name.into(),
            variable_paths,
        }
    }

    /// The "compile once, no scoping" fallback used when no valid scope is configured.
    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn is_unscoped(&self) -> bool {
        self.scope_name.is_empty()
    }
}

/// Outcome of scope validation: the scopes to compile plus what was wrong
/// with the ones that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeValidation {
    /// Never empty; holds the unscoped fallback when nothing survived
    pub scopes: Vec<ValidatedScope>,
    pub diagnostics: Vec<ScopeDiagnostic>,
}

impl ScopeValidation {
    pub fn is_fallback(&self) -> bool {
        self.scopes.len() == 1 && self.scopes[0].is_unscoped()
    }
}

/// One scope's compiler output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledScope {
    pub scope_name: String,
    pub css: String,
    pub source_map: Option<Vec<u8>>,

    /// The scope's own variable files
    pub variable_paths: Vec<PathBuf>,

    /// Files the compiler read while resolving imports
    pub included_files: Vec<PathBuf>,
}

/// The merged stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub css: String,

    /// First scope's source map; scoping is not reflected in its positions
    pub source_map: Option<Vec<u8>>,

    /// Every scope's variable files, then the first scope's included files.
    /// Not deduplicated.
    pub dependencies: Vec<PathBuf>,

    /// Non-fatal diagnostics gathered along the way
    pub diagnostics: Vec<ScopeDiagnostic>,
}
