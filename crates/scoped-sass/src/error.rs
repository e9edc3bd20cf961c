//! Error types for scoped SASS compilation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Two families:
//! - [`ScopeDiagnostic`]: non-fatal, the offending scope is dropped (or kept
//!   with a warning) and compilation continues
//! - [`ScopedSassError`]: fatal for the whole request

use std::path::PathBuf;

use scoped_sass_runtime::{CompileError, RuntimeError};
use thiserror::Error;

/// Non-fatal problems found while reading or validating scope specs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeDiagnostic {
    /// Spec without a scope name
    #[error("scope #{index} has no scope name and was skipped")]
    MissingScopeName { index: usize },

    /// Spec without any variable file path
    #[error("scope `{scope_name}` has no variable file path and was skipped")]
    MissingPath { scope_name: String },

    /// Empty entry inside a path list
    #[error("scope `{scope_name}` has an empty entry at position {position} of its path list")]
    EmptyPathEntry { scope_name: String, position: usize },

    /// Variable file does not exist
    #[error("variable file for scope `{scope_name}` not found: {}", .path.display())]
    PathNotFound { scope_name: String, path: PathBuf },

    /// Same scope name used twice; both copies are kept
    #[error("scope name `{scope_name}` is used more than once")]
    DuplicateScopeName { scope_name: String },

    /// Configuration entry that is not a scope spec
    #[error("scope entry #{index} is invalid: {message}")]
    InvalidScopeEntry { index: usize, message: String },
}

impl ScopeDiagnostic {
    /// Whether the diagnostic caused its spec to be dropped.
    pub fn drops_scope(&self) -> bool {
        !matches!(self, ScopeDiagnostic::DuplicateScopeName { .. })
    }
}

/// One scope whose compilation failed.
#[derive(Debug)]
pub struct ScopeFailure {
    pub scope_name: String,
    pub error: RuntimeError,
}

impl ScopeFailure {
    /// The compiler's structured error, when the failure came from the compiler.
    pub fn compile_error(&self) -> Option<&CompileError> {
        match &self.error {
            RuntimeError::Sass(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors that abort a scoped compilation request.
#[derive(Debug, Error)]
pub enum ScopedSassError {
    /// A variable file could not be read
    #[error("failed to read variable file {} for scope `{scope_name}`: {source}", .path.display())]
    VariableFile {
        scope_name: String,
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// One or more scopes failed to compile. Failures are in scope order.
    #[error("{}", describe_failures(.failures))]
    Compilation { failures: Vec<ScopeFailure> },

    /// Scopes produced differently shaped CSS, so positions cannot be aligned
    #[error(
        "scope `{scope_name}` diverges from the first scope at rule {position}: expected `{expected}`, found `{found}`"
    )]
    StructuralMismatch {
        scope_name: String,
        position: usize,
        expected: String,
        found: String,
    },

    /// A compile task could not be joined
    #[error("compile task failed: {0}")]
    TaskFailed(String),

    /// Configuration could not be parsed
    #[error("invalid scope configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScopedSassError {
    /// The first failing scope of a `Compilation` error.
    pub fn first_failure(&self) -> Option<&ScopeFailure> {
        match self {
            ScopedSassError::Compilation { failures } => failures.first(),
            _ => None,
        }
    }
}

fn describe_failures(failures: &[ScopeFailure]) -> String {
    let Some(first) = failures.first() else {
        return "SASS compilation failed".to_string();
    };
    let scope = if first.scope_name.is_empty() {
        "SASS compilation failed".to_string()
    } else {
        format!("SASS compilation failed for scope `{}`", first.scope_name)
    };
    match failures.len() {
        1 => format!("{scope}: {}", first.error),
        n => format!("{scope}: {} ({} more scopes failed)", first.error, n - 1),
    }
}
