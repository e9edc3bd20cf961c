//! Scoped SASS compilation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Compiles one SCSS source once per variable scope and merges the outputs
//! into a single stylesheet in which every rule appears once per scope,
//! prefixed with that scope's class:
//!
//! ```text
//! .theme-default .btn { color: red; }
//! .theme-mauve .btn { color: blue; }
//! ```
//!
//! This crate provides:
//! - Scope types and YAML configuration extraction
//! - Scope validation with non-fatal diagnostics
//! - Variable override loading (`!default` stripping, `@` dialect)
//! - Concurrent per-scope compilation through a [`SystemRuntime`]
//! - Rule segmentation, selector scoping and the positional merge
//!
//! [`SystemRuntime`]: scoped_sass_runtime::SystemRuntime

mod compile;
mod config;
mod context;
mod error;
mod fragment;
mod merge;
mod selector;
mod types;
mod validate;
mod variables;

pub use compile::{compile_all, compile_scoped, scope_input};
pub use config::ScopeConfig;
pub use context::ScopeContext;
pub use error::{ScopeDiagnostic, ScopeFailure, ScopedSassError};
pub use fragment::{RuleFragment, segment};
pub use merge::{MergeOptions, merge_scopes};
pub use selector::scope_fragment;
pub use types::{
    CompiledScope, MergeResult, ScopePath, ScopeSpec, ScopeValidation, ValidatedScope,
};
pub use validate::validate_scopes;
pub use variables::{VariableDialect, load_variables, normalize_variables};
