//! Positional merge of per-scope compiler outputs.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Every scope compiles the same source, so every scope's output has the
//! same rules in the same order; only declaration values differ. The first
//! scope's rule fragments form the skeleton. Each skeleton rule is replaced,
//! in place, by the scoped copies of that rule from every scope:
//!
//! ```text
//! scope 0 output            merged output
//! .btn {                    .theme-default .btn {
//!   color: red;               color: red;
//! }                         }
//!                           .theme-mauve .btn {
//!                             color: blue;
//!                           }
//! ```
//!
//! Everything outside the skeleton fragments (comments, whitespace,
//! statements) is taken from the first scope's output.

use tracing::debug;

use crate::error::ScopedSassError;
use crate::fragment::{RuleFragment, segment};
use crate::selector::scope_fragment;
use crate::types::{CompiledScope, MergeResult};

/// Merge options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Reject scopes whose rule count or selectors differ from the first scope's.
    ///
    /// When disabled, divergent outputs are merged position by position and
    /// the result is unspecified.
    pub verify_structure: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            verify_structure: true,
        }
    }
}

/// Merge compiled scopes into one stylesheet.
///
/// The first scope supplies the document skeleton, the source map and the
/// included-file list. Dependencies are every scope's variable files followed
/// by the first scope's included files, without deduplication.
///
/// # Example
///
/// ```
/// use scoped_sass::{CompiledScope, MergeOptions, merge_scopes};
///
/// let compiled = vec![
///     CompiledScope {
///         scope_name: "a".to_string(),
///         css: ".btn { color: red; }".to_string(),
///         ..Default::default()
///     },
///     CompiledScope {
///         scope_name: "b".to_string(),
///         css: ".btn { color: blue; }".to_string(),
///         ..Default::default()
///     },
/// ];
///
/// let merged = merge_scopes(&compiled, MergeOptions::default()).unwrap();
/// assert_eq!(merged.css, ".a .btn { color: red; }\n.b .btn { color: blue; }");
/// ```
pub fn merge_scopes(
    compiled: &[CompiledScope],
    options: MergeOptions,
) -> Result<MergeResult, ScopedSassError> {
    let Some(base) = compiled.first() else {
        return Ok(MergeResult::default());
    };

    let skeleton = segment(&base.css);
    let segmented: Vec<Vec<RuleFragment<'_>>> = compiled
        .iter()
        .map(|scope| segment(&scope.css))
        .collect();

    if options.verify_structure {
        verify_structure(compiled, &segmented)?;
    }

    let scoped: Vec<Vec<String>> = compiled
        .iter()
        .zip(&segmented)
        .map(|(scope, fragments)| {
            fragments
                .iter()
                .map(|fragment| scope_fragment(fragment.text(), &scope.scope_name))
                .collect()
        })
        .collect();

    let mut css = String::with_capacity(compiled.iter().map(|c| c.css.len()).sum());
    let mut cursor = 0;
    for (position, fragment) in skeleton.iter().enumerate() {
        let span = fragment.span();
        css.push_str(&base.css[cursor..span.start]);

        let copies: Vec<&str> = scoped
            .iter()
            .filter_map(|fragments| fragments.get(position))
            .map(String::as_str)
            .collect();
        css.push_str(&copies.join("\n"));

        cursor = span.end;
    }
    css.push_str(&base.css[cursor..]);

    let mut dependencies: Vec<_> = compiled
        .iter()
        .flat_map(|scope| scope.variable_paths.iter().cloned())
        .collect();
    dependencies.extend(base.included_files.iter().cloned());

    debug!(
        scopes = compiled.len(),
        rules = skeleton.len(),
        dependencies = dependencies.len(),
        "Merged scoped CSS"
    );

    Ok(MergeResult {
        css,
        source_map: base.source_map.clone(),
        dependencies,
        diagnostics: Vec::new(),
    })
}

/// Check that every scope has the first scope's rules, in the same order,
/// with the same selectors. Declaration blocks are not compared.
fn verify_structure(
    compiled: &[CompiledScope],
    segmented: &[Vec<RuleFragment<'_>>],
) -> Result<(), ScopedSassError> {
    let Some(expected) = segmented.first() else {
        return Ok(());
    };

    for (scope, fragments) in compiled.iter().zip(segmented).skip(1) {
        let len = expected.len().max(fragments.len());
        for position in 0..len {
            let want = expected.get(position).map(|f| f.selectors().trim());
            let got = fragments.get(position).map(|f| f.selectors().trim());
            if want != got {
                return Err(ScopedSassError::StructuralMismatch {
                    scope_name: scope.scope_name.clone(),
                    position,
                    expected: want.unwrap_or("<no rule>").to_string(),
                    found: got.unwrap_or("<no rule>").to_string(),
                });
            }
        }
    }
    Ok(())
}
