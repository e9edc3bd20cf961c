//! Scope set validation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Filters the configured scopes down to the ones whose variable files exist.
//! Problems never abort the request: the offending scope is dropped, a diagnostic is
//! recorded, and the remaining specs are still processed. When nothing
//! survives, the unscoped fallback is compiled instead.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::context::ScopeContext;
use crate::error::ScopeDiagnostic;
use crate::types::{ScopePath, ScopeSpec, ScopeValidation, ValidatedScope};

/// Validate the configured scope specs.
///
/// `None` means the configuration did not hold a sequence of scopes at all,
/// which selects the unscoped fallback without any diagnostic.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use scoped_sass::{ScopeContext, ScopeSpec, validate_scopes};
/// use scoped_sass_runtime::MemoryRuntime;
///
/// let runtime = MemoryRuntime::new().with_file("/themes/dark.scss", "$bg: black;");
/// let context = ScopeContext::new("/themes", Arc::new(runtime));
///
/// let specs = [
///     ScopeSpec::new("theme-dark", "dark.scss"),
///     ScopeSpec::new("x", "/no/such/file.scss"),
/// ];
/// let validation = validate_scopes(Some(&specs), &context);
///
/// assert_eq!(validation.scopes.len(), 1);
/// assert_eq!(validation.scopes[0].scope_name, "theme-dark");
/// assert_eq!(validation.diagnostics.len(), 1);
/// ```
pub fn validate_scopes(specs: Option<&[ScopeSpec]>, context: &ScopeContext) -> ScopeValidation {
    let Some(specs) = specs else {
        return ScopeValidation {
            scopes: vec![ValidatedScope::unscoped()],
            diagnostics: Vec::new(),
        };
    };

    let mut scopes = Vec::with_capacity(specs.len());
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();

    for (index, spec) in specs.iter().enumerate() {
        let scope_name = spec.scope_name.trim();
        if scope_name.is_empty() {
            diagnostics.push(ScopeDiagnostic::MissingScopeName { index });
            continue;
        }

        let Some(variable_paths) = resolve_scope_paths(scope_name, &spec.path, context, &mut diagnostics)
        else {
            continue;
        };

        if !seen.insert(scope_name.to_string()) {
            diagnostics.push(ScopeDiagnostic::DuplicateScopeName {
                scope_name: scope_name.to_string(),
            });
        }
        scopes.push(ValidatedScope::new(scope_name, variable_paths));
    }

    if scopes.is_empty() {
        scopes.push(ValidatedScope::unscoped());
    }

    ScopeValidation {
        scopes,
        diagnostics,
    }
}

/// Resolve every path of one spec. `None` when any of them is unusable;
/// one diagnostic is recorded per offending entry.
fn resolve_scope_paths(
    scope_name: &str,
    path: &ScopePath,
    context: &ScopeContext,
    diagnostics: &mut Vec<ScopeDiagnostic>,
) -> Option<Vec<PathBuf>> {
    match path {
        ScopePath::Single(path) => {
            if path.trim().is_empty() {
                diagnostics.push(ScopeDiagnostic::MissingPath {
                    scope_name: scope_name.to_string(),
                });
                return None;
            }
            let resolved = context.resolve_path(path);
            if !file_exists(context, &resolved) {
                diagnostics.push(ScopeDiagnostic::PathNotFound {
                    scope_name: scope_name.to_string(),
                    path: resolved,
                });
                return None;
            }
            Some(vec![resolved])
        }
        ScopePath::Multiple(paths) => {
            if paths.is_empty() {
                diagnostics.push(ScopeDiagnostic::MissingPath {
                    scope_name: scope_name.to_string(),
                });
                return None;
            }

            let mut resolved_paths = Vec::with_capacity(paths.len());
            let mut valid = true;
            for (position, path) in paths.iter().enumerate() {
                if path.trim().is_empty() {
                    diagnostics.push(ScopeDiagnostic::EmptyPathEntry {
                        scope_name: scope_name.to_string(),
                        position,
                    });
                    valid = false;
                    continue;
                }
                let resolved = context.resolve_path(path);
                if !file_exists(context, &resolved) {
                    diagnostics.push(ScopeDiagnostic::PathNotFound {
                        scope_name: scope_name.to_string(),
                        path: resolved,
                    });
                    valid = false;
                    continue;
                }
                resolved_paths.push(resolved);
            }
            valid.then_some(resolved_paths)
        }
    }
}

fn file_exists(context: &ScopeContext, path: &std::path::Path) -> bool {
    context.runtime().is_file(path).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_sass_runtime::MemoryRuntime;
    use std::sync::Arc;

    fn context() -> ScopeContext {
        let runtime = MemoryRuntime::new()
            .with_file("/vars/default.scss", "$primary-color: red !default;")
            .with_file("/vars/mauve.scss", "$primary-color: blue;")
            .with_file("/vars/base.less", "@radius: 2px;");
        ScopeContext::new("/vars", Arc::new(runtime))
    }

    #[test]
    fn test_non_sequence_falls_back_to_unscoped() {
        let validation = validate_scopes(None, &context());
        assert!(validation.is_fallback());
        assert!(validation.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_list_falls_back_to_unscoped() {
        let validation = validate_scopes(Some(&[]), &context());
        assert!(validation.is_fallback());
    }

    #[test]
    fn test_valid_scopes_keep_order() {
        let specs = [
            ScopeSpec::new("theme-default", "default.scss"),
            ScopeSpec::new("theme-mauve", "/vars/mauve.scss"),
        ];
        let validation = validate_scopes(Some(&specs), &context());

        assert!(validation.diagnostics.is_empty());
        assert_eq!(
            validation.scopes,
            vec![
                ValidatedScope::new("theme-default", vec![PathBuf::from("/vars/default.scss")]),
                ValidatedScope::new("theme-mauve", vec![PathBuf::from("/vars/mauve.scss")]),
            ]
        );
    }

    #[test]
    fn test_missing_path_drops_only_that_scope() {
        let specs = [
            ScopeSpec::new("x", "/no/such/file.scss"),
            ScopeSpec::new("theme-mauve", "mauve.scss"),
        ];
        let validation = validate_scopes(Some(&specs), &context());

        assert_eq!(validation.scopes.len(), 1);
        assert_eq!(validation.scopes[0].scope_name, "theme-mauve");
        assert_eq!(
            validation.diagnostics,
            vec![ScopeDiagnostic::PathNotFound {
                scope_name: "x".to_string(),
                path: PathBuf::from("/no/such/file.scss"),
            }]
        );
    }

    #[test]
    fn test_all_invalid_falls_back_with_diagnostics() {
        let specs = [
            ScopeSpec::new("x", "/no/such/file.scss"),
            ScopeSpec::new("", "mauve.scss"),
        ];
        let validation = validate_scopes(Some(&specs), &context());

        assert!(validation.is_fallback());
        assert_eq!(validation.diagnostics.len(), 2);
        assert_eq!(
            validation.diagnostics[1],
            ScopeDiagnostic::MissingScopeName { index: 1 }
        );
    }

    #[test]
    fn test_path_list_reports_every_missing_entry() {
        let specs = [ScopeSpec::new(
            "combo",
            vec![
                "base.less".to_string(),
                "missing-a.scss".to_string(),
                String::new(),
                "missing-b.scss".to_string(),
            ],
        )];
        let validation = validate_scopes(Some(&specs), &context());

        assert!(validation.is_fallback());
        assert_eq!(
            validation.diagnostics,
            vec![
                ScopeDiagnostic::PathNotFound {
                    scope_name: "combo".to_string(),
                    path: PathBuf::from("/vars/missing-a.scss"),
                },
                ScopeDiagnostic::EmptyPathEntry {
                    scope_name: "combo".to_string(),
                    position: 2,
                },
                ScopeDiagnostic::PathNotFound {
                    scope_name: "combo".to_string(),
                    path: PathBuf::from("/vars/missing-b.scss"),
                },
            ]
        );
    }

    #[test]
    fn test_path_list_all_present() {
        let specs = [ScopeSpec::new(
            "combo",
            vec!["base.less".to_string(), "mauve.scss".to_string()],
        )];
        let validation = validate_scopes(Some(&specs), &context());

        assert!(validation.diagnostics.is_empty());
        assert_eq!(
            validation.scopes[0].variable_paths,
            vec![
                PathBuf::from("/vars/base.less"),
                PathBuf::from("/vars/mauve.scss")
            ]
        );
    }

    #[test]
    fn test_empty_path_and_empty_list() {
        let specs = [
            ScopeSpec::new("a", ""),
            ScopeSpec::new("b", Vec::<String>::new()),
        ];
        let validation = validate_scopes(Some(&specs), &context());

        assert!(validation.is_fallback());
        assert_eq!(
            validation.diagnostics,
            vec![
                ScopeDiagnostic::MissingPath {
                    scope_name: "a".to_string()
                },
                ScopeDiagnostic::MissingPath {
                    scope_name: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_names_are_kept_with_warning() {
        let specs = [
            ScopeSpec::new("theme", "default.scss"),
            ScopeSpec::new("theme", "mauve.scss"),
        ];
        let validation = validate_scopes(Some(&specs), &context());

        assert_eq!(validation.scopes.len(), 2);
        assert_eq!(
            validation.diagnostics,
            vec![ScopeDiagnostic::DuplicateScopeName {
                scope_name: "theme".to_string()
            }]
        );
    }
}
