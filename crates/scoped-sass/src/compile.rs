//! Scoped compilation: one compiler run per scope, merged into one stylesheet.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The compilation flow is:
//! 1. Validate the configured scopes (`validate_scopes`)
//! 2. Load each scope's override text (`load_variables`)
//! 3. Compile `overrides + "\n" + source` once per scope, concurrently (`compile_all`)
//! 4. Merge the per-scope outputs (`merge_scopes`)
//!
//! Overrides come first and have their `!default` flags stripped, so they
//! take precedence over the source's own `!default` declarations.
//!
//! # Example
//!
//! ```rust,ignore
//! use scoped_sass::{ScopeContext, ScopeSpec, compile_scoped};
//!
//! let context = ScopeContext::native("/project/styles");
//! let specs = vec![
//!     ScopeSpec::new("theme-default", "themes/default.scss"),
//!     ScopeSpec::new("theme-mauve", "themes/mauve.scss"),
//! ];
//!
//! let merged = compile_scoped(&source, Some(&specs), &context).await?;
//! std::fs::write("out.css", merged.css)?;
//! ```

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use scoped_sass_runtime::{RuntimeError, SassOutput};

use crate::context::ScopeContext;
use crate::error::{ScopeFailure, ScopedSassError};
use crate::merge::{MergeOptions, merge_scopes};
use crate::types::{CompiledScope, MergeResult, ScopeSpec, ValidatedScope};
use crate::validate::validate_scopes;
use crate::variables::load_variables;

/// Build one scope's compiler input.
pub fn scope_input(overrides: &str, source: &str) -> String {
    format!("{}\n{}", overrides, source)
}

/// Compile `source` once per scope.
///
/// Every compilation is started before any is awaited. Results come back in
/// `scopes` order regardless of completion order. All compilations run to
/// completion; if any failed, the error lists every failing scope in
/// `scopes` order.
///
/// Must be called from within a tokio runtime.
pub async fn compile_all(
    source: &str,
    scopes: &[ValidatedScope],
    context: &ScopeContext,
) -> Result<Vec<CompiledScope>, ScopedSassError> {
    let mut tasks = JoinSet::new();

    for (index, scope) in scopes.iter().enumerate() {
        let overrides = load_variables(context.runtime(), &scope.scope_name, &scope.variable_paths)?;
        let input = scope_input(&overrides, source);
        let runtime = context.shared_runtime();
        let load_paths = context.load_paths().to_vec();
        let minified = context.minified();

        debug!(scope = %scope.scope_name, index, "Spawning scope compilation");
        tasks.spawn(async move {
            let result = runtime.compile_sass(&input, &load_paths, minified).await;
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<SassOutput, RuntimeError>>> =
        (0..scopes.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| ScopedSassError::TaskFailed(e.to_string()))?;
        slots[index] = Some(result);
    }

    let mut compiled = Vec::with_capacity(scopes.len());
    let mut failures = Vec::new();
    for (scope, slot) in scopes.iter().zip(slots) {
        match slot {
            Some(Ok(output)) => compiled.push(CompiledScope {
                scope_name: scope.scope_name.clone(),
                css: output.css,
                source_map: output.source_map,
                variable_paths: scope.variable_paths.clone(),
                included_files: output.included_files,
            }),
            Some(Err(error)) => {
                warn!(scope = %scope.scope_name, %error, "Scope failed to compile");
                failures.push(ScopeFailure {
                    scope_name: scope.scope_name.clone(),
                    error,
                });
            }
            None => {
                return Err(ScopedSassError::TaskFailed(format!(
                    "no result for scope `{}`",
                    scope.scope_name
                )));
            }
        }
    }

    if !failures.is_empty() {
        return Err(ScopedSassError::Compilation { failures });
    }
    Ok(compiled)
}

/// Compile `source` under every configured scope and merge the results.
///
/// `specs` is `None` when the configuration held no scope list; the source is
/// then compiled once without scoping. Diagnostics are returned in
/// [`MergeResult::diagnostics`] and logged: `warn` for dropped specs, `info`
/// for the rest.
pub async fn compile_scoped(
    source: &str,
    specs: Option<&[ScopeSpec]>,
    context: &ScopeContext,
) -> Result<MergeResult, ScopedSassError> {
    let validation = validate_scopes(specs, context);
    for diagnostic in &validation.diagnostics {
        if diagnostic.drops_scope() {
            warn!("{}", diagnostic);
        } else {
            info!("{}", diagnostic);
        }
    }
    if validation.is_fallback() {
        debug!("No usable scopes, compiling unscoped");
    }

    let compiled = compile_all(source, &validation.scopes, context).await?;
    let mut merged = merge_scopes(
        &compiled,
        MergeOptions {
            verify_structure: context.verify_structure(),
        },
    )?;
    merged.diagnostics = validation.diagnostics;

    info!(
        scopes = compiled.len(),
        bytes = merged.css.len(),
        dependencies = merged.dependencies.len(),
        "Compiled scoped stylesheet"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_sass_runtime::MemoryRuntime;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn context(runtime: MemoryRuntime) -> ScopeContext {
        ScopeContext::new("/styles", Arc::new(runtime))
    }

    #[test]
    fn test_scope_input_puts_overrides_first() {
        assert_eq!(
            scope_input("$a: 1;", ".x { y: $a; }"),
            "$a: 1;\n.x { y: $a; }"
        );
        assert_eq!(scope_input("", ".x {}"), "\n.x {}");
    }

    #[tokio::test]
    async fn test_compile_all_keeps_scope_order() {
        let runtime = MemoryRuntime::new()
            .with_file("/styles/a.scss", "$w: 1px;")
            .with_file("/styles/b.scss", "$w: 2px;")
            .with_file("/styles/c.scss", "$w: 3px;");
        let ctx = context(runtime);
        let scopes: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                ValidatedScope::new(*name, vec![PathBuf::from(format!("/styles/{name}.scss"))])
            })
            .collect();

        let compiled = compile_all(".box { width: $w; }", &scopes, &ctx).await.unwrap();

        let names: Vec<_> = compiled.iter().map(|c| c.scope_name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(compiled[0].css.contains("width: 1px"));
        assert!(compiled[1].css.contains("width: 2px"));
        assert!(compiled[2].css.contains("width: 3px"));
        assert_eq!(compiled[2].variable_paths, vec![PathBuf::from("/styles/c.scss")]);
    }

    #[tokio::test]
    async fn test_compile_all_reports_every_failure() {
        let runtime = MemoryRuntime::new()
            .with_file("/styles/ok.scss", "$w: 1px;")
            .with_file("/styles/bad1.scss", "$w: ;")
            .with_file("/styles/bad2.scss", "$w: (;");
        let ctx = context(runtime);
        let scopes = vec![
            ValidatedScope::new("ok", vec![PathBuf::from("/styles/ok.scss")]),
            ValidatedScope::new("bad1", vec![PathBuf::from("/styles/bad1.scss")]),
            ValidatedScope::new("bad2", vec![PathBuf::from("/styles/bad2.scss")]),
        ];

        let err = compile_all(".box { width: $w; }", &scopes, &ctx)
            .await
            .unwrap_err();

        match &err {
            ScopedSassError::Compilation { failures } => {
                let names: Vec<_> = failures.iter().map(|f| f.scope_name.as_str()).collect();
                assert_eq!(names, ["bad1", "bad2"]);
                assert!(failures[0].compile_error().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("scope `bad1`"));
    }

    #[tokio::test]
    async fn test_compile_all_missing_variable_file_is_fatal() {
        let ctx = context(MemoryRuntime::new());
        let scopes = vec![ValidatedScope::new(
            "gone",
            vec![PathBuf::from("/styles/gone.scss")],
        )];

        let err = compile_all(".a { b: c; }", &scopes, &ctx).await.unwrap_err();

        assert!(matches!(err, ScopedSassError::VariableFile { .. }));
    }

    #[tokio::test]
    async fn test_compile_scoped_unscoped_fallback() {
        let ctx = context(MemoryRuntime::new());

        let merged = compile_scoped(".a { color: red; }", None, &ctx).await.unwrap();

        assert!(merged.css.contains(".a {"));
        assert!(!merged.css.contains(". .a"));
        assert!(merged.dependencies.is_empty());
        assert!(merged.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_compile_scoped_surfaces_diagnostics() {
        let runtime = MemoryRuntime::new().with_file("/styles/ok.scss", "$c: red;");
        let ctx = context(runtime);
        let specs = vec![
            ScopeSpec::new("x", "/no/such/file.scss"),
            ScopeSpec::new("ok", "ok.scss"),
        ];

        let merged = compile_scoped(".a { color: $c; }", Some(&specs), &ctx)
            .await
            .unwrap();

        assert!(merged.css.contains(".ok .a"));
        assert!(!merged.css.contains(".x "));
        assert_eq!(merged.diagnostics.len(), 1);
        assert_eq!(merged.dependencies, vec![PathBuf::from("/styles/ok.scss")]);
    }

    #[tokio::test]
    async fn test_compile_scoped_keeps_duplicate_scopes() {
        let runtime = MemoryRuntime::new()
            .with_file("/styles/a.scss", "$c: red;")
            .with_file("/styles/b.scss", "$c: blue;");
        let ctx = context(runtime);
        let specs = vec![ScopeSpec::new("dup", "a.scss"), ScopeSpec::new("dup", "b.scss")];

        let merged = compile_scoped(".a { color: $c; }", Some(&specs), &ctx)
            .await
            .unwrap();

        assert_eq!(merged.css.matches(".dup .a").count(), 2);
        assert_eq!(merged.diagnostics.len(), 1);
        assert!(!merged.diagnostics[0].drops_scope());
    }
}
