//! Scope configuration extraction from YAML.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! ```yaml
//! scopes:
//!   - scope-name: theme-default
//!     path: themes/default.scss
//!   - scope-name: theme-mauve
//!     path: [themes/base.less, themes/mauve.scss]
//! load-paths: [node_modules]
//! minified: false
//! verify-structure: true
//! ```
//!
//! A `scopes` value that is absent or not a sequence means "no scopes
//! configured" and leads to the unscoped fallback. Entries of the sequence
//! that are not scope specs are reported and skipped.

use std::path::PathBuf;

use serde_yaml::Value;

use crate::context::ScopeContext;
use crate::error::{ScopeDiagnostic, ScopedSassError};
use crate::types::ScopeSpec;

/// Scoped compilation settings read from a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeConfig {
    /// `None` when `scopes` is missing or not a sequence
    pub scopes: Option<Vec<ScopeSpec>>,

    /// Extra import search directories, relative to the base directory
    pub load_paths: Vec<String>,

    pub minified: bool,

    /// Defaults to `true`
    pub verify_structure: bool,

    /// Scope entries that could not be read as specs
    pub diagnostics: Vec<ScopeDiagnostic>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            scopes: None,
            load_paths: Vec::new(),
            minified: false,
            verify_structure: true,
            diagnostics: Vec::new(),
        }
    }
}

impl ScopeConfig {
    /// Parse a YAML document.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScopedSassError::InvalidConfig` if the text is not valid YAML,
    /// or if a top-level setting has the wrong type.
    pub fn from_yaml_str(text: &str) -> Result<Self, ScopedSassError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| ScopedSassError::InvalidConfig {
                message: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    /// Extract settings from an already parsed YAML value.
    pub fn from_value(value: &Value) -> Result<Self, ScopedSassError> {
        let mut config = Self::default();
        if value.is_null() {
            return Ok(config);
        }
        if !value.is_mapping() {
            return Err(ScopedSassError::InvalidConfig {
                message: "configuration must be a mapping".to_string(),
            });
        }

        if let Some(scopes) = value.get("scopes").and_then(Value::as_sequence) {
            let mut specs = Vec::with_capacity(scopes.len());
            for (index, entry) in scopes.iter().enumerate() {
                match serde_yaml::from_value::<ScopeSpec>(entry.clone()) {
                    Ok(spec) => specs.push(spec),
                    Err(e) => config.diagnostics.push(ScopeDiagnostic::InvalidScopeEntry {
                        index,
                        message: e.to_string(),
                    }),
                }
            }
            config.scopes = Some(specs);
        }

        if let Some(load_paths) = value.get("load-paths") {
            config.load_paths = string_list(load_paths, "load-paths")?;
        }
        if let Some(minified) = value.get("minified") {
            config.minified = flag(minified, "minified")?;
        }
        if let Some(verify) = value.get("verify-structure") {
            config.verify_structure = flag(verify, "verify-structure")?;
        }

        Ok(config)
    }

    /// The configured scope list, as expected by [`crate::compile_scoped`].
    pub fn scope_specs(&self) -> Option<&[ScopeSpec]> {
        self.scopes.as_deref()
    }

    /// Apply load paths and flags to a context.
    ///
    /// Load paths are resolved against the context's base directory and
    /// appended after any the context already has.
    pub fn apply(&self, context: ScopeContext) -> ScopeContext {
        let mut load_paths: Vec<PathBuf> = context.load_paths().to_vec();
        load_paths.extend(self.load_paths.iter().map(|p| context.resolve_path(p)));
        context
            .with_load_paths(load_paths)
            .with_minified(self.minified)
            .with_verify_structure(self.verify_structure)
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, ScopedSassError> {
    if let Some(s) = value.as_str() {
        return Ok(vec![s.to_string()]);
    }
    let invalid = || ScopedSassError::InvalidConfig {
        message: format!("`{key}` must be a string or a list of strings"),
    };
    let items = value.as_sequence().ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

fn flag(value: &Value, key: &str) -> Result<bool, ScopedSassError> {
    value.as_bool().ok_or_else(|| ScopedSassError::InvalidConfig {
        message: format!("`{key}` must be true or false"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScopePath;
    use scoped_sass_runtime::MemoryRuntime;
    use std::sync::Arc;

    #[test]
    fn test_full_document() {
        let config = ScopeConfig::from_yaml_str(
            r#"
scopes:
  - scope-name: theme-default
    path: themes/default.scss
  - scopeName: theme-mauve
    path: [themes/base.less, themes/mauve.scss]
load-paths: [node_modules]
minified: true
verify-structure: false
"#,
        )
        .unwrap();

        let scopes = config.scopes.unwrap();
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0], ScopeSpec::new("theme-default", "themes/default.scss"));
        assert_eq!(scopes[1].scope_name, "theme-mauve");
        assert_eq!(
            scopes[1].path,
            ScopePath::Multiple(vec![
                "themes/base.less".to_string(),
                "themes/mauve.scss".to_string()
            ])
        );
        assert_eq!(config.load_paths, vec!["node_modules"]);
        assert!(config.minified);
        assert!(!config.verify_structure);
        assert!(config.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ScopeConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ScopeConfig::default());
        assert!(config.verify_structure);
        assert!(config.scope_specs().is_none());
    }

    #[test]
    fn test_non_sequence_scopes_is_none() {
        let config = ScopeConfig::from_yaml_str("scopes: theme.scss").unwrap();
        assert!(config.scopes.is_none());

        let config = ScopeConfig::from_yaml_str("scopes:\n  a: b\n").unwrap();
        assert!(config.scopes.is_none());
    }

    #[test]
    fn test_empty_sequence_is_some() {
        let config = ScopeConfig::from_yaml_str("scopes: []").unwrap();
        assert_eq!(config.scopes, Some(Vec::new()));
    }

    #[test]
    fn test_invalid_entries_become_diagnostics() {
        let config = ScopeConfig::from_yaml_str(
            r#"
scopes:
  - just-a-string
  - scope-name: ok
    path: ok.scss
  - scope-name: [not, a, string]
"#,
        )
        .unwrap();

        assert_eq!(config.scopes.as_ref().map(Vec::len), Some(1));
        let indices: Vec<_> = config
            .diagnostics
            .iter()
            .map(|d| match d {
                ScopeDiagnostic::InvalidScopeEntry { index, .. } => *index,
                other => panic!("unexpected diagnostic: {other}"),
            })
            .collect();
        assert_eq!(indices, [0, 2]);
    }

    #[test]
    fn test_missing_fields_left_to_validation() {
        let config = ScopeConfig::from_yaml_str("scopes:\n  - path: a.scss\n").unwrap();
        let scopes = config.scopes.unwrap();
        assert_eq!(scopes[0].scope_name, "");
        assert!(config.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ScopeConfig::from_yaml_str("scopes: [unclosed").unwrap_err();
        assert!(matches!(err, ScopedSassError::InvalidConfig { .. }));
    }

    #[test]
    fn test_wrong_setting_types() {
        assert!(ScopeConfig::from_yaml_str("minified: maybe").is_err());
        assert!(ScopeConfig::from_yaml_str("load-paths: [1, 2]").is_err());
        assert!(ScopeConfig::from_yaml_str("- a\n- b\n").is_err());
    }

    #[test]
    fn test_single_load_path_string() {
        let config = ScopeConfig::from_yaml_str("load-paths: vendor").unwrap();
        assert_eq!(config.load_paths, vec!["vendor"]);
    }

    #[test]
    fn test_apply_to_context() {
        let config =
            ScopeConfig::from_yaml_str("load-paths: [vendor]\nminified: true\nverify-structure: false")
                .unwrap();
        let context = ScopeContext::new("/project", Arc::new(MemoryRuntime::new()))
            .with_load_paths(vec![PathBuf::from("/shared")]);

        let context = config.apply(context);

        assert_eq!(
            context.load_paths(),
            &[PathBuf::from("/shared"), PathBuf::from("/project/vendor")]
        );
        assert!(context.minified());
        assert!(!context.verify_structure());
    }
}
