//! Compile command implementation.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Reads the input and optional configuration from disk, runs the scoped
//! compilation on a multi-threaded tokio runtime and writes the merged CSS.
//!
//! Relative paths (scope variable files, configured load paths) resolve
//! against the input file's directory. That directory is also the first
//! load path, so imports of sibling partials work from any working directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use scoped_sass::{MergeResult, ScopeConfig, ScopeContext, ScopePath, ScopeSpec, compile_scoped};
use scoped_sass_runtime::{NativeRuntime, SystemRuntime};

/// Arguments for the compile command
#[derive(Debug)]
pub struct CompileArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    /// Scopes given on the command line
    pub scopes: Vec<ScopeSpec>,
    pub load_paths: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub minified: bool,
    pub verify_structure: bool,
    pub deps: bool,
}

/// Parse `NAME=PATH[,PATH...]`.
pub fn parse_scope_arg(arg: &str) -> Result<ScopeSpec, String> {
    let (name, paths) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH[,PATH...], got `{arg}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing scope name in `{arg}`"));
    }

    let paths: Vec<String> = paths.split(',').map(|p| p.trim().to_string()).collect();
    let path = match <[String; 1]>::try_from(paths) {
        Ok([single]) => ScopePath::Single(single),
        Err(paths) => ScopePath::Multiple(paths),
    };
    Ok(ScopeSpec::new(name, path))
}

/// Combine configured and command-line scopes.
///
/// `None` only when neither source defines a scope list.
fn combine_scopes(configured: Option<Vec<ScopeSpec>>, cli: Vec<ScopeSpec>) -> Option<Vec<ScopeSpec>> {
    match configured {
        Some(mut specs) => {
            specs.extend(cli);
            Some(specs)
        }
        None if cli.is_empty() => None,
        None => Some(cli),
    }
}

/// Directory relative paths resolve against.
fn base_dir(input: &Path, runtime: &dyn SystemRuntime) -> Result<PathBuf> {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => runtime
            .cwd()
            .map_err(|e| anyhow::anyhow!("Failed to get current directory: {}", e)),
    }
}

/// Input directory first, then `--load-path` entries.
fn load_paths(base_dir: &Path, extra: &[PathBuf]) -> Vec<PathBuf> {
    std::iter::once(base_dir.to_path_buf())
        .chain(extra.iter().cloned())
        .collect()
}

/// Execute the compile command
pub fn execute(args: CompileArgs) -> Result<()> {
    let runtime = NativeRuntime::new();

    let source = runtime
        .file_read_string(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;

    let config = match &args.config {
        Some(path) => {
            let text = runtime
                .file_read_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            ScopeConfig::from_yaml_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => ScopeConfig::default(),
    };
    for diagnostic in &config.diagnostics {
        warn!("{}", diagnostic);
    }

    let base_dir = base_dir(&args.input, &runtime)?;
    debug!(base_dir = %base_dir.display(), "Resolved base directory");

    let context = ScopeContext::native(&base_dir)
        .with_load_paths(load_paths(&base_dir, &args.load_paths));
    let context = config
        .apply(context)
        .with_minified(config.minified || args.minified)
        .with_verify_structure(config.verify_structure && args.verify_structure);
    let specs = combine_scopes(config.scopes.clone(), args.scopes);

    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let merged = tokio_runtime.block_on(compile_scoped(&source, specs.as_deref(), &context))?;

    write_output(&merged, args.output.as_deref())?;
    if args.deps {
        let mut stderr = std::io::stderr().lock();
        for dependency in &merged.dependencies {
            writeln!(stderr, "{}", dependency.display())?;
        }
    }
    Ok(())
}

fn write_output(merged: &MergeResult, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, &merged.css)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(merged.css.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
