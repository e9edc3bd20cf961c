//! scoped-sass CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use scoped_sass::ScopeSpec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod compile;

#[derive(Parser)]
#[command(name = "scoped-sass")]
#[command(version)]
#[command(about = "Compile an SCSS file once per variable scope and merge the results", long_about = None)]
struct Cli {
    /// SCSS source file
    input: PathBuf,

    /// YAML file with `scopes`, `load-paths`, `minified` and `verify-structure`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scope definition (NAME=PATH[,PATH...]), appended to the configured scopes
    #[arg(short, long, value_name = "NAME=PATHS", value_parser = compile::parse_scope_arg)]
    scope: Vec<ScopeSpec>,

    /// Additional import search directory
    #[arg(short = 'I', long)]
    load_path: Vec<PathBuf>,

    /// Write CSS to FILE instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Produce compressed CSS
    #[arg(long)]
    minified: bool,

    /// Merge scopes without checking that their rules line up
    #[arg(long)]
    no_verify_structure: bool,

    /// Print the dependency list to stderr, one path per line
    #[arg(long)]
    deps: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoped_sass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    compile::execute(compile::CompileArgs {
        input: cli.input,
        config: cli.config,
        scopes: cli.scope,
        load_paths: cli.load_path,
        output: cli.output,
        minified: cli.minified,
        verify_structure: !cli.no_verify_structure,
        deps: cli.deps,
    })
}
