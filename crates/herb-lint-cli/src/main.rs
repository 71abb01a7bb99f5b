//! herb-lint CLI tool.
//!
//! Usage:
//! ```bash
//! herb-lint check [OPTIONS] [PATHS]...
//! herb-lint list-rules
//! herb-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter and autofixer for HTML + ERB templates
#[derive(Parser)]
#[command(name = "herb-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HERB_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint templates, optionally fixing them in place
    Check {
        /// Files or directories to lint (default: current directory)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Apply safe autofixes and write the files back
        #[arg(long)]
        fix: bool,

        /// Apply safe and unsafe autofixes and write the files back
        #[arg(long)]
        fix_unsafely: bool,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Annotated source snippets.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-offense compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    herb_lint_core::install_panic_hook();

    match cli.command {
        Commands::Check {
            paths,
            format,
            fix,
            fix_unsafely,
            rules,
        } => {
            let options = commands::check::CheckOptions {
                format,
                fix: commands::check::fix_mode(fix, fix_unsafely),
                rules,
            };
            let source = config_resolver::resolve(&project_dir(&paths), cli.config.as_deref());
            let clean = commands::check::run(&paths, &options, &source)?;
            if !clean {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => commands::list_rules::run(),
        Commands::Init { force } => commands::init::run(force),
    }
}

/// Directory used to look up a project config: the first path, or its parent
/// when it names a file.
fn project_dir(paths: &[PathBuf]) -> PathBuf {
    match paths.first() {
        Some(path) if path.is_file() => path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), std::path::Path::to_path_buf),
        Some(path) => path.clone(),
        None => PathBuf::from("."),
    }
}
