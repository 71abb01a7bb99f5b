//! Check command implementation.

use anyhow::{Context, Result};
use herb_lint_core::{Config, FixMode, LintResult, Linter, RuleRegistry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options collected from the command line.
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Autofix mode, if fixing was requested.
    pub fix: Option<FixMode>,
    /// Comma-separated rule filter.
    pub rules: Option<String>,
}

/// Outcome of linting one file.
pub struct FileReport {
    /// Path as discovered.
    pub path: PathBuf,
    /// Source after any fixes, used to render snippets.
    pub source: String,
    /// Offenses remaining in `source`.
    pub result: LintResult,
    /// Whether the file was rewritten on disk.
    pub fixed: bool,
}

/// Maps the `--fix` flags to a fix mode.
pub fn fix_mode(fix: bool, fix_unsafely: bool) -> Option<FixMode> {
    if fix_unsafely {
        Some(FixMode::SafeAndUnsafe)
    } else if fix {
        Some(FixMode::Safe)
    } else {
        None
    }
}

/// Runs the check command.
///
/// Returns `false` when error-severity offenses remain.
pub fn run(paths: &[PathBuf], options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let mut config = source.load()?;
    let registry = herb_lint_rules::registry().context("Failed to build rule registry")?;

    if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        for name in &names {
            if !registry.contains(name) {
                tracing::warn!("Unknown rule: {}", name);
            }
        }
        let all: Vec<&str> = registry.names().collect();
        config.restrict_to(names, &all);
    }

    // Surface configuration mistakes once instead of per file.
    let preflight = build_linter(&registry, &config, None).context("Failed to build linter")?;
    tracing::info!("Linting with {} rules", preflight.rule_count());

    let files = discover_files(paths, &config)?;
    tracing::debug!("Discovered {} files", files.len());

    let reports = files
        .par_iter()
        .map(|path| check_file(path, &registry, &config, options.fix))
        .collect::<Result<Vec<_>>>()?;

    super::output::print(&reports, options.format)?;

    Ok(!reports.iter().any(|report| report.result.has_errors()))
}

fn build_linter(
    registry: &RuleRegistry,
    config: &Config,
    file_name: Option<&Path>,
) -> Result<Linter> {
    let mut builder = Linter::builder().registry(registry).config(config.clone());
    if let Some(path) = file_name {
        builder = builder.file_name(path);
    }
    Ok(builder.build()?)
}

/// Lints one file with fresh rule instances, fixing it when asked.
fn check_file(
    path: &Path,
    registry: &RuleRegistry,
    config: &Config,
    fix: Option<FixMode>,
) -> Result<FileReport> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut linter = build_linter(registry, config, Some(path))?;

    let Some(mode) = fix else {
        let result = linter
            .lint_source(&source)
            .with_context(|| format!("Failed to lint {}", path.display()))?;
        return Ok(FileReport {
            path: path.to_path_buf(),
            source,
            result,
            fixed: false,
        });
    };

    let report = linter
        .fix_source(&source, mode)
        .with_context(|| format!("Failed to fix {}", path.display()))?;
    let fixed = report.changed();
    if fixed {
        std::fs::write(path, &report.source)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(
            "Fixed {} in {} passes ({} applied)",
            path.display(),
            report.iterations,
            report.applied
        );
    }
    Ok(FileReport {
        path: path.to_path_buf(),
        source: report.source,
        result: report.result,
        fixed,
    })
}

/// Collects template files under `paths`.
///
/// Explicit file arguments are always linted; directories are walked with
/// gitignore support and filtered by the `[linter]` include/exclude globs.
fn discover_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        let mut builder = ignore::WalkBuilder::new(root);
        builder.hidden(false).git_ignore(true);

        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(path);
            if config.linter.is_included(relative)? {
                files.push(path.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
