//! Shared output formatting for lint results.

use anyhow::Result;
use herb_lint_core::{Offense, OffenseDiagnostic};
use serde::Serialize;

use super::check::FileReport;
use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(reports: &[FileReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(reports),
        OutputFormat::Json => return print_json(reports),
        OutputFormat::Compact => print_compact(reports),
    }
    Ok(())
}

/// Totals across all files.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
struct Summary {
    files_checked: usize,
    files_fixed: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    suppressed: usize,
    fixable: usize,
}

impl Summary {
    fn of(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files_checked: reports.len(),
            ..Self::default()
        };
        for report in reports {
            let (errors, warnings, infos) = report.result.count_by_severity();
            summary.errors += errors;
            summary.warnings += warnings;
            summary.infos += infos;
            summary.suppressed += report.result.suppressed_count;
            summary.fixable += report.result.fixable_count();
            summary.files_fixed += usize::from(report.fixed);
        }
        summary
    }
}

fn print_text(reports: &[FileReport]) {
    for report in reports {
        let file_name = report.path.display().to_string();
        for offense in report.result.all_offenses() {
            let diagnostic = OffenseDiagnostic::new(offense, &file_name, &report.source);
            println!("{:?}", miette::Report::new(diagnostic));
        }
    }

    let summary = Summary::of(reports);
    let summary_color = if summary.errors > 0 {
        "\x1b[31m"
    } else if summary.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, summary.errors, summary.warnings, summary.infos, summary.files_checked
    );
    if summary.suppressed > 0 {
        println!("{} offense(s) suppressed by herb:disable comments", summary.suppressed);
    }
    if summary.files_fixed > 0 {
        println!("Fixed {} file(s)", summary.files_fixed);
    }
    if summary.fixable > 0 {
        println!("{} offense(s) can be fixed with --fix", summary.fixable);
    }
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    fixed: bool,
    offenses: Vec<&'a Offense>,
    suppressed_count: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: Vec<JsonFile<'a>>,
    summary: Summary,
}

fn json_report(reports: &[FileReport]) -> JsonReport<'_> {
    JsonReport {
        files: reports
            .iter()
            .map(|report| JsonFile {
                path: report.path.display().to_string(),
                fixed: report.fixed,
                offenses: report.result.all_offenses(),
                suppressed_count: report.result.suppressed_count,
            })
            .collect(),
        summary: Summary::of(reports),
    }
}

fn print_json(reports: &[FileReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(&json_report(reports))?;
    println!("{json}");
    Ok(())
}

fn compact_line(path: &str, offense: &Offense) -> String {
    format!("{path}:{offense}")
}

fn print_compact(reports: &[FileReport]) {
    for report in reports {
        let path = report.path.display().to_string();
        for offense in report.result.all_offenses() {
            println!("{}", compact_line(&path, offense));
        }
    }
}
