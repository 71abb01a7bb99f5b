//! List rules command implementation.

use anyhow::{Context, Result};
use herb_lint_core::{RuleDescriptor, UNNECESSARY_DIRECTIVE};

fn row(descriptor: &RuleDescriptor) -> String {
    let name = if descriptor.enabled_by_default {
        descriptor.name.to_string()
    } else {
        format!("{} (off)", descriptor.name)
    };
    let autofix = descriptor
        .fix_safety()
        .map_or_else(|| "-".to_string(), |safety| safety.to_string());
    format!(
        "{:<42} {:<9} {:<8} {}",
        name,
        descriptor.default_severity.to_string(),
        autofix,
        descriptor.description
    )
}

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    let registry = herb_lint_rules::registry().context("Failed to build rule registry")?;

    println!("Available rules:\n");
    println!("{:<42} {:<9} {:<8} Description", "Name", "Severity", "Autofix");
    println!("{}", "-".repeat(100));

    for descriptor in registry.descriptors().chain([&UNNECESSARY_DIRECTIVE]) {
        println!("{}", row(descriptor));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  herb-lint check --rules html-tag-name-lowercase,html-no-duplicate-ids");
    println!("\nSilence a line with an ERB comment:");
    println!("  <%# herb:disable html-no-duplicate-ids %>");

    Ok(())
}
