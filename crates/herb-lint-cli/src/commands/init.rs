//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_FILE: &str = ".herb-lint.toml";

const DEFAULT_CONFIG: &str = r#"# herb-lint configuration

[linter]
# Glob patterns of templates to lint
include = [
    "**/*.html.erb",
    "**/*.html",
]

# Glob patterns to exclude from linting
exclude = [
    "**/node_modules/**",
    "**/vendor/**",
]

# Upper bound on autofix passes per file
max_fix_iterations = 10

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.html-tag-name-lowercase]
enabled = true
# severity = "warning"  # Override default severity

[rules.html-no-duplicate-ids]
enabled = true

# Report herb:disable comments that suppress nothing
[rules.herb-disable-comment-unnecessary]
enabled = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: herb-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
