//! # herb-lint-core
//!
//! Rule-execution engine for HTML + ERB templates.
//!
//! This crate provides the tree model and the machinery shared by every
//! rule:
//!
//! - [`syntax`]: arena-backed tree, forgiving parser, identity-preserving printer
//! - [`Rule`] and [`DirectiveRule`] traits, with [`Visitor`] dispatch
//! - [`Linter`] for running rules, applying `herb:disable` suppression and
//!   reporting unnecessary directives
//! - [`FixMode`] and [`Linter::fix_source`] for autofix to a fixed point
//!
//! ## Example
//!
//! ```ignore
//! use herb_lint_core::{FixMode, Linter};
//!
//! let mut linter = Linter::builder()
//!     .rule(HtmlTagNameLowercase::default())
//!     .build()?;
//!
//! let result = linter.lint_source("<DIV></DIV>")?;
//! assert_eq!(result.offenses.len(), 2);
//!
//! let report = linter.fix_source("<DIV></DIV>", FixMode::Safe)?;
//! assert_eq!(report.source, "<div></div>");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod autofix;
mod config;
mod context;
mod directive;
mod isolation;
mod linter;
mod registry;
mod rule;
mod suppression;
mod types;
mod visitor;

pub mod syntax;

pub use autofix::{apply_fixes, FixMode, FixOutcome, FixReport};
pub use config::{Config, ConfigError, LinterConfig, RuleConfig};
pub use context::LintContext;
pub use directive::{collect as collect_directives, DisableComment, RuleNameDetail, ALL_RULES, DIRECTIVE_KEYWORD};
pub use isolation::{install_panic_hook, is_isolating};
pub use linter::{LintError, Linter, LinterBuilder};
pub use registry::{DirectiveRuleFactory, RuleFactory, RuleRegistry};
pub use rule::{AnyRule, DirectiveRule, DirectiveRuleBox, Rule, RuleBox, RuleDescriptor};
pub use suppression::{
    is_suppressible, suppress, DIRECTIVE_RULE_PREFIX, INTERNAL_ERROR_PREFIX, UNNECESSARY_DIRECTIVE,
    UNNECESSARY_DIRECTIVE_RULE,
};
pub use types::{
    byte_offset, sort_offenses, FixSafety, FixTarget, LintResult, Location, Offense,
    OffenseDiagnostic, Position, Severity,
};
pub use visitor::{walk, walk_document, VisitCx, Visitor, Walk};
