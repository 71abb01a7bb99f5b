//! # herb-lint-rules
//!
//! Built-in lint rules for herb-lint.
//!
//! ## Available Rules
//!
//! | Name | Kind | Autofix |
//! |------|------|---------|
//! | `html-tag-name-lowercase` | tree | safe |
//! | `html-attribute-values-require-quotes` | tree | safe |
//! | `html-boolean-attributes-no-value` | tree | safe |
//! | `html-no-duplicate-ids` | tree | - |
//! | `html-no-nested-links` | tree | - |
//! | `herb-disable-comment-malformed` | directive | - |
//! | `herb-disable-comment-missing-rules` | directive | - |
//! | `herb-disable-comment-valid-rule-name` | directive | - |
//! | `herb-disable-comment-no-duplicate-rules` | directive | - |
//! | `herb-disable-comment-no-redundant-all` | directive | - |
//!
//! ## Usage
//!
//! ```ignore
//! use herb_lint_core::Linter;
//!
//! let mut linter = Linter::builder()
//!     .registry(&herb_lint_rules::registry()?)
//!     .build()?;
//! let result = linter.lint_source("<DIV class=foo></DIV>")?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod herb_disable_comment_malformed;
mod herb_disable_comment_missing_rules;
mod herb_disable_comment_no_duplicate_rules;
mod herb_disable_comment_no_redundant_all;
mod herb_disable_comment_valid_rule_name;
mod html_attribute_values_require_quotes;
mod html_boolean_attributes_no_value;
mod html_no_duplicate_ids;
mod html_no_nested_links;
mod html_tag_name_lowercase;
mod presets;

pub use herb_disable_comment_malformed::HerbDisableCommentMalformed;
pub use herb_disable_comment_missing_rules::HerbDisableCommentMissingRules;
pub use herb_disable_comment_no_duplicate_rules::HerbDisableCommentNoDuplicateRules;
pub use herb_disable_comment_no_redundant_all::HerbDisableCommentNoRedundantAll;
pub use herb_disable_comment_valid_rule_name::HerbDisableCommentValidRuleName;
pub use html_attribute_values_require_quotes::HtmlAttributeValuesRequireQuotes;
pub use html_boolean_attributes_no_value::HtmlBooleanAttributesNoValue;
pub use html_no_duplicate_ids::HtmlNoDuplicateIds;
pub use html_no_nested_links::HtmlNoNestedLinks;
pub use html_tag_name_lowercase::HtmlTagNameLowercase;
pub use presets::{all_rules, directive_registry, registry, Preset};

/// Re-export core types for convenience.
pub use herb_lint_core::{Offense, Rule, Severity};
