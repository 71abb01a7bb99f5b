//! Rule traits for defining lint rules.

use crate::context::LintContext;
use crate::directive::DisableComment;
use crate::syntax::{Document, NodeId, TreeError};
use crate::types::{FixSafety, Offense, Severity};

/// Static metadata every rule carries.
///
/// Descriptors are `const`-constructible so rules can expose them as
/// `&'static` items:
///
/// ```
/// use herb_lint_core::{RuleDescriptor, Severity};
///
/// const DESCRIPTOR: RuleDescriptor =
///     RuleDescriptor::new("html-example", "An example rule")
///         .severity(Severity::Warning)
///         .safe_autofix();
///
/// assert!(DESCRIPTOR.safe_autofixable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Unique kebab-case rule name.
    pub name: &'static str,
    /// Brief description of what the rule checks.
    pub description: &'static str,
    /// Severity used unless configuration overrides it.
    pub default_severity: Severity,
    /// Whether `autofix` is semantics-preserving.
    pub safe_autofixable: bool,
    /// Whether `autofix` exists but may change behaviour.
    pub unsafe_autofixable: bool,
    /// Whether the rule runs without being enabled in config.
    pub enabled_by_default: bool,
}

impl RuleDescriptor {
    /// Creates a descriptor with error severity, no autofix, enabled by default.
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            default_severity: Severity::Error,
            safe_autofixable: false,
            unsafe_autofixable: false,
            enabled_by_default: true,
        }
    }

    /// Sets the default severity.
    #[must_use]
    pub const fn severity(self, default_severity: Severity) -> Self {
        Self {
            default_severity,
            ..self
        }
    }

    /// Declares a safe autofix.
    #[must_use]
    pub const fn safe_autofix(self) -> Self {
        Self {
            safe_autofixable: true,
            ..self
        }
    }

    /// Declares an unsafe autofix.
    #[must_use]
    pub const fn unsafe_autofix(self) -> Self {
        Self {
            unsafe_autofixable: true,
            ..self
        }
    }

    /// Makes the rule opt-in.
    #[must_use]
    pub const fn disabled_by_default(self) -> Self {
        Self {
            enabled_by_default: false,
            ..self
        }
    }

    /// Safety class of this rule's autofix, if it has one.
    #[must_use]
    pub fn fix_safety(&self) -> Option<FixSafety> {
        if self.safe_autofixable {
            Some(FixSafety::Safe)
        } else if self.unsafe_autofixable {
            Some(FixSafety::Unsafe)
        } else {
            None
        }
    }
}

/// A rule that inspects the whole document.
///
/// Most rules implement [`Visitor`](crate::Visitor) and delegate `check` to
/// [`walk_document`](crate::walk_document):
///
/// ```ignore
/// impl Rule for HtmlTagNameLowercase {
///     fn descriptor(&self) -> &'static RuleDescriptor { &DESCRIPTOR }
///
///     fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense> {
///         walk_document(self, &DESCRIPTOR, document, ctx)
///     }
/// }
/// ```
pub trait Rule: Send {
    /// Static metadata of the rule.
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Resets per-document scratch state.
    ///
    /// The linter calls this exactly once before every [`Rule::check`].
    fn on_new_investigation(&mut self) {}

    /// Checks a document and returns any offenses found.
    fn check(&mut self, document: &Document, ctx: &LintContext) -> Vec<Offense>;

    /// Rewrites `node` to correct an offense this rule reported.
    ///
    /// Must build a new node and call [`Document::replace_node`]; must not
    /// touch anything outside the subtree rooted at `node`. Returns
    /// `Ok(false)` when the node is not in a fixable state.
    ///
    /// # Errors
    ///
    /// Propagates [`TreeError`] from the replacement, e.g. a stale `node`.
    fn autofix(&self, node: NodeId, document: &mut Document) -> Result<bool, TreeError> {
        let _ = (node, document);
        Ok(false)
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// A rule invoked once per `herb:disable` comment instead of walking the tree.
pub trait DirectiveRule: Send {
    /// Static metadata of the rule.
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Resets per-document scratch state.
    fn on_new_investigation(&mut self) {}

    /// Checks a single parsed directive.
    fn check_directive(&mut self, comment: &DisableComment, ctx: &LintContext) -> Vec<Offense>;
}

/// Type alias for boxed `DirectiveRule` trait objects.
pub type DirectiveRuleBox = Box<dyn DirectiveRule>;

/// Either kind of rule, as stored by the registry and the linter.
pub enum AnyRule {
    /// Document-walking rule.
    Document(RuleBox),
    /// Per-directive rule.
    Directive(DirectiveRuleBox),
}

impl AnyRule {
    /// Metadata of the wrapped rule.
    #[must_use]
    pub fn descriptor(&self) -> &'static RuleDescriptor {
        match self {
            Self::Document(rule) => rule.descriptor(),
            Self::Directive(rule) => rule.descriptor(),
        }
    }
}
