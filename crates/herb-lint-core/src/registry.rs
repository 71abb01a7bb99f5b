//! Explicit catalog of rule factories.
//!
//! The registry stores one factory per rule, so every lint run (and every
//! worker thread) can build fresh rule instances whose scratch state is never
//! shared.

use crate::config::ConfigError;
use crate::rule::{AnyRule, DirectiveRuleBox, RuleBox, RuleDescriptor};

/// Builds a document rule.
pub type RuleFactory = fn() -> RuleBox;

/// Builds a directive rule.
pub type DirectiveRuleFactory = fn() -> DirectiveRuleBox;

#[derive(Clone, Copy)]
enum Factory {
    Document(RuleFactory),
    Directive(DirectiveRuleFactory),
}

/// Ordered `(descriptor, factory)` pairs with unique rule names.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    entries: Vec<(&'static RuleDescriptor, Factory)>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRule`] if the name is taken.
    pub fn register_rule(&mut self, factory: RuleFactory) -> Result<&mut Self, ConfigError> {
        let descriptor = factory().descriptor();
        self.push(descriptor, Factory::Document(factory))
    }

    /// Registers a directive rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRule`] if the name is taken.
    pub fn register_directive_rule(
        &mut self,
        factory: DirectiveRuleFactory,
    ) -> Result<&mut Self, ConfigError> {
        let descriptor = factory().descriptor();
        self.push(descriptor, Factory::Directive(factory))
    }

    fn push(
        &mut self,
        descriptor: &'static RuleDescriptor,
        factory: Factory,
    ) -> Result<&mut Self, ConfigError> {
        if self.contains(descriptor.name) {
            return Err(ConfigError::DuplicateRule {
                name: descriptor.name.to_string(),
            });
        }
        self.entries.push((descriptor, factory));
        Ok(self)
    }

    /// Whether a rule called `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(d, _)| d.name == name)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static RuleDescriptor> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    /// Rule names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors().map(|d| d.name)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a fresh instance of every registered rule.
    #[must_use]
    pub fn instantiate(&self) -> Vec<AnyRule> {
        self.entries
            .iter()
            .map(|(_, factory)| match factory {
                Factory::Document(make) => AnyRule::Document(make()),
                Factory::Directive(make) => AnyRule::Directive(make()),
            })
            .collect()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
