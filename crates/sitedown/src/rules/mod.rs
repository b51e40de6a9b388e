//! Rule system for node to Markdown conversion.
//!
//! Rules live in one ordered map. Resolution scans from the most recently
//! registered rule to the oldest and the first match wins, so a rule added
//! after the built-ins overrides them. Nothing matching means the explicit
//! passthrough rule: the element's children are rendered and its tags are
//! dropped.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::context::Context;
use crate::node::Node;

/// Ordered rule registry
pub struct Rules {
    /// Every rule by key, oldest first
    rules: IndexMap<String, Rule>,
    /// Fallback for elements no rule matches
    passthrough: Rule,
    /// Counter for generated keep/remove keys
    generated: usize,
}

impl Rules {
    /// Create a new Rules instance with the built-in rules
    pub fn new() -> Self {
        let mut rules = Self::empty();
        for (key, rule) in commonmark_rules() {
            rules.rules.insert(key.to_string(), rule);
        }
        rules
    }

    /// A registry with no rules at all; every element passes through
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
            passthrough: Rule::new(Filter::predicate(|_, _| true), |_, content, _| {
                content.to_string()
            }),
            generated: 0,
        }
    }

    /// Register a rule. Re-using a key replaces that rule and makes it the
    /// most recent one.
    pub fn register(&mut self, key: &str, rule: Rule) {
        let replaced = self.rules.shift_remove(key).is_some();
        tracing::debug!(key, replaced, "registered conversion rule");
        self.rules.insert(key.to_string(), rule);
    }

    /// Keep matching elements as raw HTML
    pub fn keep(&mut self, filter: Filter) {
        let key = self.generated_key("keep");
        self.register(&key, Rule::new(filter, |node, _, _| node.outer_html()).opaque());
    }

    /// Remove matching elements and their content
    pub fn remove(&mut self, filter: Filter) {
        let key = self.generated_key("remove");
        self.register(&key, Rule::discard(filter));
    }

    /// Find the rule for a node
    pub fn resolve(&self, node: &Node, ctx: &Context) -> &Rule {
        match self
            .rules
            .values()
            .rev()
            .find(|rule| rule.filter.matches(node, ctx))
        {
            Some(rule) => rule,
            None => {
                tracing::debug!(
                    tag = node.tag_name(),
                    "no rule matched; rendering children only"
                );
                &self.passthrough
            }
        }
    }

    /// Whether a rule is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Rule keys, oldest first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn generated_key(&mut self, prefix: &str) -> String {
        self.generated += 1;
        format!("{}-{}", prefix, self.generated)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}
