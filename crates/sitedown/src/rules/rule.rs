//! Rule and Filter types for node conversion.

use crate::context::Context;
use crate::node::Node;

/// Type alias for replacement functions
pub type ReplacementFn = Box<dyn Fn(&Node, &str, &Context) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&Node, &Context) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Node, &Context) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, node: &Node, ctx: &Context) -> bool {
        if !node.is_element() {
            return false;
        }
        let tag = node.tag_name();
        match self {
            Filter::TagName(t) => tag == t.as_str(),
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(node, ctx),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::TagName(t) => f.debug_tuple("TagName").field(t).finish(),
            Filter::TagNames(tags) => f.debug_tuple("TagNames").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A rule defines how to convert a matched element to Markdown.
///
/// The replacement receives the element, the Markdown of its already
/// rendered children and the read-only context. Rules that set `descend` to
/// `false` get an empty children string and read what they need from the
/// node itself (void elements, code, dropped subtrees).
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
    /// Whether the walker renders the children before calling the rule
    pub descend: bool,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&Node, &str, &Context) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
            descend: true,
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&Node, &str, &Context) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&Node, &str, &Context) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Do not render children for this rule
    pub fn opaque(mut self) -> Self {
        self.descend = false;
        self
    }

    /// A rule that drops matched elements and their whole subtree
    pub fn discard(filter: Filter) -> Self {
        Self::new(filter, |_, _, _| String::new()).opaque()
    }

    /// Apply this rule's replacement
    pub fn replace(&self, node: &Node, content: &str, ctx: &Context) -> String {
        (self.replacement)(node, content, ctx)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("filter", &self.filter)
            .field("descend", &self.descend)
            .finish_non_exhaustive()
    }
}
