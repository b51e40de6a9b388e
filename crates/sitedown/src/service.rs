//! SitedownService - the main entry point for DOM to Markdown conversion.

use sitedown_core::{escape_markdown, post_process, EscapeMode, LineBreakStyle, Options};

use crate::convert::Walker;
use crate::node::Node;
use crate::rules::{Filter, Rule, Rules};
use crate::whitespace::DisplayTable;
use crate::Result;

/// The main service for converting node trees to Markdown.
///
/// Configuration (rules, options, display table) needs `&mut self`;
/// conversion only needs `&self`, so a configured service can be shared
/// across threads. To change rules while conversions are running, build a
/// new service and swap it in behind an `Arc`.
#[derive(Debug)]
pub struct SitedownService {
    options: Options,
    rules: Rules,
    display: DisplayTable,
}

impl SitedownService {
    /// Create a new SitedownService with default options
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create a SitedownService with custom options
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            rules: Rules::new(),
            display: DisplayTable::default(),
        }
    }

    /// Convert a node tree to Markdown.
    ///
    /// Options are validated before anything is walked. On error no partial
    /// output is produced.
    pub fn convert(&self, root: &Node) -> Result<String> {
        self.options.validate()?;

        let walker = Walker {
            rules: &self.rules,
            display: &self.display,
            options: &self.options,
        };
        let rendered = walker.walk(root)?;

        let keep_hard_breaks = self.options.line_break == LineBreakStyle::TwoSpaces;
        let markdown = post_process(&rendered, keep_hard_breaks);
        tracing::trace!(
            root = root.tag_name(),
            bytes = markdown.len(),
            "converted node tree"
        );
        Ok(markdown)
    }

    /// Parse an HTML fragment and convert it
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        self.convert(&crate::html::parse_html(html))
    }

    /// Add a custom rule; it takes precedence over every earlier rule
    pub fn register(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.register(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text, EscapeMode::Prose)
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Tag classification used for whitespace and block separation
    pub fn display(&self) -> &DisplayTable {
        &self.display
    }

    /// Mutable access to the tag classification
    pub fn display_mut(&mut self) -> &mut DisplayTable {
        &mut self.display
    }

    /// The rule registry
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

impl Default for SitedownService {
    fn default() -> Self {
        Self::new()
    }
}
