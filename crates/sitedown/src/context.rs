//! Per-node conversion context.
//!
//! A [`Context`] is a small `Copy` value. The walker derives a fresh one for
//! every child it descends into, so a change made for one subtree (entering a
//! list, a quote or a code block) is never visible to its siblings.

use sitedown_core::{EscapeMode, Options};

use crate::node::Node;
use crate::whitespace::Display;

/// Position of a list item inside its list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFrame {
    /// Whether the enclosing list is `<ol>`
    pub ordered: bool,
    /// Item number (honours `<ol start>`); counts from 1 for bullets too
    pub number: u64,
    /// Nesting depth of the enclosing list, 1 for a top-level list
    pub depth: usize,
}

impl ListFrame {
    /// The marker written before the item's first line
    pub fn marker(&self, options: &Options) -> String {
        if self.ordered {
            format!("{}. ", self.number)
        } else {
            format!("{} ", options.bullet_list_marker)
        }
    }
}

/// Read-only state threaded through the conversion
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Options of the running conversion
    pub options: &'a Options,
    /// Tag of the parent element, `None` at the root
    pub parent_tag: Option<&'a str>,
    /// Position among the parent's element children
    pub index: usize,
    /// Set on `<li>` elements (and inherited by their content)
    pub list: Option<ListFrame>,
    /// Number of enclosing `<ul>`/`<ol>` elements
    pub list_depth: usize,
    /// Number of enclosing `<blockquote>` elements
    pub blockquote_depth: usize,
    /// Inside a preformatted element
    pub in_pre: bool,
    /// Inside an inline `<code>` element
    pub in_code: bool,
    /// Inside a `<th>`/`<td>`
    pub in_table_cell: bool,
    /// Element nesting depth, 0 at the root
    pub depth: usize,
}

impl<'a> Context<'a> {
    /// Context for the root of a conversion
    pub fn root(options: &'a Options) -> Self {
        Self {
            options,
            parent_tag: None,
            index: 0,
            list: None,
            list_depth: 0,
            blockquote_depth: 0,
            in_pre: false,
            in_code: false,
            in_table_cell: false,
            depth: 0,
        }
    }

    /// Context for a child of `parent`
    pub fn descend(self, parent: &'a Node, parent_display: Display) -> Self {
        let tag = parent.tag_name();
        Self {
            parent_tag: Some(tag),
            index: 0,
            list_depth: self.list_depth + usize::from(matches!(tag, "ul" | "ol")),
            blockquote_depth: self.blockquote_depth + usize::from(tag == "blockquote"),
            in_pre: self.in_pre || parent_display == Display::Preformatted,
            in_code: self.in_code || tag == "code",
            in_table_cell: self.in_table_cell || matches!(tag, "th" | "td"),
            depth: self.depth + 1,
            ..self
        }
    }

    /// Same context at a given sibling position
    pub fn at(self, index: usize) -> Self {
        Self { index, ..self }
    }

    /// Same context for a list item
    pub fn with_item(self, frame: ListFrame) -> Self {
        Self {
            list: Some(frame),
            ..self
        }
    }

    /// How literal text is escaped here
    pub fn escape_mode(&self) -> EscapeMode {
        if self.in_pre || self.in_code {
            EscapeMode::Code
        } else if self.in_table_cell {
            EscapeMode::TableCell
        } else {
            EscapeMode::Prose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descend_does_not_touch_parent() {
        let options = Options::default();
        let root = Context::root(&options);
        let quote = Node::element("blockquote");
        let inner = root.descend(&quote, Display::Block);

        assert_eq!(inner.blockquote_depth, 1);
        assert_eq!(inner.depth, 1);
        assert_eq!(inner.parent_tag, Some("blockquote"));
        assert_eq!(root.blockquote_depth, 0);
        assert_eq!(root.depth, 0);
    }

    #[test]
    fn test_escape_mode() {
        let options = Options::default();
        let root = Context::root(&options);
        assert_eq!(root.escape_mode(), EscapeMode::Prose);

        let td = Node::element("td");
        let cell = root.descend(&td, Display::Block);
        assert_eq!(cell.escape_mode(), EscapeMode::TableCell);

        let code = Node::element("code");
        assert_eq!(cell.descend(&code, Display::Inline).escape_mode(), EscapeMode::Code);

        let pre = Node::element("pre");
        assert_eq!(root.descend(&pre, Display::Preformatted).escape_mode(), EscapeMode::Code);
    }

    #[test]
    fn test_list_markers() {
        let options = Options::default();
        let bullet = ListFrame {
            ordered: false,
            number: 3,
            depth: 1,
        };
        let numbered = ListFrame {
            ordered: true,
            number: 10,
            depth: 2,
        };
        assert_eq!(bullet.marker(&options), "- ");
        assert_eq!(numbered.marker(&options), "10. ");
    }
}
