//! DOM node structure for HTML to Markdown conversion.
//!
//! A small, parser-agnostic tree: any HTML parser (scraper, html5ever, a
//! browser's live DOM serialised over a message channel) can build it. The
//! converter only ever reads it.

use indexmap::IndexMap;

use crate::utilities::is_void;

/// Tag name used for the root of a detached fragment
pub const FRAGMENT_TAG: &str = "#document-fragment";

/// A node in the markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with a tag, attributes and children
    Element(Element),
    /// Text content
    Text(String),
    /// Comment; never rendered
    Comment(String),
}

/// An element node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Lower-cased tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Child nodes in document order
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element {
            tag: tag_name.to_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        })
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Node::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Node::Comment(content.to_string())
    }

    /// Create an empty fragment root; it renders as its children
    pub fn fragment() -> Self {
        Node::element(FRAGMENT_TAG)
    }

    /// Build a fragment holding `children`
    pub fn fragment_of(children: Vec<Node>) -> Self {
        children
            .into_iter()
            .fold(Node::fragment(), |fragment, child| fragment.with_child(child))
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// The element behind this node, if it is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get the tag name (lowercase); `#text` and `#comment` for other nodes
    pub fn tag_name(&self) -> &str {
        match self {
            Node::Element(element) => &element.tag,
            Node::Text(_) => "#text",
            Node::Comment(_) => "#comment",
        }
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        let element = self.as_element()?;
        element
            .attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether the `class` attribute lists `class_name`
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    /// Get all child nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            _ => &[],
        }
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|n| n.is_element())
    }

    /// Add a child node. Void elements never take children.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(element) = self {
            if !is_void(&element.tag) {
                element.children.push(child);
            }
        }
    }

    /// Builder form of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Node::Element(element) = self {
            element
                .attributes
                .insert(name.to_lowercase(), value.to_string());
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Reconstruct outer HTML (for keep rules)
    pub fn outer_html(&self) -> String {
        match self {
            Node::Text(text) => escape_html_text(text),
            Node::Comment(comment) => format!("<!--{}-->", comment),
            Node::Element(element) if element.tag == FRAGMENT_TAG => self.inner_html(),
            Node::Element(element) => {
                let tag = &element.tag;
                let attrs = attributes_string(element);
                let open = if attrs.is_empty() {
                    format!("<{}>", tag)
                } else {
                    format!("<{} {}>", tag, attrs)
                };

                if is_void(tag) {
                    open
                } else {
                    format!("{}{}</{}>", open, self.inner_html(), tag)
                }
            }
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        self.children().iter().map(Node::outer_html).collect()
    }
}

/// Get attributes as a string for HTML output
fn attributes_string(element: &Element) -> String {
    element
        .attributes
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                name.clone()
            } else {
                format!("{}=\"{}\"", name, escape_html_attr(value))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
