//! # sitedown
//!
//! Convert captured web page DOM trees to Markdown.
//!
//! The engine is a rule-driven tree walker in the style of
//! [turndown](https://github.com/mixmark-io/turndown): every element is
//! matched against an ordered list of rules, the most recently registered
//! match wins, and unmatched elements simply render their children.
//!
//! ## Design
//!
//! The converter accepts a parser-agnostic [`Node`] tree rather than raw
//! HTML. This design allows:
//!
//! - **Zero parsing overhead**: when a DOM is already available (a browser
//!   extension serialising the live page, CDP, ...)
//! - **Parser agnostic**: any HTML parser can build the Node structure
//! - **Pure conversion**: no I/O, no global state; one service can be
//!   shared across threads
//!
//! String-level helpers (options, escaping, post-processing) live in
//! [`sitedown_core`] and are re-exported here.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use sitedown::{Node, SitedownService};
//!
//! let service = SitedownService::new();
//!
//! let root = Node::fragment()
//!     .with_child(Node::element("h1").with_child(Node::text("Title")))
//!     .with_child(
//!         Node::element("p")
//!             .with_child(Node::text("Hello "))
//!             .with_child(Node::element("strong").with_child(Node::text("world"))),
//!     );
//!
//! let markdown = service.convert(&root).unwrap();
//! assert_eq!(markdown, "# Title\n\nHello **world**\n");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! # #[cfg(feature = "html")]
//! # {
//! use sitedown::SitedownService;
//!
//! let service = SitedownService::new();
//! let markdown = service.convert_html("<script>evil()</script><p>Safe</p>").unwrap();
//! assert_eq!(markdown, "Safe\n");
//! # }
//! ```

mod context;
mod convert;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod rules;
mod service;
mod utilities;
mod whitespace;

pub use context::{Context, ListFrame};
#[cfg(feature = "html")]
pub use html::{capture, document_title, parse_html, Capture};
pub use node::{Element, Node, FRAGMENT_TAG};
pub use rules::{Filter, PredicateFn, ReplacementFn, Rule, Rules};
pub use service::SitedownService;
pub use sitedown_core::{
    code_fence, code_span, escape_continuation, escape_markdown, longest_run, post_process,
    CodeBlockStyle, EscapeMode, HeadingStyle, LineBreakStyle, Options, OptionsError,
    DEFAULT_MAX_DEPTH,
};
pub use utilities::{
    clean_attribute, is_ignored, is_void, single_line, suggest_file_name, IGNORED_ELEMENTS,
    VOID_ELEMENTS,
};
pub use whitespace::{Display, DisplayTable, BLOCK_ELEMENTS, PREFORMATTED_ELEMENTS};

/// A node tree the walker refuses to convert
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("node tree nesting depth {depth} exceeds the limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },
}

/// Error type for sitedown operations
#[derive(Debug, thiserror::Error)]
pub enum SitedownError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
}

pub type Result<T> = std::result::Result<T, SitedownError>;
