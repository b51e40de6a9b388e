//! sitedown-core - options, escaping and post-processing
//!
//! This crate holds the string-level pieces of the sitedown Markdown engine.
//! It knows nothing about DOM trees; the `sitedown` crate walks a node tree
//! and calls into this crate for every text node and once at the end.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐    escape_markdown()    ┌──────────────┐
//! Node tree ────▶ │  tree walker │ ──────────────────────▶ │ post_process │ ──▶ Markdown
//!  (sitedown)     │  + rules     │    code_span()/fence    └──────────────┘
//!                 └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use sitedown_core::{escape_markdown, post_process, EscapeMode, Options};
//!
//! let options = Options::default();
//! options.validate().unwrap();
//!
//! let text = escape_markdown("2 * 3 = 6", EscapeMode::Prose);
//! assert_eq!(post_process(&format!("\n\n{text}\n\n"), false), "2 \\* 3 = 6\n");
//! ```

mod escape;
mod options;
mod postprocess;

pub use escape::{
    code_fence, code_span, escape_continuation, escape_markdown, longest_run, EscapeMode,
};
pub use options::{
    CodeBlockStyle, HeadingStyle, LineBreakStyle, Options, OptionsError, DEFAULT_MAX_DEPTH,
};
pub use postprocess::post_process;
