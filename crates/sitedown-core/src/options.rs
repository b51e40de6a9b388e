//! Configuration options for Markdown conversion

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// How a `<br>` is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineBreakStyle {
    /// Backslash followed by a newline
    #[default]
    Backslash,
    /// Two trailing spaces followed by a newline
    TwoSpaces,
}

impl LineBreakStyle {
    /// The Markdown text of a hard line break in this style
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreakStyle::Backslash => "\\\n",
            LineBreakStyle::TwoSpaces => "  \n",
        }
    }
}

/// Default limit on element nesting before a conversion is aborted
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for Markdown conversion.
///
/// Chosen once per conversion and never changed while a tree is walked.
/// Use [`Options::validate`] (the converter calls it on entry) to reject
/// combinations that would produce broken Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Line break style for `<br>`
    pub line_break: LineBreakStyle,

    /// Maximum element nesting depth
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            line_break: LineBreakStyle::Backslash,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Rejected option combinations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("bullet list marker must be one of '-', '*' or '+', got {0:?}")]
    BulletMarker(char),

    #[error("emphasis delimiter must be '_' or '*', got {0:?}")]
    EmDelimiter(char),

    #[error("strong delimiter must be \"**\" or \"__\", got {0:?}")]
    StrongDelimiter(String),

    #[error("fence must be at least three backticks or tildes, got {0:?}")]
    Fence(String),

    #[error("horizontal rule {0:?} is not a thematic break")]
    HorizontalRule(String),

    #[error("max_depth must be greater than zero")]
    MaxDepth,
}

impl Options {
    /// Check that every field holds a value Markdown can express.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !matches!(self.bullet_list_marker, '-' | '*' | '+') {
            return Err(OptionsError::BulletMarker(self.bullet_list_marker));
        }
        if !matches!(self.em_delimiter, '_' | '*') {
            return Err(OptionsError::EmDelimiter(self.em_delimiter));
        }
        if !matches!(self.strong_delimiter.as_str(), "**" | "__") {
            return Err(OptionsError::StrongDelimiter(self.strong_delimiter.clone()));
        }
        if !is_valid_fence(&self.fence) {
            return Err(OptionsError::Fence(self.fence.clone()));
        }
        if !is_thematic_break(&self.hr) {
            return Err(OptionsError::HorizontalRule(self.hr.clone()));
        }
        if self.max_depth == 0 {
            return Err(OptionsError::MaxDepth);
        }
        Ok(())
    }

    /// The character the fence is made of (`` ` `` or `~`)
    pub fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

fn is_valid_fence(fence: &str) -> bool {
    let mut chars = fence.chars();
    match chars.next() {
        Some(c @ ('`' | '~')) => fence.len() >= 3 && chars.all(|other| other == c),
        _ => false,
    }
}

/// A thematic break is 3+ of the same `-`, `*` or `_`, optionally spaced.
fn is_thematic_break(hr: &str) -> bool {
    let marks: Vec<char> = hr.chars().filter(|c| *c != ' ').collect();
    match marks.first() {
        Some(&c @ ('-' | '*' | '_')) => marks.len() >= 3 && marks.iter().all(|m| *m == c),
        _ => false,
    }
}
