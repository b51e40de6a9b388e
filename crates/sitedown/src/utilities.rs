//! Utility functions and constants for HTML processing.

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content never reaches the Markdown output
pub const IGNORED_ELEMENTS: &[&str] = &[
    "script", "style", "head", "meta", "title", "noscript", "template", "link",
];

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is dropped together with its subtree
pub fn is_ignored(tag: &str) -> bool {
    IGNORED_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Replace every line break with a single space.
///
/// A backslash hard break at the end of a line is dropped with it; an
/// escaped backslash (an even run) is kept.
pub fn single_line(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let line = line.trim();
            let trailing = line.len() - line.trim_end_matches('\\').len();
            if trailing % 2 == 1 {
                line[..line.len() - 1].trim_end()
            } else {
                line
            }
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Indent every line after the first by `width` spaces.
pub fn indent_continuation(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
            }
        }
        out.push_str(line);
    }
    out
}

/// Turn a page title into a file name safe on common file systems.
///
/// Characters reserved on Windows, macOS or Linux become `-`, runs of
/// whitespace become one space, and `.md` is appended. An empty title
/// yields `page.md`.
pub fn suggest_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let stem: String = collapsed
        .trim_matches(|c: char| c == '.' || c == ' ' || c == '-')
        .chars()
        .take(120)
        .collect();

    if stem.is_empty() {
        "page.md".to_string()
    } else {
        format!("{}.md", stem.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_void() {
        assert!(is_void("br"));
        assert!(is_void("img"));
        assert!(is_void("HR"));
        assert!(!is_void("div"));
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored("script"));
        assert!(is_ignored("STYLE"));
        assert!(!is_ignored("p"));
    }

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(Some("  a.png ")), "a.png");
        assert_eq!(clean_attribute(Some("   ")), "");
        assert_eq!(clean_attribute(None), "");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\\\nb"), "a b");
        assert_eq!(single_line("a\\\\\nb"), "a\\\\ b");
        assert_eq!(single_line("a\n\nb\n"), "a b");
    }

    #[test]
    fn test_indent_continuation() {
        assert_eq!(indent_continuation("a\nb\n\nc", 2), "a\n  b\n\n  c");
    }

    #[test]
    fn test_suggest_file_name() {
        assert_eq!(suggest_file_name("Rust: A Guide"), "Rust- A Guide.md");
        assert_eq!(suggest_file_name("a/b\\c?"), "a-b-c.md");
        assert_eq!(suggest_file_name("  spaced   out  "), "spaced out.md");
        assert_eq!(suggest_file_name("..."), "page.md");
        assert_eq!(suggest_file_name(""), "page.md");
    }
}
