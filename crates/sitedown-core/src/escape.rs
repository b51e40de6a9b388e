//! Markdown escaping for literal text.
//!
//! Text outside code is escaped so that a Markdown renderer shows exactly the
//! characters the page showed. Code spans and code blocks are never escaped;
//! instead their delimiters are widened past any run of the delimiter
//! character found in the content.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Where a piece of literal text is going to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Ordinary paragraph text
    #[default]
    Prose,
    /// Text inside a pipe-table cell (pipes are escaped as well)
    TableCell,
    /// Inline code or a code block: emitted verbatim
    Code,
}

/// Line-start constructs that would turn a line into a heading, list item or
/// setext underline. The leading group keeps any indentation.
static LINE_START_ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?m)^(\s*)#", "${1}\\#"),
        (r"(?m)^(\s*)-", "${1}\\-"),
        (r"(?m)^(\s*)\+", "${1}\\+"),
        (r"(?m)^(\s*)=", "${1}\\="),
        (r"(?m)^(\s*)(\d+)([.)])", "${1}${2}\\${3}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("line-start escape patterns are valid"),
            replacement,
        )
    })
    .collect()
});

/// An `&` that a renderer would read as the start of an entity reference
static ENTITY_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&#?[A-Za-z0-9]+;").expect("entity pattern is valid"));

/// Escape Markdown-significant characters in `text`.
///
/// ```rust
/// use sitedown_core::{escape_markdown, EscapeMode};
///
/// assert_eq!(escape_markdown("*not bold*", EscapeMode::Prose), "\\*not bold\\*");
/// assert_eq!(escape_markdown("a|b", EscapeMode::TableCell), "a\\|b");
/// assert_eq!(escape_markdown("a_b", EscapeMode::Code), "a_b");
/// ```
pub fn escape_markdown(text: &str, mode: EscapeMode) -> String {
    if mode == EscapeMode::Code {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + text.len() / 8);
    for (i, c) in text.char_indices() {
        match c {
            '\\' | '`' | '*' | '_' | '~' | '[' | ']' | '<' | '>' => {
                result.push('\\');
                result.push(c);
            }
            '&' if ENTITY_REFERENCE.is_match(&text[i..]) => result.push_str("\\&"),
            '|' if mode == EscapeMode::TableCell => result.push_str("\\|"),
            _ => result.push(c),
        }
    }

    for (pattern, replacement) in LINE_START_ESCAPES.iter() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }

    result
}

/// Escape the start of `piece` where it completes an ordered-list marker
/// begun by `line`, the text already written on the current output line.
///
/// Text is escaped one node at a time, so a marker split across nodes (as in
/// `<span>1</span>. Intro`) is only visible once the pieces are joined.
///
/// ```rust
/// use sitedown_core::escape_continuation;
///
/// assert_eq!(escape_continuation("1", ". Intro"), "\\. Intro");
/// assert_eq!(escape_continuation("Step 1", ". Intro"), ". Intro");
/// ```
pub fn escape_continuation<'a>(line: &str, piece: &'a str) -> Cow<'a, str> {
    let number = line.trim_start();
    let continues_number = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());
    if continues_number && piece.starts_with(|c| c == '.' || c == ')') {
        Cow::Owned(format!("\\{piece}"))
    } else {
        Cow::Borrowed(piece)
    }
}

/// Length of the longest run of `ch` in `text`
pub fn longest_run(text: &str, ch: char) -> usize {
    text.chars()
        .fold((0, 0), |(max, current), c| {
            if c == ch {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}

/// Wrap `code` in a backtick code span.
///
/// The delimiter is one backtick longer than the longest backtick run inside
/// the content. Content that begins or ends with a backtick is padded with a
/// space, which CommonMark strips again when rendering.
pub fn code_span(code: &str) -> String {
    let ticks = "`".repeat(longest_run(code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{ticks} {code} {ticks}")
    } else {
        format!("{ticks}{code}{ticks}")
    }
}

/// The fence to use around `code`: `fence`, lengthened when the code itself
/// contains a run of the fence character at least as long.
pub fn code_fence(code: &str, fence: &str) -> String {
    let fence_char = fence.chars().next().unwrap_or('`');
    let needed = longest_run(code, fence_char) + 1;
    let length = fence.chars().count().max(needed);
    fence_char.to_string().repeat(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use pulldown_cmark::{Event, Parser};

    /// Reduce Markdown to the text a reader would see
    fn visible_text(markdown: &str) -> String {
        Parser::new(markdown)
            .filter_map(|event| match event {
                Event::Text(text) | Event::Code(text) => Some(text.into_string()),
                Event::SoftBreak | Event::HardBreak => Some("\n".to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_escape_inline_specials() {
        assert_eq!(escape_markdown("*test*", EscapeMode::Prose), "\\*test\\*");
        assert_eq!(escape_markdown("_test_", EscapeMode::Prose), "\\_test\\_");
        assert_eq!(escape_markdown("[link]", EscapeMode::Prose), "\\[link\\]");
        assert_eq!(escape_markdown("<div>", EscapeMode::Prose), "\\<div\\>");
        assert_eq!(escape_markdown("a\\b", EscapeMode::Prose), "a\\\\b");
        assert_eq!(escape_markdown("`x`", EscapeMode::Prose), "\\`x\\`");
        assert_eq!(escape_markdown("normal", EscapeMode::Prose), "normal");
    }

    #[test]
    fn test_pipe_only_escaped_in_cells() {
        assert_eq!(escape_markdown("a|b", EscapeMode::Prose), "a|b");
        assert_eq!(escape_markdown("a|b", EscapeMode::TableCell), "a\\|b");
    }

    #[test]
    fn test_line_start_escapes() {
        let cases = [
            ("# not a heading", "\\# not a heading"),
            ("- not a list", "\\- not a list"),
            ("+ plus", "\\+ plus"),
            ("1. first", "1\\. first"),
            ("12) twelfth", "12\\) twelfth"),
            (" - indented", " \\- indented"),
        ];
        for (text, expected) in cases {
            assert_eq!(escape_markdown(text, EscapeMode::Prose), expected);
        }
    }

    #[test]
    fn test_mid_line_markers_untouched() {
        assert_eq!(
            escape_markdown("C# and 2.0 - ok", EscapeMode::Prose),
            "C# and 2.0 - ok"
        );
    }

    #[test]
    fn test_tildes_are_escaped() {
        assert_eq!(escape_markdown("~~gone~~", EscapeMode::Prose), "\\~\\~gone\\~\\~");
        assert_eq!(escape_markdown("~~~ fence", EscapeMode::Prose), "\\~\\~\\~ fence");
    }

    #[test]
    fn test_ampersand_escaped_only_before_entity() {
        assert_eq!(escape_markdown("AT&T", EscapeMode::Prose), "AT&T");
        assert_eq!(escape_markdown("AT&amp;T", EscapeMode::Prose), "AT\\&amp;T");
        assert_eq!(escape_markdown("&copy; 2024", EscapeMode::Prose), "\\&copy; 2024");
        assert_eq!(escape_markdown("&#169;", EscapeMode::Prose), "\\&#169;");
        assert_eq!(escape_markdown("a & b; c", EscapeMode::Prose), "a & b; c");
    }

    #[test]
    fn test_escape_continuation() {
        assert_eq!(escape_continuation("1", ". Intro"), "\\. Intro");
        assert_eq!(escape_continuation("  42", ") answer"), "\\) answer");
        assert_eq!(escape_continuation("", ". Intro"), ". Intro");
        assert_eq!(escape_continuation("v1", ". Intro"), ". Intro");
        assert_eq!(escape_continuation("1", "0. Intro"), "0. Intro");
    }

    #[test]
    fn test_code_is_verbatim() {
        assert_eq!(
            escape_markdown("# *a* _b_ | ~ &amp;", EscapeMode::Code),
            "# *a* _b_ | ~ &amp;"
        );
    }

    #[test]
    fn test_code_span_widening() {
        assert_eq!(code_span("code"), "`code`");
        assert_eq!(code_span("a ` b"), "``a ` b``");
        assert_eq!(code_span("a `` b"), "```a `` b```");
        assert_eq!(code_span("`tick"), "`` `tick ``");
    }

    #[test]
    fn test_code_fence_widening() {
        assert_eq!(code_fence("let x = 1;", "```"), "```");
        assert_eq!(code_fence("```\nnested\n```", "```"), "````");
        assert_eq!(code_fence("~~~~~", "~~~"), "~~~~~~");
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run("", '`'), 0);
        assert_eq!(longest_run("a`b``c```", '`'), 3);
    }

    #[test]
    fn test_round_trip_examples() {
        for text in [
            "# heading?",
            "1. item?",
            "*stars* and _underscores_",
            "[not](a link)",
            "<b>not html</b>",
            "back\\slash",
            "- dash",
            "= equals",
            "AT&amp;T",
            "&copy; 2024",
            "~~gone~~",
        ] {
            let escaped = escape_markdown(text, EscapeMode::Prose);
            assert_eq!(visible_text(&escaped), text, "escaped as {escaped:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_escaped_text_renders_as_itself(
            raw in r"[a-zA-Z0-9\\`*_\[\]<>#+.=!~()|&; -]{1,40}",
        ) {
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            prop_assume!(!text.is_empty());

            let escaped = escape_markdown(&text, EscapeMode::Prose);
            prop_assert_eq!(visible_text(&escaped), text);
        }

        #[test]
        fn prop_code_span_never_closes_early(code in r"[a-z`]{1,20}") {
            let span = code_span(&code);
            let ticks = longest_run(&code, '`') + 1;
            prop_assert!(span.starts_with(&"`".repeat(ticks)));
            prop_assert_eq!(visible_text(&span), code.trim_matches(' ').to_string());
        }
    }
}
