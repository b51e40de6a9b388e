//! Built-in rules for HTML to Markdown conversion.
//!
//! Rules return bare Markdown. Separating blocks with blank lines is the
//! walker's job, based on the display class of each element.

use sitedown_core::{
    code_fence, code_span, escape_markdown, CodeBlockStyle, EscapeMode, HeadingStyle,
};

use super::{Filter, Rule};
use crate::node::Node;
use crate::utilities::{clean_attribute, indent_continuation, single_line, IGNORED_ELEMENTS};
use crate::whitespace::{collapse_whitespace, PREFORMATTED_ELEMENTS};

/// Create all built-in rules, in registration order
pub fn commonmark_rules() -> Vec<(&'static str, Rule)> {
    vec![
        ("ignored", ignored_rule()),
        ("paragraph", paragraph_rule()),
        ("lineBreak", line_break_rule()),
        ("heading", heading_rule()),
        ("blockquote", blockquote_rule()),
        ("list", list_rule()),
        ("listItem", list_item_rule()),
        ("codeBlock", code_block_rule()),
        ("horizontalRule", horizontal_rule()),
        ("link", link_rule()),
        ("emphasis", emphasis_rule()),
        ("strong", strong_rule()),
        ("strikethrough", strikethrough_rule()),
        ("code", code_rule()),
        ("image", image_rule()),
        ("table", table_rule()),
        ("tableSection", table_section_rule()),
        ("tableRow", table_row_rule()),
        ("tableCell", table_cell_rule()),
        ("tableCaption", Rule::discard(Filter::tag("caption"))),
    ]
}

/// Trim whitespace and any hard break left dangling at either end.
fn trim_block(content: &str) -> &str {
    let mut s = content.trim();
    loop {
        let before = s.len();
        if let Some(rest) = s.strip_prefix("\\\n") {
            s = rest.trim_start();
        }
        let trailing = s.len() - s.trim_end_matches('\\').len();
        if trailing % 2 == 1 {
            s = s[..s.len() - 1].trim_end();
        }
        if s.len() == before {
            return s;
        }
    }
}

fn ignored_rule() -> Rule {
    Rule::discard(Filter::tags(IGNORED_ELEMENTS))
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| trim_block(content).to_string())
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, ctx| ctx.options.line_break.as_str().to_string()).opaque()
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, ctx| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

            let content = single_line(content);
            if content.is_empty() {
                return String::new();
            }

            match ctx.options.heading_style {
                HeadingStyle::Setext if level <= 2 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    format!(
                        "{}\n{}",
                        content,
                        underline.repeat(content.chars().count().max(3))
                    )
                }
                _ => format!("{} {}", "#".repeat(level), content),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return String::new();
        }
        content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn list_rule() -> Rule {
    Rule::new(Filter::tags(&["ul", "ol"]), |_, content, _| {
        content.trim_matches('\n').to_string()
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |_, content, ctx| {
        let marker = match ctx.list {
            Some(frame) => frame.marker(ctx.options),
            None => format!("{} ", ctx.options.bullet_list_marker),
        };

        let content = trim_block(content);
        if content.is_empty() {
            return marker.trim_end().to_string();
        }

        // Continuation lines line up under the first character after the marker
        format!(
            "{}{}",
            marker,
            indent_continuation(content, marker.chars().count())
        )
    })
}

/// Language hint from a `language-*` or `lang-*` class
fn language_of(node: &Node) -> Option<&str> {
    node.attr("class")?.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
    })
}

fn code_block_rule() -> Rule {
    Rule::for_tags(PREFORMATTED_ELEMENTS, |node, _, ctx| {
        let code_node = node.element_children().find(|c| c.tag_name() == "code");

        let text = code_node.unwrap_or(node).text_content();
        let code = text.trim_end_matches('\n');
        if code.trim().is_empty() {
            return String::new();
        }

        match ctx.options.code_block_style {
            CodeBlockStyle::Fenced => {
                let language = code_node
                    .and_then(language_of)
                    .or_else(|| language_of(node))
                    .unwrap_or("");
                let fence = code_fence(code, &ctx.options.fence);
                format!("{}{}\n{}\n{}", fence, language, code, fence)
            }
            CodeBlockStyle::Indented => code
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {}", line)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    })
    .opaque()
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, ctx| ctx.options.hr.clone()).opaque()
}

/// Escape pipes when the text lands in a table cell
fn cell_pipes(text: String, in_table_cell: bool) -> String {
    if in_table_cell {
        text.replace('|', "\\|")
    } else {
        text
    }
}

/// Link or image destination, bracketed when it contains spaces
fn destination(url: &str, in_table_cell: bool) -> String {
    let url = if url.contains(char::is_whitespace) || url.contains('<') || url.contains('>') {
        format!(
            "<{}>",
            url.replace('<', "%3C").replace('>', "%3E").replace(' ', "%20")
        )
    } else {
        url.replace('(', "\\(").replace(')', "\\)")
    };
    cell_pipes(url, in_table_cell)
}

/// ` "title"` suffix, empty when there is no title
fn title_part(node: &Node, in_table_cell: bool) -> String {
    let title = collapse_whitespace(&clean_attribute(node.attr("title")));
    if title.is_empty() {
        String::new()
    } else {
        let title = format!(" \"{}\"", title.replace('"', "\\\""));
        cell_pipes(title, in_table_cell)
    }
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, ctx| {
        let href = clean_attribute(node.attr("href"));
        let text = single_line(content);

        if href.is_empty() {
            return if text.is_empty() {
                String::new()
            } else {
                format!("[{}]", text)
            };
        }

        let text = if text.is_empty() {
            escape_markdown(&href, ctx.escape_mode())
        } else {
            text
        };

        format!(
            "[{}]({}{})",
            text,
            destination(&href, ctx.in_table_cell),
            title_part(node, ctx.in_table_cell)
        )
    })
}

fn emphasis_rule() -> Rule {
    Rule::new(Filter::tags(&["em", "i"]), |_, content, ctx| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = ctx.options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::new(Filter::tags(&["strong", "b"]), |_, content, ctx| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = &ctx.options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strikethrough_rule() -> Rule {
    Rule::new(Filter::tags(&["del", "s", "strike"]), |_, content, _| {
        if content.trim().is_empty() {
            return String::new();
        }
        format!("~~{}~~", content)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        // Match <code> that is NOT inside <pre>
        Filter::predicate(|node, ctx| node.tag_name() == "code" && !ctx.in_pre),
        |node, _, ctx| {
            let content = collapse_whitespace(&node.text_content());
            if content.is_empty() {
                return String::new();
            }
            // GFM splits table cells on pipes even inside code spans
            code_span(&cell_pipes(content, ctx.in_table_cell))
        },
    )
    .opaque()
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, ctx| {
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return String::new();
        }

        let alt = collapse_whitespace(&clean_attribute(node.attr("alt")));
        format!(
            "![{}]({}{})",
            escape_markdown(&alt, ctx.escape_mode()),
            destination(&src, ctx.in_table_cell),
            title_part(node, ctx.in_table_cell)
        )
    })
    .opaque()
}

fn is_cell(node: &Node) -> bool {
    matches!(node.tag_name(), "th" | "td")
}

fn colspan(cell: &Node) -> usize {
    cell.attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, 1000)
}

fn column_count(row: &Node) -> usize {
    row.element_children().filter(|c| is_cell(c)).map(colspan).sum()
}

/// Rows of a table with at least one cell, with the section each sits in
fn table_rows(table: &Node) -> Vec<(&str, &Node)> {
    let mut rows = Vec::new();
    for child in table.element_children() {
        match child.tag_name() {
            "tr" => rows.push(("table", child)),
            section @ ("thead" | "tbody" | "tfoot") => {
                for tr in child.element_children().filter(|c| c.tag_name() == "tr") {
                    rows.push((section, tr));
                }
            }
            _ => {}
        }
    }
    rows.retain(|(_, row)| column_count(row) > 0);
    rows
}

fn is_heading_row(section: &str, row: &Node) -> bool {
    section == "thead"
        || row
            .element_children()
            .filter(|c| is_cell(c))
            .all(|c| c.tag_name() == "th")
}

fn alignment(cell: &Node) -> &'static str {
    let align = cell
        .attr("align")
        .map(str::to_lowercase)
        .or_else(|| {
            cell.attr("style").and_then(|style| {
                style.split(';').find_map(|decl| {
                    let (prop, value) = decl.split_once(':')?;
                    (prop.trim().eq_ignore_ascii_case("text-align"))
                        .then(|| value.trim().to_lowercase())
                })
            })
        })
        .unwrap_or_default();

    match align.as_str() {
        "left" => ":---",
        "right" => "---:",
        "center" => ":---:",
        _ => "---",
    }
}

fn separator_row(heading: Option<&Node>, columns: usize) -> String {
    let mut markers: Vec<&str> = heading
        .map(|row| {
            row.element_children()
                .filter(|c| is_cell(c))
                .flat_map(|cell| std::iter::repeat(alignment(cell)).take(colspan(cell)))
                .collect()
        })
        .unwrap_or_default();
    markers.resize(columns, "---");
    format!("| {} |", markers.join(" | "))
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |node, content, _| {
        let rows = table_rows(node);
        let body = content.trim_matches('\n');
        if rows.is_empty() || body.trim().is_empty() {
            return String::new();
        }

        let columns = rows.iter().map(|(_, row)| column_count(row)).max().unwrap_or(1);
        let (section, first) = rows[0];
        let heading = is_heading_row(section, first).then_some(first);

        let (header, rest) = match heading {
            Some(row) => {
                let (line, rest) = body.split_once('\n').unwrap_or((body, ""));
                let padding = "  |".repeat(columns - column_count(row));
                (format!("{}{}", line, padding), rest)
            }
            // GFM tables need a header row; synthesise an empty one
            None => (format!("|{}", "  |".repeat(columns)), body),
        };

        let mut table = format!("{}\n{}", header, separator_row(heading, columns));
        if !rest.is_empty() {
            table.push('\n');
            table.push_str(rest);
        }

        let caption = node
            .element_children()
            .find(|c| c.tag_name() == "caption")
            .map(|c| {
                let text = collapse_whitespace(&c.text_content());
                escape_markdown(text.trim(), EscapeMode::Prose)
            })
            .filter(|c| !c.is_empty());
        match caption {
            Some(caption) => format!("{}\n\n{}", caption, table),
            None => table,
        }
    })
}

fn table_section_rule() -> Rule {
    Rule::for_tags(&["thead", "tbody", "tfoot"], |_, content, _| {
        content.trim_matches('\n').to_string()
    })
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |_, content, _| {
        if content.trim().is_empty() {
            String::new()
        } else {
            format!("|{}", content)
        }
    })
}

fn table_cell_rule() -> Rule {
    Rule::new(Filter::tags(&["th", "td"]), |node, content, _| {
        let cell = format!(" {} |", single_line(content));
        let extra = "  |".repeat(colspan(node) - 1);
        format!("{}{}", cell, extra)
    })
}
