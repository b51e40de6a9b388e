//! Depth-first tree walker.
//!
//! Children are rendered before their parent's rule runs. Block pieces are
//! joined with a blank line (one newline inside list and table containers);
//! inline pieces are concatenated with whitespace collapsed at the seams.

use sitedown_core::{escape_continuation, escape_markdown, EscapeMode, Options};

use crate::context::{Context, ListFrame};
use crate::node::Node;
use crate::rules::Rules;
use crate::whitespace::{
    collapse_whitespace, flanking_whitespace, is_blank, push_inline, strip_blank_text, Display,
    DisplayTable,
};
use crate::StructuralError;

/// Largest ordered-list number a CommonMark marker can carry (nine digits)
const MAX_LIST_NUMBER: u64 = 999_999_999;

/// One conversion over borrowed configuration
pub(crate) struct Walker<'a> {
    pub rules: &'a Rules,
    pub display: &'a DisplayTable,
    pub options: &'a Options,
}

impl<'a> Walker<'a> {
    /// Render `root` to Markdown, before post-processing
    pub fn walk(&self, root: &'a Node) -> Result<String, StructuralError> {
        let limit = self.options.max_depth;
        if let Some(depth) = first_depth_over(root, limit) {
            tracing::warn!(depth, limit, "node tree too deep; conversion aborted");
            return Err(StructuralError::DepthExceeded { depth, limit });
        }

        let ctx = Context::root(self.options);
        Ok(match root {
            Node::Element(_) => self.render_element(root, ctx),
            Node::Text(text) => {
                escape_markdown(collapse_whitespace(text).trim(), EscapeMode::Prose)
            }
            Node::Comment(_) => String::new(),
        })
    }

    fn render_element(&self, node: &'a Node, ctx: Context<'a>) -> String {
        let rule = self.rules.resolve(node, &ctx);
        if !rule.descend {
            return rule.replace(node, "", &ctx);
        }

        let display = self.display.node_display(node);
        let content = self.render_children(node, display, ctx);
        if display.is_block() || ctx.in_pre {
            return rule.replace(node, &content, &ctx);
        }

        // Keep flanking whitespace outside inline delimiters
        let (leading, body, trailing) = flanking_whitespace(&content);
        let rendered = rule.replace(node, body, &ctx);
        let space = |s: &str| if s.is_empty() { "" } else { " " };
        if rendered.is_empty() {
            return space(&format!("{}{}", leading, trailing)).to_string();
        }
        format!("{}{}{}", space(leading), rendered, space(trailing))
    }

    fn render_children(&self, node: &'a Node, display: Display, ctx: Context<'a>) -> String {
        let child_ctx = ctx.descend(node, display);
        let parent_tag = node.tag_name();
        let children = node.children();

        let ordered = parent_tag == "ol";
        let start = if ordered {
            node.attr("start")
                .and_then(|start| start.trim().parse::<u64>().ok())
                .map(|start| start.min(MAX_LIST_NUMBER))
                .unwrap_or(1)
        } else {
            1
        };

        let escape_mode = child_ctx.escape_mode();
        let mut joiner = Joiner::new(parent_tag, child_ctx.in_pre, escape_mode);
        let mut element_index = 0;
        let mut item_number = start;

        for (index, child) in children.iter().enumerate() {
            match child {
                Node::Comment(_) => {}
                Node::Text(text) => {
                    if child_ctx.in_pre {
                        joiner.push_inline(text);
                    } else if is_blank(text) {
                        if !strip_blank_text(children, index, display.is_block(), self.display) {
                            joiner.push_inline(" ");
                        }
                    } else {
                        let text = escape_markdown(&collapse_whitespace(text), escape_mode);
                        joiner.push_inline(&text);
                    }
                }
                Node::Element(element) => {
                    let mut ctx = child_ctx.at(element_index);
                    element_index += 1;

                    if element.tag() == "li" && matches!(parent_tag, "ul" | "ol") {
                        ctx = ctx.with_item(ListFrame {
                            ordered,
                            number: item_number,
                            depth: child_ctx.list_depth,
                        });
                        item_number = (item_number + 1).min(MAX_LIST_NUMBER);
                    }

                    let piece = self.render_element(child, ctx);
                    if self.display.node_display(child).is_block() {
                        joiner.push_block(&piece, element.tag());
                    } else {
                        joiner.push_inline(&piece);
                    }
                }
            }
        }

        joiner.finish()
    }
}

/// Separator placed before a block child of `parent`
fn block_separator(parent: &str, child: &str) -> &'static str {
    match parent {
        "tr" => "",
        "ul" | "ol" | "table" | "thead" | "tbody" | "tfoot" => "\n",
        "li" if matches!(child, "ul" | "ol") => "\n",
        _ => "\n\n",
    }
}

/// Accumulates the rendered children of one element
struct Joiner<'p> {
    out: String,
    parent: &'p str,
    verbatim: bool,
    escape_mode: EscapeMode,
    after_block: bool,
}

impl<'p> Joiner<'p> {
    fn new(parent: &'p str, verbatim: bool, escape_mode: EscapeMode) -> Self {
        Self {
            out: String::new(),
            parent,
            verbatim,
            escape_mode,
            after_block: false,
        }
    }

    fn push_block(&mut self, piece: &str, tag: &str) {
        let body = piece.trim_matches('\n');
        if body.trim().is_empty() {
            return;
        }
        self.separate(tag);
        self.out.push_str(body);
        self.after_block = true;
    }

    fn push_inline(&mut self, piece: &str) {
        if self.verbatim {
            self.out.push_str(piece);
            return;
        }
        if self.after_block {
            let piece = piece.trim_start();
            if piece.is_empty() {
                return;
            }
            self.separate("");
            self.out.push_str(piece);
            self.after_block = false;
            return;
        }
        if self.escape_mode == EscapeMode::Code {
            push_inline(&mut self.out, piece);
            return;
        }
        // A marker split across pieces only shows once they share a line
        let line = self.out.rsplit('\n').next().unwrap_or_default();
        let piece = escape_continuation(line, piece);
        push_inline(&mut self.out, &piece);
    }

    fn separate(&mut self, tag: &str) {
        let end = self.out.trim_end().len();
        self.out.truncate(end);
        if !self.out.is_empty() {
            self.out.push_str(block_separator(self.parent, tag));
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Depth of the first element found below `limit` levels, if any.
///
/// Iterative so a pathological tree cannot overflow the stack before the
/// walker even starts.
fn first_depth_over(root: &Node, limit: usize) -> Option<usize> {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > limit {
            return Some(depth);
        }
        stack.extend(node.element_children().map(|child| (child, depth + 1)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn walk(node: &Node) -> String {
        let rules = Rules::new();
        let display = DisplayTable::default();
        let options = Options::default();
        Walker {
            rules: &rules,
            display: &display,
            options: &options,
        }
        .walk(node)
        .unwrap()
    }

    fn nested(tag: &str, levels: usize) -> Node {
        let mut node = Node::text("deep");
        for _ in 0..levels {
            node = Node::element(tag).with_child(node);
        }
        node
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let root = Node::fragment_of(vec![
            Node::element("p").with_child(Node::text("one")),
            Node::text("\n  "),
            Node::element("p").with_child(Node::text("two")),
        ]);
        assert_eq!(walk(&root), "one\n\ntwo");
    }

    #[test]
    fn test_inline_whitespace_moves_outside_delimiters() {
        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("em").with_child(Node::text(" b ")))
            .with_child(Node::text("c"));
        assert_eq!(walk(&p), "a _b_ c");
    }

    #[test]
    fn test_blank_inline_element_keeps_one_space() {
        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("strong").with_child(Node::text("  ")))
            .with_child(Node::text("b"));
        assert_eq!(walk(&p), "a b");
    }

    #[test]
    fn test_ordered_list_start() {
        let ol = Node::element_with_attrs("ol", vec![("start", "4")])
            .with_child(Node::element("li").with_child(Node::text("four")))
            .with_child(Node::element("li").with_child(Node::text("five")));
        assert_eq!(walk(&ol), "4. four\n5. five");
    }

    #[test]
    fn test_ordered_list_start_is_clamped() {
        let ol = Node::element_with_attrs("ol", vec![("start", "18446744073709551615")])
            .with_child(Node::element("li").with_child(Node::text("a")))
            .with_child(Node::element("li").with_child(Node::text("b")));
        assert_eq!(walk(&ol), "999999999. a\n999999999. b");

        let ol = Node::element_with_attrs("ol", vec![("start", "999999998")])
            .with_child(Node::element("li").with_child(Node::text("a")))
            .with_child(Node::element("li").with_child(Node::text("b")))
            .with_child(Node::element("li").with_child(Node::text("c")));
        assert_eq!(walk(&ol), "999999998. a\n999999999. b\n999999999. c");
    }

    #[test]
    fn test_marker_split_across_nodes_is_escaped() {
        let p = Node::element("p")
            .with_child(Node::element("span").with_child(Node::text("1")))
            .with_child(Node::text(". Intro"));
        assert_eq!(walk(&p), "1\\. Intro");

        let p = Node::element("p")
            .with_child(Node::text("2"))
            .with_child(Node::element("span").with_child(Node::text(") Two")));
        assert_eq!(walk(&p), "2\\) Two");

        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("br"))
            .with_child(Node::element("span").with_child(Node::text("3")))
            .with_child(Node::text(". c"));
        assert_eq!(walk(&p), "a\\\n3\\. c");
    }

    #[test]
    fn test_split_marker_mid_line_untouched() {
        let p = Node::element("p")
            .with_child(Node::text("Step "))
            .with_child(Node::element("span").with_child(Node::text("1")))
            .with_child(Node::text(". Intro"));
        assert_eq!(walk(&p), "Step 1. Intro");
    }

    #[test]
    fn test_pre_text_is_verbatim() {
        let pre = Node::element("pre").with_child(
            Node::element("code").with_child(Node::text("fn main() {\n    *x = 1;\n}\n")),
        );
        assert_eq!(walk(&pre), "```\nfn main() {\n    *x = 1;\n}\n```");
    }

    #[test]
    fn test_comments_are_dropped() {
        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::comment("hidden"))
            .with_child(Node::text("b"));
        assert_eq!(walk(&p), "ab");
    }

    #[test]
    fn test_root_text_node() {
        assert_eq!(walk(&Node::text("  *hi*  ")), "\\*hi\\*");
    }

    #[test]
    fn test_depth_limit() {
        let rules = Rules::new();
        let display = DisplayTable::default();
        let options = Options {
            max_depth: 8,
            ..Default::default()
        };
        let walker = Walker {
            rules: &rules,
            display: &display,
            options: &options,
        };

        assert!(walker.walk(&nested("div", 9)).is_ok());
        assert_eq!(
            walker.walk(&nested("div", 10)).unwrap_err(),
            StructuralError::DepthExceeded { depth: 9, limit: 8 }
        );
    }

    #[test]
    fn test_first_depth_over() {
        assert_eq!(first_depth_over(&nested("span", 3), 2), None);
        assert_eq!(first_depth_over(&nested("span", 4), 2), Some(3));
    }
}
