//! Final clean-up of rendered Markdown.
//!
//! The tree walker keeps blank lines between blocks roughly right; this pass
//! makes the layout canonical: no trailing whitespace, at most one blank line
//! in a row, no blank lines at the edges, exactly one final newline.

/// Normalise rendered Markdown.
///
/// When `keep_hard_breaks` is set, a line ending in two or more spaces that
/// is followed by a non-blank line keeps exactly two trailing spaces (a
/// two-space hard break). Lines inside fenced code blocks are left as-is.
pub fn post_process(markdown: &str, keep_hard_breaks: bool) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut fence: Option<(char, usize)> = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some((fence_char, fence_len)) = fence {
            if closes_fence(line, fence_char, fence_len) {
                fence = None;
                output.push(line.trim_end().to_string());
            } else {
                output.push((*line).to_string());
            }
            continue;
        }

        if let Some(opened) = opens_fence(line) {
            fence = Some(opened);
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            // At most one blank line in a row, none at the start
            if output.last().map_or(true, |last| last.is_empty()) {
                continue;
            }
            output.push(String::new());
            continue;
        }

        let next_has_content = lines
            .get(i + 1)
            .is_some_and(|next| !next.trim().is_empty());
        if keep_hard_breaks && next_has_content && line.ends_with("  ") {
            output.push(format!("{trimmed}  "));
        } else {
            output.push(trimmed.to_string());
        }
    }

    while output.last().is_some_and(|last| last.is_empty()) {
        output.pop();
    }

    if output.is_empty() {
        return String::new();
    }

    let mut result = output.join("\n");
    result.push('\n');
    result
}

/// `line` without indentation and any leading blockquote or list markers
fn strip_containers(line: &str) -> &str {
    let mut rest = line.trim_start_matches(' ');
    loop {
        if let Some(inner) = rest.strip_prefix('>') {
            rest = inner.trim_start_matches(' ');
            continue;
        }

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let marker = if digits > 0 {
            rest[digits..].strip_prefix(|c: char| c == '.' || c == ')')
        } else {
            rest.strip_prefix(|c: char| matches!(c, '-' | '*' | '+'))
        };
        match marker {
            Some(inner) if inner.starts_with(' ') => rest = inner.trim_start_matches(' '),
            _ => return rest,
        }
    }
}

/// If `line` opens a fenced code block, its fence character and length
fn opens_fence(line: &str) -> Option<(char, usize)> {
    let body = strip_containers(line);
    let fence_char = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = body.chars().take_while(|c| *c == fence_char).count();
    if len < 3 {
        return None;
    }
    // A backtick fence's info string may not contain backticks
    if fence_char == '`' && body[len..].contains('`') {
        return None;
    }
    Some((fence_char, len))
}

fn closes_fence(line: &str, fence_char: char, fence_len: usize) -> bool {
    let body = strip_containers(line).trim_end();
    body.len() >= fence_len && body.chars().all(|c| c == fence_char)
}
