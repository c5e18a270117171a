//! Utility functions and constants for HTML processing.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Repeat a string n times
pub fn repeat(s: &str, n: usize) -> String {
    s.repeat(n)
}

/// Escape the Markdown characters that change inline meaning
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Collapse whitespace runs into single spaces. Non-breaking spaces are kept.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Fence marker opening or closing a fenced code block, if `line` is one
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

/// Trim surrounding newlines and collapse runs of blank lines to one, except
/// inside fenced code blocks where blank lines are content.
pub fn collapse_blank_lines(output: &str) -> String {
    let mut processed = String::with_capacity(output.len());
    let mut fence: Option<(char, usize)> = None;
    let mut blank_run = 0;

    for line in output.trim_matches('\n').split('\n') {
        match (fence, fence_marker(line)) {
            (None, Some(open)) => fence = Some(open),
            (Some((marker, len)), Some((found, found_len)))
                if found == marker
                    && found_len >= len
                    && line.trim().chars().all(|c| c == marker) =>
            {
                fence = None;
            }
            (Some(_), _) => {
                processed.push_str(line);
                processed.push('\n');
                continue;
            }
            _ => {}
        }

        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            processed.push('\n');
        } else {
            blank_run = 0;
            processed.push_str(line.trim_end_matches(' ').trim_end_matches('\t'));
            if line.ends_with("  ") {
                // Hard line break
                processed.push_str("  ");
            }
            processed.push('\n');
        }
    }

    processed.truncate(processed.trim_end_matches('\n').len());
    processed
}
