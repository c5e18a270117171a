//! HTML re-indentation: block elements on their own lines, nested content
//! indented, inline markup and text kept on the line of their block.

use super::{BeautifyError, Beautifier, Printer};
use crate::markdown::utilities::is_block;

/// Elements placed on their own line in addition to the block elements
const LINE_ELEMENTS: &[&str] = &["head", "title", "meta", "link", "script", "style", "option", "select", "template"];

/// Elements whose content is copied verbatim
const RAW_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Formatter for `html` code blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupBeautifier;

impl Beautifier for MarkupBeautifier {
    fn beautify(&self, source: &str) -> Result<String, BeautifyError> {
        let mut printer = Printer::new();
        let mut open: Vec<String> = Vec::new();
        let mut pos = 0;

        while pos < source.len() {
            let rest = &source[pos..];

            if !rest.starts_with('<') {
                let end = rest.find('<').unwrap_or(rest.len());
                write_text(&mut printer, &rest[..end]);
                pos += end;
                continue;
            }

            if rest.starts_with("<!--") {
                let end = rest.find("-->").ok_or(BeautifyError::Unterminated {
                    what: "comment",
                    offset: pos,
                })?;
                printer.write(&rest[..end + 3]);
                pos += end + 3;
                continue;
            }

            let end = tag_end(rest).ok_or(BeautifyError::Unterminated { what: "tag", offset: pos })?;
            let tag = &rest[..end];
            pos += end;

            if tag.starts_with("<!") || tag.starts_with("<?") {
                printer.newline();
                printer.write(tag);
                printer.newline();
                continue;
            }

            let closing = tag.starts_with("</");
            let name = tag_name(tag);
            let on_own_line = is_block(&name) || LINE_ELEMENTS.contains(&name.as_str());

            if closing {
                let Some(index) = open.iter().rposition(|n| *n == name) else {
                    // Stray close tag: keep it, indentation unchanged
                    printer.write(tag);
                    continue;
                };
                for _ in index..open.len() {
                    printer.dedent();
                }
                open.truncate(index);
                if on_own_line {
                    printer.newline();
                }
                printer.write(tag);
                if on_own_line {
                    printer.newline();
                }
                continue;
            }

            if on_own_line {
                printer.newline();
            }
            printer.write(tag);

            let self_closing = tag.ends_with("/>") || VOID_ELEMENTS.contains(&name.as_str());
            if self_closing {
                if on_own_line {
                    printer.newline();
                }
                continue;
            }

            if RAW_ELEMENTS.contains(&name.as_str()) {
                let close = format!("</{}", name);
                let content_end = find_ignore_case(&source[pos..], &close).ok_or(BeautifyError::Unbalanced {
                    open: '<',
                    offset: pos - end,
                })?;
                let close_end = tag_end(&source[pos + content_end..]).ok_or(BeautifyError::Unterminated {
                    what: "tag",
                    offset: pos + content_end,
                })?;
                printer.write(&source[pos..pos + content_end + close_end]);
                pos += content_end + close_end;
                if on_own_line {
                    printer.newline();
                }
                continue;
            }

            open.push(name);
            printer.indent();
            if on_own_line {
                printer.newline();
            }
        }

        Ok(printer.finish())
    }
}

/// Byte length of the tag at the start of `rest`, honouring quoted attribute values
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_lowercase()
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_lowercase().find(&needle.to_lowercase())
}

fn write_text(printer: &mut Printer, text: &str) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        if !text.is_empty() {
            printer.space();
        }
        return;
    }
    if text.starts_with(char::is_whitespace) {
        printer.space();
    }
    printer.write(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        printer.space();
    }
}
