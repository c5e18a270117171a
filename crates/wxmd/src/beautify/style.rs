//! CSS re-indentation: one selector block per group, one declaration per line.

use super::{BeautifyError, Beautifier, Printer};

/// Formatter for `css` code blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleBeautifier;

impl Beautifier for StyleBeautifier {
    fn beautify(&self, source: &str) -> Result<String, BeautifyError> {
        let mut printer = Printer::new();
        let mut segment = String::new();
        let mut open: Vec<usize> = Vec::new();
        let mut paren_depth = 0usize;
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '/' if chars.peek().is_some_and(|&(_, n)| n == '*') => {
                    let end = source[offset + 2..].find("*/").ok_or(BeautifyError::Unterminated {
                        what: "comment",
                        offset,
                    })?;
                    let comment = &source[offset..offset + end + 4];
                    flush_comment(&mut printer, &mut segment, comment);
                    while chars.peek().is_some_and(|&(i, _)| i < offset + comment.len()) {
                        chars.next();
                    }
                }
                '"' | '\'' => {
                    segment.push(c);
                    let mut escaped = false;
                    let mut closed = false;
                    for (_, s) in chars.by_ref() {
                        segment.push(s);
                        if escaped {
                            escaped = false;
                        } else if s == '\\' {
                            escaped = true;
                        } else if s == c {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(BeautifyError::Unterminated {
                            what: "string",
                            offset,
                        });
                    }
                }
                '(' => {
                    paren_depth += 1;
                    segment.push(c);
                }
                ')' => {
                    paren_depth = paren_depth
                        .checked_sub(1)
                        .ok_or(BeautifyError::UnexpectedClose { found: c, offset })?;
                    segment.push(c);
                }
                ';' if paren_depth == 0 => {
                    write_declaration(&mut printer, &segment, true);
                    segment.clear();
                }
                '{' if paren_depth == 0 => {
                    if open.is_empty() && !printer.is_line_start() {
                        printer.newline();
                    }
                    if open.is_empty() {
                        printer.blank_line();
                    }
                    printer.write(&selector(&segment));
                    printer.space();
                    printer.write("{");
                    printer.indent();
                    printer.newline();
                    segment.clear();
                    open.push(offset);
                }
                '}' if paren_depth == 0 => {
                    if open.pop().is_none() {
                        return Err(BeautifyError::UnexpectedClose { found: c, offset });
                    }
                    write_declaration(&mut printer, &segment, false);
                    segment.clear();
                    printer.dedent();
                    printer.newline();
                    printer.write("}");
                    printer.newline();
                }
                _ => segment.push(c),
            }
        }

        if let Some(offset) = open.pop() {
            return Err(BeautifyError::Unbalanced { open: '{', offset });
        }
        if paren_depth > 0 {
            let offset = source.rfind('(').unwrap_or(0);
            return Err(BeautifyError::Unbalanced { open: '(', offset });
        }
        write_declaration(&mut printer, &segment, false);
        Ok(printer.finish())
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Selector list with normalized comma spacing
fn selector(segment: &str) -> String {
    segment
        .split(',')
        .map(collapse)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write `prop: value` on its own line. At-rules and bare values are kept as
/// written, whitespace collapsed.
fn write_declaration(printer: &mut Printer, segment: &str, terminated: bool) {
    let text = collapse(segment);
    if text.is_empty() {
        return;
    }
    printer.newline();
    match text.split_once(':') {
        Some((property, value)) if !text.starts_with('@') => {
            printer.write(property.trim());
            printer.write(":");
            printer.space();
            printer.write(value.trim());
        }
        _ => printer.write(&text),
    }
    if terminated {
        printer.write(";");
    }
    printer.newline();
}

fn flush_comment(printer: &mut Printer, segment: &mut String, comment: &str) {
    if segment.trim().is_empty() {
        segment.clear();
    }
    printer.newline();
    printer.write(comment);
    printer.newline();
}
