//! Line model for code and quote blocks.
//!
//! The target editor collapses whitespace and drops empty paragraphs, so block
//! content is split into one paragraph per source line. Inline markup (for
//! example highlighter spans covering several lines) is closed at the end of
//! each line and re-opened on the next, which keeps every line balanced HTML.

use wxmd_dom::{escape_text, Fragment, NodeData, NodeId};

use crate::language::Language;

/// One source line of a code or quote block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeLine {
    html: String,
    text: String,
    indent: usize,
    embeds: bool,
}

impl CodeLine {
    /// Balanced inline HTML of the line, leading whitespace already replaced
    /// by `&nbsp;` entities
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Plain text of the line
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the leading whitespace run, in characters
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Whether the line holds an embedded element such as an image
    pub fn has_embeds(&self) -> bool {
        self.embeds
    }

    /// No visible text and no embedded element. Inline tags left empty by
    /// the split do not count as content.
    pub fn is_blank(&self) -> bool {
        !self.embeds && self.text.trim().is_empty()
    }
}

/// A code block: its language plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub language: Language,
    pub lines: Vec<CodeLine>,
}

impl CodeBlock {
    /// Describe a `pre` element: the language comes from the class of its first
    /// element child, the lines from that child's content (or from the `pre`
    /// itself when it has no element child).
    pub fn from_pre(fragment: &Fragment, pre: NodeId, prefixes: &[&str]) -> Self {
        let code = fragment.first_element_child(pre);
        let language = Language::from_element(code.and_then(|id| fragment.element(id)), prefixes);
        Self {
            language,
            lines: split_lines(fragment, code.unwrap_or(pre)),
        }
    }
}

/// Paragraph classes used when rendering lines
#[derive(Debug, Clone, Copy, Default)]
pub struct LineStyle<'a> {
    /// Class of paragraphs holding a non-blank line
    pub line_class: Option<&'a str>,
    /// Class of the placeholder paragraph standing in for a blank line
    pub break_class: Option<&'a str>,
}

/// Render lines as paragraphs. Blank lines become `<p><br></p>` placeholders.
pub fn render_lines(lines: &[CodeLine], style: LineStyle<'_>) -> String {
    let mut out = String::new();
    for line in lines {
        let class = if line.is_blank() {
            style.break_class
        } else {
            style.line_class
        };
        out.push_str("<p");
        if let Some(class) = class.filter(|c| !c.is_empty()) {
            out.push_str(" class=\"");
            out.push_str(class);
            out.push('"');
        }
        out.push('>');
        if line.is_blank() {
            out.push_str("<br>");
        } else {
            out.push_str(&line.html);
        }
        out.push_str("</p>");
    }
    out
}

#[derive(Default)]
struct LineBuilder {
    line: CodeLine,
    started: bool,
}

impl LineBuilder {
    fn reopened(open: &[(String, String)]) -> Self {
        let mut builder = Self::default();
        for (start_tag, _) in open {
            builder.line.html.push_str(start_tag);
        }
        builder
    }

    fn push_text(&mut self, segment: &str) {
        for c in segment.chars() {
            if !self.started && c.is_whitespace() {
                self.line.indent += 1;
                self.line.html.push_str("&nbsp;");
            } else {
                self.started = true;
                let mut buf = [0u8; 4];
                escape_text(c.encode_utf8(&mut buf), &mut self.line.html);
            }
            self.line.text.push(c);
        }
    }

    fn finish(mut self, open: &[(String, String)]) -> CodeLine {
        for (_, name) in open.iter().rev() {
            self.line.html.push_str("</");
            self.line.html.push_str(name);
            self.line.html.push('>');
        }
        self.line
    }
}

/// Split the content of `id` into lines.
///
/// Leading blank lines and trailing blank lines are dropped; the indentation
/// of the first content line is kept.
pub fn split_lines(fragment: &Fragment, id: NodeId) -> Vec<CodeLine> {
    enum Step {
        Enter(NodeId),
        Exit,
    }

    let mut lines = Vec::new();
    let mut open: Vec<(String, String)> = Vec::new();
    let mut current = LineBuilder::default();
    let mut stack: Vec<Step> = fragment.children(id).iter().rev().map(|&c| Step::Enter(c)).collect();

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Exit => {
                if let Some((_, name)) = open.pop() {
                    current.line.html.push_str("</");
                    current.line.html.push_str(&name);
                    current.line.html.push('>');
                }
                continue;
            }
            Step::Enter(node) => node,
        };

        match fragment.data(node) {
            NodeData::Text(text) => {
                let mut segments = text.split('\n').peekable();
                while let Some(segment) = segments.next() {
                    if segments.peek().is_some() {
                        current.push_text(segment.strip_suffix('\r').unwrap_or(segment));
                        let finished = std::mem::replace(&mut current, LineBuilder::reopened(&open));
                        lines.push(finished.finish(&open));
                    } else {
                        current.push_text(segment);
                    }
                }
            }
            NodeData::Element(element) if element.name() == "br" => {
                let finished = std::mem::replace(&mut current, LineBuilder::reopened(&open));
                lines.push(finished.finish(&open));
            }
            NodeData::Element(element) if element.is_void() => {
                current.started = true;
                current.line.embeds = true;
                current.line.html.push_str(&element.start_tag());
            }
            NodeData::Element(element) => {
                current.line.html.push_str(&element.start_tag());
                open.push((element.start_tag(), element.name().to_string()));
                stack.push(Step::Exit);
                stack.extend(fragment.children(node).iter().rev().map(|&c| Step::Enter(c)));
            }
            NodeData::Comment(_) | NodeData::Fragment => {}
        }
    }
    lines.push(current.finish(&open));

    let first = lines.iter().position(|line| !line.is_blank());
    let last = lines.iter().rposition(|line| !line.is_blank());
    match (first, last) {
        (Some(first), Some(last)) => lines.drain(first..=last).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LANG_PREFIX;

    fn lines_of(html: &str) -> Vec<CodeLine> {
        let fragment = Fragment::parse(html);
        let root = fragment.root();
        split_lines(&fragment, root)
    }

    #[test]
    fn test_split_plain_text() {
        let lines = lines_of("a\n  b\n\nc\n");
        let html: Vec<&str> = lines.iter().map(CodeLine::html).collect();
        assert_eq!(html, vec!["a", "&nbsp;&nbsp;b", "", "c"]);
        assert_eq!(lines[1].indent(), 2);
        assert!(lines[2].is_blank());
    }

    #[test]
    fn test_trims_outer_blank_lines_but_keeps_first_indent() {
        let lines = lines_of("\n\n    x\ny\n\n  \n");
        let text: Vec<&str> = lines.iter().map(CodeLine::text).collect();
        assert_eq!(text, vec!["    x", "y"]);
        assert_eq!(lines[0].indent(), 4);
    }

    #[test]
    fn test_reopens_spans_across_lines() {
        let lines = lines_of(r#"<span class="c">/* a
  b */</span> x"#);
        assert_eq!(lines[0].html(), r#"<span class="c">/* a</span>"#);
        assert_eq!(lines[1].html(), r#"<span class="c">&nbsp;&nbsp;b */</span> x"#);
        assert_eq!(lines[1].indent(), 2);
    }

    #[test]
    fn test_indent_counts_tabs_and_escapes_text() {
        let lines = lines_of("\t if (a &lt; b)");
        assert_eq!(lines[0].indent(), 2);
        assert_eq!(lines[0].html(), "&nbsp;&nbsp;if (a &lt; b)");
    }

    #[test]
    fn test_embedded_elements_are_content() {
        let lines = lines_of("\n<img src=\"a.png\">\n\n  <input type=\"checkbox\"> done\n");
        let html: Vec<&str> = lines.iter().map(CodeLine::html).collect();
        assert_eq!(
            html,
            vec![r#"<img src="a.png">"#, "", r#"&nbsp;&nbsp;<input type="checkbox"> done"#]
        );
        assert!(lines[0].has_embeds());
        assert!(!lines[0].is_blank());
        assert!(lines[1].is_blank());
    }

    #[test]
    fn test_empty_reopened_span_is_blank() {
        let lines = lines_of("<span class=\"c\">/* a\n\nb */</span>");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].html(), r#"<span class="c"></span>"#);
        assert!(lines[1].is_blank());
    }

    #[test]
    fn test_render_lines() {
        let lines = lines_of("a\n\nb");
        let html = render_lines(
            &lines,
            LineStyle {
                line_class: Some("line"),
                break_class: Some("lbr"),
            },
        );
        assert_eq!(html, r#"<p class="line">a</p><p class="lbr"><br></p><p class="line">b</p>"#);
        assert_eq!(render_lines(&lines, LineStyle::default()), "<p>a</p><p><br></p><p>b</p>");
    }

    #[test]
    fn test_code_block_from_pre() {
        let fragment = Fragment::parse("<pre><code class=\"lang-js\">var a;\nvar b;\n</code></pre>");
        let pre = fragment.first_element_child(fragment.root()).unwrap();
        let block = CodeBlock::from_pre(&fragment, pre, &[LANG_PREFIX]);
        assert_eq!(block.language.id(), Some("js"));
        assert_eq!(block.lines.len(), 2);
    }
}
