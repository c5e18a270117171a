//! Markdown rendering, the first half of the forward pipeline.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use tracing::debug;

use crate::highlight::{default_highlighter, Highlighter};
use crate::language::LANG_PREFIX;

/// Renders Markdown source to generic HTML
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with tables and strikethrough.
///
/// Code blocks are emitted as `<pre><code class="lang-<id>">` with their
/// content run through the configured [`Highlighter`].
pub struct CmarkRenderer {
    highlighter: Box<dyn Highlighter>,
    options: Options,
}

impl CmarkRenderer {
    pub fn new() -> Self {
        Self::with_highlighter(default_highlighter())
    }

    pub fn with_highlighter(highlighter: Box<dyn Highlighter>) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { highlighter, options }
    }

    fn code_block(&self, language: &str, code: &str) -> String {
        let class = if language.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}{}\"", LANG_PREFIX, language.replace('"', "&quot;"))
        };
        format!(
            "<pre><code{}>{}</code></pre>\n",
            class,
            self.highlighter.highlight(code, language)
        )
    }
}

impl Default for CmarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut events = Vec::new();
        let mut code: Option<(String, String)> = None;
        let mut blocks = 0;

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or("").to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some((language, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buffer)) = code.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, buffer)) = code.take() {
                        blocks += 1;
                        events.push(Event::Html(self.code_block(&language, &buffer).into()));
                    }
                }
                other => events.push(other),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        debug!(code_blocks = blocks, bytes = output.len(), "rendered markdown");
        output
    }
}
