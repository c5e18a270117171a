//! Proofing: rewrite rendered Markdown HTML into paste-ready editor HTML.
//!
//! The target editor drops semantic tags it does not know (`code`, `a`),
//! collapses whitespace inside `pre` and mangles bare `pre` blocks on paste.
//! [`Proofer`] rewrites a detached copy of the markup so it survives that paste
//! handler: code and quote lines become paragraphs, indentation becomes
//! `&nbsp;`, code and links become styled spans, code blocks get wrapped in a
//! quote container and image dimensions move into inline styles.

pub mod image;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wxmd_dom::{query, Fragment, NodeId, Selector};

use crate::language::{LANGUAGE_PREFIX, LANG_PREFIX};
use crate::lines::{render_lines, split_lines, CodeBlock, LineStyle};

/// Class names and prefixes used by the proofing steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofOptions {
    /// Elements removed before anything else
    pub strip_tags: Vec<String>,

    /// Class prefixes marking the language of a code element
    pub code_language_prefixes: Vec<String>,

    /// Prefix of the language class added to proofed `pre` blocks
    pub block_language_prefix: String,

    /// Class of a paragraph holding one code line
    pub line_class: String,

    /// Class of the placeholder paragraph for a blank code line
    pub line_break_class: String,

    /// Class of the span replacing inline `code`
    pub inline_code_class: String,

    /// Class added to every `blockquote`
    pub blockquote_class: String,

    /// Class of the `blockquote` wrapped around each `pre`
    pub code_wrap_class: String,

    /// Class of the span replacing `a`
    pub link_class: String,

    /// Class added to the parent of a leading image
    pub image_wrap_class: String,
}

impl Default for ProofOptions {
    fn default() -> Self {
        Self {
            strip_tags: vec!["meta".to_string(), "link".to_string(), "script".to_string()],
            code_language_prefixes: vec![LANG_PREFIX.to_string()],
            block_language_prefix: LANGUAGE_PREFIX.to_string(),
            line_class: "line".to_string(),
            line_break_class: "lbr".to_string(),
            inline_code_class: "code".to_string(),
            blockquote_class: "blockquote".to_string(),
            code_wrap_class: "code-wrap".to_string(),
            link_class: "link".to_string(),
            image_wrap_class: "img-wrap".to_string(),
        }
    }
}

/// Counts of rewritten elements, reported at debug level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProofReport {
    pub stripped: usize,
    pub code_blocks: usize,
    pub inline_code: usize,
    pub quotes: usize,
    pub links: usize,
    pub images: usize,
}

/// The forward-pipeline transformer
#[derive(Debug, Clone, Default)]
pub struct Proofer {
    options: ProofOptions,
}

impl Proofer {
    /// Create a Proofer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Proofer with custom options
    pub fn with_options(options: ProofOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProofOptions {
        &self.options
    }

    /// Proof an HTML string. Never fails; malformed input is repaired by the
    /// parser and rewritten best-effort.
    pub fn proof(&self, html: &str) -> String {
        let mut fragment = Fragment::parse(html);
        let report = self.proof_fragment(&mut fragment);
        debug!(?report, "proofed html");
        fragment.to_html()
    }

    /// Apply every proofing step to a fragment, in order.
    pub fn proof_fragment(&self, fragment: &mut Fragment) -> ProofReport {
        let root = fragment.root();
        let mut report = ProofReport::default();

        let strip: Vec<&str> = self.options.strip_tags.iter().map(String::as_str).collect();
        if !strip.is_empty() {
            report.stripped = query::remove_all(fragment, root, &Selector::tags(&strip));
        }

        let pre = Selector::tag("pre");
        report.code_blocks = query::for_each(fragment, root, &pre, |fragment, id| {
            self.format_code_block(fragment, id)
        });

        report.inline_code = query::for_each(fragment, root, &Selector::tag("code"), |fragment, id| {
            replace_with_span(fragment, id, &self.options.inline_code_class)
        });

        report.quotes = query::for_each(fragment, root, &Selector::tag("blockquote"), |fragment, id| {
            self.format_quote(fragment, id)
        });

        query::for_each(fragment, root, &pre, |fragment, id| self.wrap_code_block(fragment, id));

        report.links = query::for_each(fragment, root, &Selector::tag("a"), |fragment, id| {
            replace_with_span(fragment, id, &self.options.link_class)
        });

        report.images = query::for_each(fragment, root, &Selector::tag("img"), |fragment, id| {
            image::mark_wrapper(fragment, id, &self.options.image_wrap_class);
            if let Some(element) = fragment.element_mut(id) {
                image::normalize_dimensions(element);
            }
        });

        report
    }

    /// One `<p class="line">` per code line and a `language-<id>` class
    fn format_code_block(&self, fragment: &mut Fragment, pre: NodeId) {
        let prefixes: Vec<&str> = self
            .options
            .code_language_prefixes
            .iter()
            .map(String::as_str)
            .collect();
        let block = CodeBlock::from_pre(fragment, pre, &prefixes);
        let html = render_lines(
            &block.lines,
            LineStyle {
                line_class: Some(&self.options.line_class),
                break_class: Some(&self.options.line_break_class),
            },
        );
        fragment.set_inner_html(pre, &html);

        if let Some(class) = block.language.class_name(&self.options.block_language_prefix) {
            if let Some(element) = fragment.element_mut(pre) {
                element.add_class(&class);
            }
        }
    }

    /// Class the quote and split its leading paragraph into line paragraphs.
    ///
    /// Only a leading `p` (or bare quote text) is split; nested block
    /// containers such as lists or inner quotes keep their structure.
    fn format_quote(&self, fragment: &mut Fragment, quote: NodeId) {
        if let Some(element) = fragment.element_mut(quote) {
            element.add_class(&self.options.blockquote_class);
        }

        let target = match fragment.first_element_child(quote) {
            Some(child) if fragment.tag_name(child) == Some("p") => child,
            Some(_) => return,
            None => quote,
        };

        let html = render_lines(&split_lines(fragment, target), LineStyle::default());
        if target == quote {
            fragment.set_inner_html(quote, &html);
            return;
        }

        let parsed = Fragment::parse(&html);
        for &child in parsed.children(parsed.root()) {
            let copy = fragment.import(&parsed, child);
            fragment.insert_before(target, copy);
        }
        fragment.detach(target);
    }

    /// Replace `pre` by `<blockquote class="code-wrap"><pre>…</pre></blockquote>`
    fn wrap_code_block(&self, fragment: &mut Fragment, pre: NodeId) {
        let clone = fragment.deep_clone(pre);
        let wrap = fragment.create_element_with_class("blockquote", &self.options.code_wrap_class);
        fragment.append(wrap, clone);
        fragment.replace(pre, wrap);
    }
}

/// Replace an element by a classed span holding the same content
fn replace_with_span(fragment: &mut Fragment, id: NodeId, class: &str) {
    let span = fragment.create_element_with_class("span", class);
    fragment.move_children(id, span);
    fragment.replace(id, span);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(html: &str) -> String {
        Proofer::new().proof(html)
    }

    #[test]
    fn test_strips_metadata() {
        assert_eq!(
            proof(r#"<meta charset="utf-8"><link rel="stylesheet" href="x.css"><p>a</p><script>alert(1)</script>"#),
            "<p>a</p>"
        );
    }

    #[test]
    fn test_code_block() {
        let html = proof("<pre><code class=\"lang-js\">var a = 1;\n\n  b();\n</code></pre>");
        assert_eq!(
            html,
            concat!(
                r#"<blockquote class="code-wrap"><pre class="language-js">"#,
                r#"<p class="line">var a = 1;</p>"#,
                r#"<p class="lbr"><br></p>"#,
                r#"<p class="line">&nbsp;&nbsp;b();</p>"#,
                "</pre></blockquote>"
            )
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let html = proof("<pre><code>x</code></pre>");
        assert_eq!(html, r#"<blockquote class="code-wrap"><pre><p class="line">x</p></pre></blockquote>"#);
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(
            proof("<p>use <code>a &lt; b</code> here</p>"),
            r#"<p>use <span class="code">a &lt; b</span> here</p>"#
        );
    }

    #[test]
    fn test_blockquote_lines() {
        assert_eq!(
            proof("<blockquote>\n<p>first\n  second</p>\n<p>tail</p>\n</blockquote>"),
            "<blockquote class=\"blockquote\">\n<p>first</p><p>&nbsp;&nbsp;second</p>\n<p>tail</p>\n</blockquote>"
        );
    }

    #[test]
    fn test_blockquote_with_nested_list_keeps_structure() {
        assert_eq!(
            proof("<blockquote><ul><li>a</li></ul></blockquote>"),
            r#"<blockquote class="blockquote"><ul><li>a</li></ul></blockquote>"#
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(proof(r#"<a href="x">hi</a>"#), r#"<span class="link">hi</span>"#);
    }

    #[test]
    fn test_images() {
        assert_eq!(
            proof(r#"<p><img src="a.png" width="120" height="80"></p>"#),
            r#"<p class="img-wrap"><img src="a.png" style="width:120px;height:80px"></p>"#
        );
        assert_eq!(
            proof(r#"<p>text <em>x</em><img src="a.png" width="auto"></p>"#),
            r#"<p>text <em>x</em><img src="a.png" width="auto"></p>"#
        );
    }

    #[test]
    fn test_custom_classes() {
        let proofer = Proofer::with_options(ProofOptions {
            link_class: "anchor".to_string(),
            ..ProofOptions::default()
        });
        assert_eq!(proofer.proof(r#"<a href="x">hi</a>"#), r#"<span class="anchor">hi</span>"#);
    }

    #[test]
    fn test_report_counts() {
        let mut fragment = Fragment::parse(
            r##"<pre><code>x</code></pre><p><code>y</code> <a href="#">z</a></p><blockquote><p>q</p></blockquote>"##,
        );
        let report = Proofer::new().proof_fragment(&mut fragment);
        assert_eq!(report.code_blocks, 1);
        assert_eq!(report.inline_code, 1);
        assert_eq!(report.quotes, 1);
        assert_eq!(report.links, 1);
        assert_eq!(report.images, 0);
    }
}
