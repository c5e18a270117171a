//! MarkdownGenerator - the main entry point for HTML to Markdown conversion.

use std::sync::Arc;

use tracing::debug;
use wxmd_dom::{Fragment, NodeData, NodeRef};

use super::rules::{platform_rules, Filter, Rule, Rules};
use super::utilities::{collapse_blank_lines, collapse_whitespace, escape_markdown, is_block};
use super::MarkdownOptions;
use crate::beautify::BeautifierRegistry;

/// Converts pasted HTML to Markdown.
///
/// Platform rules are installed on construction; further rules added with
/// [`add_rule`](Self::add_rule) are consulted after them.
pub struct MarkdownGenerator {
    options: MarkdownOptions,
    rules: Rules,
}

impl MarkdownGenerator {
    /// Create a MarkdownGenerator with default options and beautifiers
    pub fn new() -> Self {
        Self::with_options(MarkdownOptions::default())
    }

    /// Create a MarkdownGenerator with custom options
    pub fn with_options(options: MarkdownOptions) -> Self {
        Self::with_beautifiers(options, Arc::new(BeautifierRegistry::new()))
    }

    /// Create a MarkdownGenerator with custom options and beautifiers
    pub fn with_beautifiers(options: MarkdownOptions, beautifiers: Arc<BeautifierRegistry>) -> Self {
        let mut generator = Self::commonmark(options);
        for (key, rule) in platform_rules(beautifiers) {
            generator.add_rule(key, rule);
        }
        generator
    }

    /// A generator with only the CommonMark rules
    pub fn commonmark(options: MarkdownOptions) -> Self {
        let mut rules = Rules::new();
        rules.remove(Filter::tags(&["style", "title"]));
        Self { options, rules }
    }

    /// Convert HTML to Markdown
    pub fn generate(&self, html: &str) -> String {
        let fragment = Fragment::parse(html);
        let markdown = self.generate_fragment(&fragment);
        debug!(html_bytes = html.len(), markdown_bytes = markdown.len(), "generated markdown");
        markdown
    }

    /// Convert an already parsed fragment
    pub fn generate_fragment(&self, fragment: &Fragment) -> String {
        let result = self.process_children(&fragment.node(fragment.root()));
        self.post_process(&result)
    }

    /// Add a rule, consulted after the rules already present
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Names of the installed custom rules, in lookup order
    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.rules.custom_keys()
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut MarkdownOptions {
        &mut self.options
    }

    /// Process children of a node
    fn process_children(&self, node: &NodeRef) -> String {
        let mut result = String::new();

        for child in node.children() {
            match child.fragment().data(child.id()) {
                NodeData::Text(text) => result.push_str(&self.process_text(&child, text)),
                NodeData::Element(_) => result.push_str(&self.process_element(&child)),
                _ => {}
            }
        }

        result
    }

    fn process_text(&self, node: &NodeRef, text: &str) -> String {
        if node.has_ancestor("pre") || node.has_ancestor("code") {
            return text.to_string();
        }

        if text.trim_matches(|c: char| c.is_whitespace() && c != '\u{a0}').is_empty() && self.is_block_boundary(node) {
            return String::new();
        }

        let collapsed = collapse_whitespace(text).replace('\u{a0}', " ");
        if self.options.escape {
            self.escape(&collapsed)
        } else {
            collapsed
        }
    }

    /// Whitespace-only text next to a block element (or at the edge of a
    /// block parent) carries no content
    fn is_block_boundary(&self, node: &NodeRef) -> bool {
        let parent_is_block = node
            .parent()
            .map_or(true, |p| !p.is_element() || is_block(p.tag_name()));
        let side = |sibling: Option<NodeRef>| match sibling {
            Some(s) => s.is_element() && is_block(s.tag_name()),
            None => parent_is_block,
        };
        side(node.previous_sibling()) || side(node.next_sibling())
    }

    /// Process a single element
    fn process_element(&self, node: &NodeRef) -> String {
        // Check if should be removed
        if self.rules.should_remove(node, &self.options) {
            return String::new();
        }

        // Check if should be kept as HTML
        if self.rules.should_keep(node, &self.options) {
            return self.rules.keep_replacement(node);
        }

        // Process children first
        let content = self.process_children(node);

        // Apply rule if one matches
        if let Some(rule) = self.rules.for_node(node, &self.options) {
            return rule.replace(node, &content, &self.options);
        }

        // Default: return content as-is
        content
    }

    /// Post-process the result
    fn post_process(&self, output: &str) -> String {
        collapse_blank_lines(output)
    }
}

impl Default for MarkdownGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::HeadingStyle;

    fn generate(html: &str) -> String {
        MarkdownGenerator::new().generate(html)
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(generate("<p>Hello World</p>"), "Hello World");
    }

    #[test]
    fn test_heading_atx() {
        assert_eq!(generate("<h2>Title</h2><p>x</p>"), "## Title\n\nx");
    }

    #[test]
    fn test_heading_setext() {
        let generator = MarkdownGenerator::with_options(MarkdownOptions {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        });
        assert_eq!(generator.generate("<h1>Title</h1>"), "Title\n=====");
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(generate("<em>a</em> <strong>b</strong>"), "_a_ **b**");
    }

    #[test]
    fn test_inline_link_and_image() {
        assert_eq!(
            generate(r#"<a href="https://example.com">Link</a>"#),
            "[Link](https://example.com)"
        );
        assert_eq!(generate(r#"<img src="test.png" alt="Alt">"#), "![Alt](test.png)");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(generate("<p>use <code>a_b</code></p>"), "use `a_b`");
    }

    #[test]
    fn test_multiline_code_passes_through() {
        assert_eq!(generate("<code>a\nb</code>"), "a\nb");
    }

    #[test]
    fn test_code_block_beautified() {
        assert_eq!(
            generate(r#"<pre><code class="lang-js">var a=1;</code></pre>"#),
            "```js\nvar a = 1;\n```"
        );
    }

    #[test]
    fn test_code_block_unknown_language() {
        assert_eq!(
            generate(r#"<pre><code class="language-rust">fn  main(){}</code></pre>"#),
            "```rust\nfn  main(){}\n```"
        );
        assert_eq!(generate("<pre>plain</pre>"), "```\nplain\n```");
    }

    #[test]
    fn test_code_wrap_is_not_quoted() {
        assert_eq!(
            generate(r#"<blockquote><pre class="language-js"><p>var a=1;</p></pre></blockquote>"#),
            "```js\nvar a = 1;\n```"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            generate("<blockquote><p>one</p><p>two</p></blockquote>"),
            "> one\n>\n> two"
        );
    }

    #[test]
    fn test_span_and_containers() {
        assert_eq!(
            generate("<section><span>a</span></section><div>b</div>"),
            "a\n\nb"
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(generate("<ul><li>One</li><li>Two</li></ul>"), "-   One\n-   Two");
        assert_eq!(
            generate(r#"<ol start="3"><li>a</li><li>b</li></ol>"#),
            "3.  a\n4.  b"
        );
    }

    #[test]
    fn test_ordered_list_start_is_untrusted() {
        assert_eq!(
            generate(&format!(r#"<ol start="{}"><li>a</li><li>b</li></ol>"#, usize::MAX)),
            format!("{0}. a\n{0}. b", usize::MAX)
        );
        assert_eq!(
            generate(r#"<ol start="99"><li>a</li><li>b</li></ol>"#),
            "99. a\n100. b"
        );
        assert_eq!(generate(r#"<ol start="-4"><li>a</li></ol>"#), "1.  a");
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(generate("<p>2*3 and [x]</p>"), "2\\*3 and \\[x\\]");
        let mut generator = MarkdownGenerator::new();
        generator.options_mut().escape = false;
        assert_eq!(generator.generate("<p>2*3</p>"), "2*3");
    }

    #[test]
    fn test_removes_style_and_title() {
        assert_eq!(generate("<style>p{}</style><title>t</title><p>x</p>"), "x");
    }

    #[test]
    fn test_custom_rule_and_plugin() {
        let mut generator = MarkdownGenerator::new();
        generator.use_plugin(|g| {
            g.add_rule("mark", Rule::for_tag("mark", |_, content, _| format!("=={}==", content)));
        });
        assert_eq!(generator.generate("<mark>hi</mark>"), "==hi==");
        let keys: Vec<&str> = generator.rule_keys().collect();
        assert_eq!(keys, vec!["code-wrap", "inline-code", "code-block", "span", "container", "mark"]);
    }

    #[test]
    fn test_keep() {
        let mut generator = MarkdownGenerator::new();
        generator.keep(Filter::tag("sup"));
        assert_eq!(generator.generate("<p>x<sup>2</sup></p>"), "x<sup>2</sup>");
    }

    #[test]
    fn test_commonmark_only() {
        let generator = MarkdownGenerator::commonmark(MarkdownOptions::default());
        assert_eq!(
            generator.generate(r#"<pre><code class="language-js">var a=1;</code></pre>"#),
            "```js\nvar a=1;\n```"
        );
    }
}
