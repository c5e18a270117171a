//! Rules undoing the editor rewrites: classed spans, line paragraphs inside
//! `pre` and section/div containers.

use std::sync::Arc;

use wxmd_dom::NodeRef;

use super::{Filter, Rule};
use crate::beautify::BeautifierRegistry;
use crate::language::{Language, LANGUAGE_PREFIX, LANG_PREFIX};

/// Platform rules in lookup order, keyed by rule name
pub fn platform_rules(beautifiers: Arc<BeautifierRegistry>) -> Vec<(&'static str, Rule)> {
    vec![
        ("code-wrap", code_wrap_rule()),
        ("inline-code", inline_code_rule()),
        ("code-block", code_block_rule(beautifiers)),
        ("span", span_rule()),
        ("container", container_rule()),
    ]
}

/// A quote holding nothing but a code block is the wrapper added around
/// every `pre`; its fence is emitted without a quote prefix.
fn code_wrap_rule() -> Rule {
    Rule::passthrough(Filter::tag("blockquote").when(|node, _| {
        let mut children = node.element_children();
        let only_pre = matches!(
            (children.next(), children.next()),
            (Some(child), None) if child.tag_name() == "pre"
        );
        only_pre
            && node
                .children()
                .filter(|c| c.is_text())
                .all(|c| c.text_content().trim().is_empty())
    }))
}

fn inline_code_rule() -> Rule {
    Rule::new(
        Filter::tag("code").outside("pre"),
        |_, content, _| {
            if content.contains('\n') {
                content.to_string()
            } else {
                format!("`{}`", content)
            }
        },
    )
}

fn code_block_rule(beautifiers: Arc<BeautifierRegistry>) -> Rule {
    Rule::for_tag("pre", move |node, _, options| {
        let language = pre_language(node);
        let text = beautifiers.beautify_or_raw(&language, &pre_text(node));
        format!("\n{}{}\n{}\n{}\n", options.fence, language, text, options.fence)
    })
}

fn span_rule() -> Rule {
    Rule::passthrough(Filter::tag("span"))
}

fn container_rule() -> Rule {
    Rule::block(Filter::tags(&["section", "div"]))
}

/// Language of a `pre` block: the class of its first element child, else the
/// class of the `pre` itself. Both `lang-` and `language-` prefixes count.
pub fn pre_language(node: &NodeRef) -> Language {
    let prefixes = [LANG_PREFIX, LANGUAGE_PREFIX];
    let from_child = node
        .first_element_child()
        .and_then(|child| child.attr("class"))
        .map(|class| Language::from_class(class, &prefixes))
        .unwrap_or_default();
    if !from_child.is_empty() {
        return from_child;
    }
    Language::from_class(node.attr("class").unwrap_or(""), &prefixes)
}

/// Plain text of a `pre` block.
///
/// A block made of line paragraphs yields one line per paragraph; otherwise
/// `br` elements count as line breaks. Non-breaking spaces become spaces.
pub fn pre_text(node: &NodeRef) -> String {
    let container = match node.first_element_child() {
        Some(child) if child.tag_name() == "code" => child,
        _ => *node,
    };

    let mut lines: Vec<NodeRef> = container.element_children().collect();
    let line_blocks = !lines.is_empty()
        && lines.iter().all(|l| matches!(l.tag_name(), "p" | "div"))
        && container
            .children()
            .filter(|c| c.is_text())
            .all(|c| c.text_content().trim().is_empty());

    let text = if line_blocks {
        lines
            .drain(..)
            .map(|line| {
                let mut text = String::new();
                push_text(&line, &mut text);
                text.trim_end_matches('\n').to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        let mut text = String::new();
        push_text(&container, &mut text);
        text
    };

    text.replace('\u{a0}', " ").trim_end().to_string()
}

fn push_text(node: &NodeRef, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text_content());
        } else if child.tag_name() == "br" {
            out.push('\n');
        } else {
            push_text(&child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxmd_dom::Fragment;

    fn first(html: &str) -> Fragment {
        Fragment::parse(html)
    }

    #[test]
    fn test_pre_language_prefers_first_child() {
        let fragment = first(r#"<pre class="language-css"><code class="lang-js">x</code></pre>"#);
        let pre = fragment.node(fragment.first_element_child(fragment.root()).unwrap());
        assert_eq!(pre_language(&pre).id(), Some("js"));
    }

    #[test]
    fn test_pre_language_falls_back_to_pre_class() {
        let fragment = first(r#"<pre class="language-js"><p class="line">x</p></pre>"#);
        let pre = fragment.node(fragment.first_element_child(fragment.root()).unwrap());
        assert_eq!(pre_language(&pre).id(), Some("js"));

        let fragment = first("<pre><code>x</code></pre>");
        let pre = fragment.node(fragment.first_element_child(fragment.root()).unwrap());
        assert!(pre_language(&pre).is_empty());
    }

    #[test]
    fn test_pre_text_from_line_paragraphs() {
        let fragment = first(concat!(
            r#"<pre><p class="line">if (a) {</p>"#,
            r#"<p class="lbr"><br></p>"#,
            r#"<p class="line">&nbsp;&nbsp;<span class="token">b</span>();</p>"#,
            r#"<p class="line">}</p></pre>"#
        ));
        let pre = fragment.node(fragment.first_element_child(fragment.root()).unwrap());
        assert_eq!(pre_text(&pre), "if (a) {\n\n  b();\n}");
    }

    #[test]
    fn test_pre_text_from_code() {
        let fragment = first("<pre><code>a &lt; b\n  c<br>d\n</code></pre>");
        let pre = fragment.node(fragment.first_element_child(fragment.root()).unwrap());
        assert_eq!(pre_text(&pre), "a < b\n  c\nd");
    }
}
