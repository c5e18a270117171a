//! Clipboard HTML cleanup ahead of Markdown generation.
//!
//! Inline styles and presentational classes are dropped; class tokens naming a
//! code language survive so fenced blocks keep their language.

use tracing::debug;
use wxmd_dom::{query, Fragment, Selector};

use crate::language::{LANGUAGE_PREFIX, LANG_PREFIX};

/// Elements removed from pasted content
pub const STRIPPED_TAGS: &[&str] = &["meta", "link", "script"];

fn is_language_token(token: &str) -> bool {
    [LANG_PREFIX, LANGUAGE_PREFIX]
        .iter()
        .any(|prefix| token.len() > prefix.len() && token.starts_with(prefix))
}

/// Sanitize a parsed fragment in place. Returns the number of removed elements.
pub fn sanitize_fragment(fragment: &mut Fragment) -> usize {
    let root = fragment.root();

    query::for_each(fragment, root, &Selector::any(), |fragment, id| {
        let Some(element) = fragment.element_mut(id) else {
            return;
        };
        element.remove_attr("style");
        let kept: Vec<String> = element
            .classes()
            .filter(|token| is_language_token(token))
            .map(str::to_string)
            .collect();
        if kept.is_empty() {
            element.remove_attr("class");
        } else {
            element.set_attr("class", &kept.join(" "));
        }
    });

    let removed = query::remove_all(fragment, root, &Selector::tags(STRIPPED_TAGS));
    debug!(removed, "sanitized clipboard html");
    removed
}

/// Sanitize an HTML string
pub fn sanitize_clipboard_html(html: &str) -> String {
    let mut fragment = Fragment::parse(html);
    sanitize_fragment(&mut fragment);
    fragment.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_style_and_class() {
        assert_eq!(
            sanitize_clipboard_html(r#"<p style="color:red" class="a b" id="x">t</p>"#),
            r#"<p id="x">t</p>"#
        );
    }

    #[test]
    fn test_keeps_language_tokens() {
        assert_eq!(
            sanitize_clipboard_html(r#"<pre class="code language-js"><code class="hljs lang-js">x</code></pre>"#),
            r#"<pre class="language-js"><code class="lang-js">x</code></pre>"#
        );
        assert_eq!(sanitize_clipboard_html(r#"<i class="lang-">x</i>"#), "<i>x</i>");
    }

    #[test]
    fn test_removes_metadata_elements() {
        let mut fragment =
            Fragment::parse(r#"<meta charset="utf-8"><p>a</p><link rel="x"><script>b()</script>"#);
        assert_eq!(sanitize_fragment(&mut fragment), 3);
        assert_eq!(fragment.to_html(), "<p>a</p>");
    }
}
