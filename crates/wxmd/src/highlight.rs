//! Syntax highlighting of rendered code blocks.

use wxmd_dom::escape_text;

/// Language used for blocks without a recognizable hint
pub const FALLBACK_LANGUAGE: &str = "javascript";

/// Produces the inner HTML of a `code` element for a code block
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Map a fence info hint to the language handed to the highlighter:
/// empty and `js` become `javascript`.
pub fn normalize_language(hint: &str) -> &str {
    match hint.trim() {
        "" | "js" => FALLBACK_LANGUAGE,
        other => other,
    }
}

/// Escapes the code, no highlighting
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        let mut out = String::with_capacity(code.len());
        escape_text(code, &mut out);
        out
    }
}

/// The highlighter used when none is configured
pub fn default_highlighter() -> Box<dyn Highlighter> {
    #[cfg(feature = "syntax-highlighting")]
    {
        Box::new(syntect_highlighter::SyntectHighlighter::new())
    }
    #[cfg(not(feature = "syntax-highlighting"))]
    {
        Box::new(PlainHighlighter)
    }
}

#[cfg(feature = "syntax-highlighting")]
pub use syntect_highlighter::SyntectHighlighter;

#[cfg(feature = "syntax-highlighting")]
mod syntect_highlighter {
    use once_cell::sync::Lazy;
    use syntect::html::{ClassStyle, ClassedHTMLGenerator};
    use syntect::parsing::{SyntaxReference, SyntaxSet};
    use syntect::util::LinesWithEndings;
    use tracing::warn;

    use super::{normalize_language, Highlighter, PlainHighlighter, FALLBACK_LANGUAGE};
    use crate::{Error, Result};

    static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

    /// Classed-span highlighting with the bundled syntax definitions.
    ///
    /// Unrecognized languages are highlighted as JavaScript.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SyntectHighlighter;

    impl SyntectHighlighter {
        pub fn new() -> Self {
            Self
        }

        fn syntax(&self, language: &str) -> &'static SyntaxReference {
            let set: &'static SyntaxSet = &SYNTAX_SET;
            set.find_syntax_by_token(normalize_language(language))
                .or_else(|| set.find_syntax_by_token(FALLBACK_LANGUAGE))
                .unwrap_or_else(|| set.find_syntax_plain_text())
        }

        /// Highlight, reporting parse failures
        pub fn try_highlight(&self, code: &str, language: &str) -> Result<String> {
            let mut generator = ClassedHTMLGenerator::new_with_class_style(
                self.syntax(language),
                &SYNTAX_SET,
                ClassStyle::Spaced,
            );
            for line in LinesWithEndings::from(code) {
                generator
                    .parse_html_for_line_which_includes_newline(line)
                    .map_err(|err| Error::Render(err.to_string()))?;
            }
            Ok(generator.finalize())
        }
    }

    impl Highlighter for SyntectHighlighter {
        fn highlight(&self, code: &str, language: &str) -> String {
            match self.try_highlight(code, language) {
                Ok(html) => html,
                Err(err) => {
                    warn!(language, error = %err, "highlighting failed, escaping only");
                    PlainHighlighter.highlight(code, language)
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_emits_classed_spans() {
            let html = SyntectHighlighter::new().highlight("var a = 1;\n", "js");
            assert!(html.contains("<span class=\""));
            assert!(html.contains("var"));
        }

        #[test]
        fn test_unknown_language_falls_back() {
            let highlighter = SyntectHighlighter::new();
            assert_eq!(
                highlighter.syntax("no-such-language").name,
                highlighter.syntax("javascript").name
            );
        }
    }
}
