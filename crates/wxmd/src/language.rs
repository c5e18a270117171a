//! Language annotations on code elements.
//!
//! A class attribute is parsed once into a [`Language`]; callers branch on the
//! typed value instead of re-matching class strings.

use std::fmt;

use wxmd_dom::Element;

/// Class prefix written by the Markdown renderer on code elements
pub const LANG_PREFIX: &str = "lang-";

/// Class prefix carried by proofed code blocks
pub const LANGUAGE_PREFIX: &str = "language-";

/// Language id recovered from a code element, possibly absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Language {
    id: Option<String>,
}

impl Language {
    /// A language with the given id; an empty id means no language
    pub fn new(id: &str) -> Self {
        let id = id.trim();
        Self {
            id: (!id.is_empty()).then(|| id.to_string()),
        }
    }

    pub fn none() -> Self {
        Self { id: None }
    }

    /// Find the first class token carrying one of `prefixes`.
    ///
    /// `lang-` alone, or a class without any matching token, yields no
    /// language.
    pub fn from_class(class: &str, prefixes: &[&str]) -> Self {
        class
            .split_whitespace()
            .find_map(|token| {
                prefixes
                    .iter()
                    .find_map(|prefix| token.strip_prefix(prefix))
                    .filter(|id| !id.is_empty())
            })
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Language of an element's class attribute
    pub fn from_element(element: Option<&Element>, prefixes: &[&str]) -> Self {
        element
            .and_then(|e| e.attr("class"))
            .map(|class| Self::from_class(class, prefixes))
            .unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id, or an empty string
    pub fn as_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }

    /// `<prefix><id>`, or `None` without a language
    pub fn class_name(&self, prefix: &str) -> Option<String> {
        self.id.as_ref().map(|id| format!("{}{}", prefix, id))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_class() {
        assert_eq!(Language::from_class("lang-js", &[LANG_PREFIX]).id(), Some("js"));
        assert_eq!(Language::from_class("hljs  lang-rust extra", &[LANG_PREFIX]).id(), Some("rust"));
        assert_eq!(
            Language::from_class("language-css", &[LANG_PREFIX, LANGUAGE_PREFIX]).id(),
            Some("css")
        );
    }

    #[test]
    fn test_malformed_class_degrades_to_none() {
        assert!(Language::from_class("", &[LANG_PREFIX]).is_empty());
        assert!(Language::from_class("lang-", &[LANG_PREFIX]).is_empty());
        assert!(Language::from_class("xlang-js", &[LANG_PREFIX]).is_empty());
        assert!(Language::from_class("language-js", &[LANG_PREFIX]).is_empty());
        assert!(Language::from_element(None, &[LANG_PREFIX]).is_empty());
    }

    #[test]
    fn test_class_name() {
        assert_eq!(Language::new("js").class_name(LANGUAGE_PREFIX).as_deref(), Some("language-js"));
        assert_eq!(Language::new("  ").class_name(LANGUAGE_PREFIX), None);
        assert_eq!(Language::none().to_string(), "");
    }
}
