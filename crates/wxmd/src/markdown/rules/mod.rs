//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod platform;
mod rule;

pub use commonmark::commonmark_rules;
pub use platform::{platform_rules, pre_language, pre_text};
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;
use wxmd_dom::NodeRef;

use crate::markdown::MarkdownOptions;

/// Collection of rules for conversion
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML)
    keep_rules: Vec<Filter>,
    /// Remove rules (remove entirely)
    remove_rules: Vec<Filter>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with CommonMark rules
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: Vec::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Add a custom rule. Re-using a key replaces the rule but keeps its
    /// original position.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// Names of the custom rules, in lookup order
    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom_rules.keys().map(String::as_str)
    }

    /// Find the appropriate rule for a node
    pub fn for_node<'a>(&'a self, node: &NodeRef, options: &MarkdownOptions) -> Option<&'a Rule> {
        self.custom_rules
            .values()
            .chain(self.commonmark_rules.iter())
            .find(|rule| rule.filter.matches(node, options))
    }

    /// Check if a node should be kept as HTML
    pub fn should_keep(&self, node: &NodeRef, options: &MarkdownOptions) -> bool {
        if self.for_node(node, options).is_some() {
            return false;
        }
        self.keep_rules
            .iter()
            .any(|filter| filter.matches(node, options))
    }

    /// Check if a node should be removed
    pub fn should_remove(&self, node: &NodeRef, options: &MarkdownOptions) -> bool {
        if self.for_node(node, options).is_some() || self.should_keep(node, options) {
            return false;
        }
        self.remove_rules
            .iter()
            .any(|filter| filter.matches(node, options))
    }

    /// Get the keep replacement for a node
    pub fn keep_replacement(&self, node: &NodeRef) -> String {
        node.outer_html()
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
