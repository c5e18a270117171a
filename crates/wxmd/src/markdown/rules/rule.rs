//! Element filters and the rules built on them.

use wxmd_dom::NodeRef;

use crate::markdown::MarkdownOptions;

/// Type alias for replacement functions
pub type ReplacementFn = Box<dyn Fn(&NodeRef, &str, &MarkdownOptions) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&NodeRef, &MarkdownOptions) -> bool + Send + Sync>;

/// Chooses the elements a rule applies to.
///
/// A filter names a tag set (empty matches any element) and narrows it with
/// optional conditions, all of which must hold:
///
/// ```
/// use wxmd::markdown::Filter;
///
/// // `code` outside of `pre`
/// let inline_code = Filter::tag("code").outside("pre");
/// // `a` carrying an `href`
/// let link = Filter::tag("a").with_attr("href");
/// # let _ = (inline_code, link);
/// ```
#[derive(Default)]
pub struct Filter {
    tags: Vec<String>,
    outside: Option<String>,
    attr: Option<String>,
    predicate: Option<PredicateFn>,
}

impl Filter {
    /// Match a single tag
    pub fn tag(name: &str) -> Self {
        Self::tags(&[name])
    }

    /// Match any of multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Self {
            tags: names.iter().map(|s| s.to_lowercase()).collect(),
            ..Self::default()
        }
    }

    /// Match any element satisfying a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&NodeRef, &MarkdownOptions) -> bool + Send + Sync + 'static,
    {
        Self::default().when(f)
    }

    /// Exclude elements nested anywhere inside `ancestor`
    pub fn outside(mut self, ancestor: &str) -> Self {
        self.outside = Some(ancestor.to_lowercase());
        self
    }

    /// Require an attribute to be present
    pub fn with_attr(mut self, name: &str) -> Self {
        self.attr = Some(name.to_lowercase());
        self
    }

    /// Add a predicate; replaces any earlier one
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&NodeRef, &MarkdownOptions) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(f));
        self
    }

    /// Check if this filter matches a node
    pub fn matches(&self, node: &NodeRef, options: &MarkdownOptions) -> bool {
        if !node.is_element() {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| t == node.tag_name()) {
            return false;
        }
        if self.outside.as_deref().is_some_and(|ancestor| node.has_ancestor(ancestor)) {
            return false;
        }
        if self.attr.as_deref().is_some_and(|name| !node.has_attr(name)) {
            return false;
        }
        self.predicate.as_ref().map_or(true, |f| f(node, options))
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    pub filter: Filter,
    pub replacement: ReplacementFn,
}

impl Rule {
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &MarkdownOptions) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &MarkdownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &MarkdownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Emit the converted children unchanged
    pub fn passthrough(filter: Filter) -> Self {
        Self::new(filter, |_, content, _| content.to_string())
    }

    /// Separate the converted children from their siblings by blank lines
    pub fn block(filter: Filter) -> Self {
        Self::new(filter, |_, content, _| format!("\n\n{}\n\n", content))
    }

    pub fn replace(&self, node: &NodeRef, content: &str, options: &MarkdownOptions) -> String {
        (self.replacement)(node, content, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxmd_dom::Fragment;

    fn first<'a>(fragment: &'a Fragment, tag: &str) -> NodeRef<'a> {
        fragment
            .descendants(fragment.root())
            .into_iter()
            .map(|id| fragment.node(id))
            .find(|node| node.tag_name() == tag)
            .unwrap()
    }

    #[test]
    fn test_outside_excludes_nested_elements() {
        let fragment = Fragment::parse("<pre><code>a</code></pre>");
        let options = MarkdownOptions::default();
        let filter = Filter::tag("code").outside("pre");
        assert!(!filter.matches(&first(&fragment, "code"), &options));

        let fragment = Fragment::parse("<p><code>a</code></p>");
        assert!(filter.matches(&first(&fragment, "code"), &options));
    }

    #[test]
    fn test_conditions_combine() {
        let options = MarkdownOptions::default();
        let filter = Filter::tag("a").with_attr("href").when(|node, _| node.text_content() != "skip");

        let fragment = Fragment::parse(r#"<a href="x">go</a>"#);
        assert!(filter.matches(&first(&fragment, "a"), &options));
        let fragment = Fragment::parse(r#"<a href="x">skip</a>"#);
        assert!(!filter.matches(&first(&fragment, "a"), &options));
        let fragment = Fragment::parse("<a>go</a>");
        assert!(!filter.matches(&first(&fragment, "a"), &options));
    }

    #[test]
    fn test_predicate_filter_skips_text() {
        let fragment = Fragment::parse("text");
        let options = MarkdownOptions::default();
        let text = fragment.node(fragment.children(fragment.root())[0]);
        assert!(!Filter::predicate(|_, _| true).matches(&text, &options));
    }

    #[test]
    fn test_passthrough_and_block() {
        let fragment = Fragment::parse("<div>x</div>");
        let options = MarkdownOptions::default();
        let div = first(&fragment, "div");
        assert_eq!(Rule::passthrough(Filter::tag("div")).replace(&div, "x", &options), "x");
        assert_eq!(Rule::block(Filter::tag("div")).replace(&div, "x", &options), "\n\nx\n\n");
    }
}
