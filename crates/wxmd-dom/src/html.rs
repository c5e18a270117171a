//! HTML parsing support.
//!
//! HTML strings are parsed with scraper (html5ever) in fragment mode and copied
//! into the arena [`Fragment`] structure.

use scraper::{Html, Node as ScraperNode};

use crate::node::{Element, Fragment, NodeData};

impl Fragment {
    /// Parse an HTML string into a detached fragment.
    ///
    /// Parsing never fails: malformed markup is repaired the way a browser
    /// would repair it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wxmd_dom::Fragment;
    ///
    /// let fragment = Fragment::parse("<p>Hello <em>World</em></p>");
    /// assert_eq!(fragment.to_html(), "<p>Hello <em>World</em></p>");
    /// ```
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_fragment(html);
        let mut fragment = Fragment::new();
        let root = fragment.root();

        // The fragment parser wraps content in a synthetic <html> element.
        let mut stack: Vec<_> = document
            .root_element()
            .children()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|child| (child, root))
            .collect();

        while let Some((source, parent)) = stack.pop() {
            let id = match source.value() {
                ScraperNode::Text(text) => {
                    let text: &str = &text.text;
                    fragment.create_text(text)
                }
                ScraperNode::Comment(comment) => {
                    let comment: &str = &comment.comment;
                    fragment.create_comment(comment)
                }
                ScraperNode::Element(element) => {
                    let id = fragment.create(Element::with_attrs(
                        element.name(),
                        element.attrs().collect(),
                    ));
                    let children: Vec<_> = source.children().collect();
                    stack.extend(children.into_iter().rev().map(|child| (child, id)));
                    id
                }
                _ => continue,
            };
            fragment.append(parent, id);
        }

        fragment
    }

    /// Whether the fragment holds nothing but whitespace text
    pub fn is_blank(&self) -> bool {
        self.descendants(self.root()).into_iter().all(|id| match self.data(id) {
            NodeData::Text(text) => text.trim().is_empty(),
            NodeData::Comment(_) => true,
            _ => false,
        })
    }
}
