//! Tag-name matching over a [`Fragment`].

use std::fmt;

use crate::node::{Fragment, NodeId};

/// A set of tag names; the empty set matches every element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tags: Vec<String>,
}

impl Selector {
    /// Match a single tag name
    pub fn tag(name: &str) -> Self {
        Self::tags(&[name])
    }

    /// Match any of multiple tag names
    pub fn tags(names: &[&str]) -> Self {
        Self {
            tags: names.iter().map(|name| name.trim().to_lowercase()).collect(),
        }
    }

    /// Match every element
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether the node is an element matching this selector
    pub fn matches(&self, fragment: &Fragment, id: NodeId) -> bool {
        match fragment.tag_name(id) {
            Some(name) => self.tags.is_empty() || self.tags.iter().any(|tag| tag == name),
            None => false,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&self.tags.join(", "))
        }
    }
}
