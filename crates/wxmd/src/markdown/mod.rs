//! HTML to Markdown conversion for pasted clipboard content.
//!
//! [`MarkdownGenerator`] is a rule engine: each element is converted after its
//! children, by the first rule whose filter matches. Platform rules that undo
//! the proofing rewrites are consulted before the CommonMark defaults.

pub mod rules;
mod service;
pub mod utilities;

use serde::{Deserialize, Serialize};

pub use rules::{Filter, Rule, Rules};
pub use service::MarkdownGenerator;

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    Setext,
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
}

/// Options for MarkdownGenerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Escape Markdown characters found in text
    pub escape: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            escape: true,
        }
    }
}
