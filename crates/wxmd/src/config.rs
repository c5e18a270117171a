//! JSON configuration for both pipelines.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markdown::MarkdownOptions;
use crate::proof::ProofOptions;
use crate::{Error, Result};

/// Options of the forward and reverse pipelines.
///
/// Every field is optional in the JSON form:
///
/// ```json
/// { "proof": { "link_class": "anchor" }, "markdown": { "heading_style": "setext" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proof: ProofOptions,
    pub markdown: MarkdownOptions,
}

impl Config {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check that every stripped tag name is a valid CSS type selector
    pub fn validate(&self) -> Result<()> {
        for tag in &self.proof.strip_tags {
            scraper::Selector::parse(tag)
                .map_err(|err| Error::Selector(format!("{:?}: {}", tag, err)))?;
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
