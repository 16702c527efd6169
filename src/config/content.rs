//! `[content]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[content]` section in site.toml - where blog posts, cases and page
/// templates are read from.
///
/// # Example
/// ```toml
/// [content]
/// path = "data/content.json"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// JSON content file, relative to the project root.
    #[serde(default = "defaults::content::path")]
    #[educe(Default = defaults::content::path())]
    pub path: PathBuf,
}
