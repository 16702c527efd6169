//! `[serve]` section configuration.
//!
//! Contains HTTP server settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[serve]` section in site.toml - HTTP server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 8080
/// max_age = 600          # Cache-Control max-age for rendered pages
/// assets = "dist"        # Static files; defaults to the shell's directory
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 5300).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// `max-age` (seconds) sent with rendered HTML.
    #[serde(default = "defaults::serve::max_age")]
    #[educe(Default = defaults::serve::max_age())]
    pub max_age: u32,

    /// Directory static assets are served from.
    #[serde(default)]
    pub assets: Option<PathBuf>,
}

impl ServeConfig {
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.max_age)
    }
}
