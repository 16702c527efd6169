//! Site configuration management for `site.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[base]`     | Site identity (name, origin, default image)      |
//! | `[template]` | Where the frontend's `index.html` is looked up   |
//! | `[content]`  | JSON file with posts, cases and page templates   |
//! | `[serve]`    | HTTP server (interface, port, cache max-age)     |
//!
//! # Example
//!
//! ```toml
//! [base]
//! name = "Northwind Studio"
//! url = "https://northwind.dev"
//! description = "Websites and brands for ambitious teams"
//!
//! [template]
//! path = "/srv/northwind/current/index.html"
//!
//! [serve]
//! port = 8080
//! ```

mod base;
mod content;
pub mod defaults;
mod error;
mod serve;
mod template;

pub use error::ConfigError;

use base::BaseConfig;
use content::ContentConfig;
use serve::ServeConfig;
use template::TemplateConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing site.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site identity
    #[serde(default)]
    pub base: BaseConfig,

    /// Shell lookup
    #[serde(default)]
    pub template: TemplateConfig,

    /// Content source
    #[serde(default)]
    pub content: ContentConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load, apply CLI overrides, normalize paths and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = Self::from_path(&config_path)?;
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));

        if let Some(path) = &cli.template {
            self.template.path = Some(path.clone());
        }

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        self.config_path = normalize_path(&root.join(&cli.config));
        self.update_path_with_root(&root);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every configured path against `root` and make it absolute.
    pub fn update_path_with_root(&mut self, root: &Path) {
        let root = normalize_path(root);

        if let Some(path) = &self.template.path {
            self.template.path = Some(resolve_user_path(&root, path));
        }
        for candidate in &mut self.template.candidates {
            *candidate = normalize_path(&root.join(&*candidate));
        }

        self.content.path = normalize_path(&root.join(&self.content.path));

        if let Some(assets) = &self.serve.assets {
            self.serve.assets = Some(normalize_path(&root.join(assets)));
        }

        self.root = root;
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.base.name.trim().is_empty() {
            bail!(ConfigError::Validation("[base.name] must not be empty".into()));
        }

        if !self.base.url.starts_with("http://") && !self.base.url.starts_with("https://") {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if self.template.candidate_paths().is_empty() {
            bail!(ConfigError::Validation(
                "[template] needs a `path` or at least one entry in `candidates`".into()
            ));
        }

        if self.serve.interface.parse::<std::net::IpAddr>().is_err() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            )));
        }

        Ok(())
    }
}

/// Expand `~` and resolve relative paths against `root`.
fn resolve_user_path(root: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_relative() {
        normalize_path(&root.join(expanded))
    } else {
        normalize_path(&expanded)
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
