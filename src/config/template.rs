//! `[template]` section configuration.
//!
//! Where to find the frontend build's `index.html`.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[template]` section in site.toml - shell lookup.
///
/// # Example
/// ```toml
/// [template]
/// path = "~/deploy/current/index.html"   # tried first
/// candidates = ["dist/index.html", "build/index.html"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Explicit shell path. Takes priority over `candidates`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Conventional fallback locations, relative to the project root.
    #[serde(default = "defaults::template::candidates")]
    #[educe(Default = defaults::template::candidates())]
    pub candidates: Vec<PathBuf>,
}

impl TemplateConfig {
    /// Override (if any) followed by the conventional candidates.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.path
            .iter()
            .chain(self.candidates.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_template_config_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            name = "Test"
            url = "https://example.com"
        "#,
        )
        .unwrap();

        assert!(config.template.path.is_none());
        assert_eq!(config.template.candidates.len(), 5);
        assert_eq!(config.template.candidates[0], PathBuf::from("dist/index.html"));
    }

    #[test]
    fn test_override_comes_first() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            name = "Test"
            url = "https://example.com"
            [template]
            path = "release/index.html"
            candidates = ["dist/index.html"]
        "#,
        )
        .unwrap();

        assert_eq!(
            config.template.candidate_paths(),
            vec![
                PathBuf::from("release/index.html"),
                PathBuf::from("dist/index.html")
            ]
        );
    }
}
