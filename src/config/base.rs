//! `[base]` section configuration.
//!
//! Contains site identity used by every page's metadata.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in site.toml - site identity.
///
/// # Example
/// ```toml
/// [base]
/// name = "Northwind Studio"
/// url = "https://northwind.dev"
/// description = "Websites and brands for ambitious teams"
/// default_image = "/og-default.jpg"
/// twitter_site = "@northwind"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Organization name, used as the title suffix and `og:site_name`.
    pub name: String,

    /// Public origin for canonical URLs (e.g. `https://northwind.dev`).
    pub url: String,

    /// Fallback description for pages without their own.
    #[serde(default)]
    pub description: String,

    /// Second half of the home page title: `"{name} | {tagline}"`.
    #[serde(default = "defaults::base::tagline")]
    #[educe(Default = defaults::base::tagline())]
    pub tagline: String,

    /// Share image for pages that supply none. Relative paths resolve
    /// against `url`.
    #[serde(default = "defaults::base::default_image")]
    #[educe(Default = defaults::base::default_image())]
    pub default_image: String,

    /// `twitter:site` handle, e.g. `@northwind`.
    #[serde(default)]
    pub twitter_site: Option<String>,

    /// `og:locale` value.
    #[serde(default = "defaults::base::locale")]
    #[educe(Default = defaults::base::locale())]
    pub locale: String,

    /// Logo for the `Organization` structured data.
    #[serde(default)]
    pub logo: Option<String>,
}

impl BaseConfig {
    /// Resolve `path` against the site origin.
    ///
    /// Absolute `http(s)://` URLs are returned unchanged.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let origin = self.url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{origin}/")
        } else {
            format!("{origin}/{path}")
        }
    }

    /// Absolute URL of the fallback share image.
    pub fn share_image(&self) -> String {
        self.absolute_url(&self.default_image)
    }

    /// `"{page} | {name}"`, or just the name when `page` is empty.
    pub fn page_title(&self, page: &str) -> String {
        if page.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{page} | {}", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::BaseConfig;

    fn base(url: &str) -> BaseConfig {
        BaseConfig {
            name: "Northwind".into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_config_full() {
        let config = r#"
            [base]
            name = "Northwind Studio"
            url = "https://northwind.dev"
            description = "Websites and brands"
            tagline = "Digital Agency"
            default_image = "https://cdn.northwind.dev/og.png"
            twitter_site = "@northwind"
            locale = "de_DE"
            logo = "/logo.png"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.base.name, "Northwind Studio");
        assert_eq!(config.base.url, "https://northwind.dev");
        assert_eq!(config.base.description, "Websites and brands");
        assert_eq!(config.base.tagline, "Digital Agency");
        assert_eq!(config.base.default_image, "https://cdn.northwind.dev/og.png");
        assert_eq!(config.base.twitter_site.as_deref(), Some("@northwind"));
        assert_eq!(config.base.locale, "de_DE");
        assert_eq!(config.base.logo.as_deref(), Some("/logo.png"));
    }

    #[test]
    fn test_base_config_defaults() {
        let config = r#"
            [base]
            name = "Test"
            url = "https://example.com"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.base.description, "");
        assert_eq!(config.base.tagline, "Design & Development Studio");
        assert_eq!(config.base.default_image, "/og-default.jpg");
        assert_eq!(config.base.locale, "en_US");
        assert!(config.base.twitter_site.is_none());
        assert!(config.base.logo.is_none());
    }

    #[test]
    fn test_base_config_requires_url() {
        let config = r#"
            [base]
            name = "Test"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [base]
            name = "Test"
            url = "https://example.com"
            title = "should_fail"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_absolute_url() {
        let base = base("https://northwind.dev/");

        assert_eq!(base.absolute_url("/blog/hello"), "https://northwind.dev/blog/hello");
        assert_eq!(base.absolute_url("blog"), "https://northwind.dev/blog");
        assert_eq!(base.absolute_url("/"), "https://northwind.dev/");
        assert_eq!(base.absolute_url(""), "https://northwind.dev/");
        assert_eq!(
            base.absolute_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_share_image_resolves_relative() {
        let base = base("https://northwind.dev");
        assert_eq!(base.share_image(), "https://northwind.dev/og-default.jpg");
    }

    #[test]
    fn test_page_title() {
        let base = base("https://northwind.dev");
        assert_eq!(base.page_title("Blog"), "Blog | Northwind");
        assert_eq!(base.page_title(""), "Northwind");
    }
}
