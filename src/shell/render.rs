//! Merging `PageMetadata` into the cached shell.
//!
//! # Render-once contract
//!
//! Named meta and link tags are upserted, so re-rendering with the same
//! metadata is harmless for them. JSON-LD is always appended. Rendering a
//! document that was already rendered would therefore duplicate the
//! structured data. The renderer only accepts a [`CachedDocument`] and
//! produces a [`RenderedDocument`], which cannot be converted back. Every
//! render thus starts from the pristine shell.
//!
//! # Order of operations
//!
//! ```text
//! <title>  ──►  description  ──►  canonical  ──►  og:*  ──►  twitter:*  ──►  JSON-LD
//! ```
//!
//! New tags land right before `</head>` in that order.

use std::fmt;

use super::escape::json_ld_payload;
use super::meta::PageMetadata;
use super::store::CachedDocument;
use super::tags::{Element, TagKey, insert_before_head_close, replace_title, upsert};

/// Share image used when a page supplies neither `og:image` nor `twitter:image`.
pub const DEFAULT_SHARE_IMAGE: &str = "/og-default.jpg";

/// An HTML document with page metadata merged in.
///
/// Deliberately has no path back to [`CachedDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RenderedDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Merges page metadata into a shell, with a configured fallback image.
#[derive(Debug, Clone)]
pub struct Renderer {
    default_image: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_SHARE_IMAGE)
    }
}

impl Renderer {
    pub fn new(default_image: impl Into<String>) -> Self {
        Self {
            default_image: default_image.into(),
        }
    }

    /// Render `meta` into `base`.
    ///
    /// Returns `None` when there is no base document. Never fails otherwise:
    /// a shell missing `<title>` or `</head>` just receives fewer tags.
    pub fn render_template_with_meta(
        &self,
        base: Option<&CachedDocument>,
        meta: &PageMetadata,
    ) -> Option<RenderedDocument> {
        let base = base?;
        let mut html = base.html().to_owned();

        if let Some(title) = meta.title() {
            replace_title(&mut html, title);
        }

        if let Some(description) = meta.description() {
            let key = TagKey::meta("name", "description");
            upsert(&mut html, &key, &key.meta_markup(&description));
        }

        let canonical = meta.canonical();
        if let Some(href) = canonical {
            let key = TagKey::new(Element::Link, "rel", "canonical");
            upsert(&mut html, &key, &key.link_markup(href));
        }

        let needs_image = !meta.open_graph.has("og:image") && !meta.twitter.has("twitter:image");
        let image = needs_image.then_some(self.default_image.as_str());

        let families = [
            ("property", &meta.open_graph, "og:url", "og:image"),
            ("name", &meta.twitter, "twitter:url", "twitter:image"),
        ];
        for (attr, tags, url_key, image_key) in families {
            let mut written: Vec<&str> = Vec::new();
            for (name, content) in tags.iter() {
                let key = TagKey::meta(attr, name);
                let markup = key.meta_markup(content);
                // Repeated keys (e.g. `article:tag`) add tags after the first
                if written.contains(&name) {
                    insert_before_head_close(&mut html, &markup);
                } else {
                    upsert(&mut html, &key, &markup);
                    written.push(name);
                }
            }
            if let Some(href) = canonical.filter(|_| !tags.has(url_key)) {
                let key = TagKey::meta(attr, url_key);
                upsert(&mut html, &key, &key.meta_markup(href));
            }
            if let Some(src) = image {
                let key = TagKey::meta(attr, image_key);
                upsert(&mut html, &key, &key.meta_markup(src));
            }
        }

        if let Some(payload) = meta.json_ld().and_then(json_ld_payload) {
            let script = format!(r#"<script type="application/ld+json">{payload}</script>"#);
            insert_before_head_close(&mut html, &script);
        }

        Some(RenderedDocument(html))
    }
}
