//! Site content: blog posts, case studies and sellable page templates.
//!
//! Content is read from a single JSON document:
//!
//! ```json
//! {
//!   "posts":     [{ "slug": "launch-week", "title": "Launch week", "published_at": "2024-05-02" }],
//!   "cases":     [{ "slug": "acme-rebrand", "title": "Acme rebrand", "client": "Acme" }],
//!   "templates": [{ "slug": "saas-landing", "name": "SaaS Landing", "price_cents": 4900 }]
//! }
//! ```
//!
//! Dates accept `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (UTC) and RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use thiserror::Error;

use crate::log;
use crate::shell::normalize_description;

/// Errors raised while loading the content file.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid content JSON in `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),
}

// ============================================================================
// Types
// ============================================================================

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    /// HTML or plain text body; used for the excerpt fallback.
    pub body: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub tags: Vec<String>,
    /// Drafts (`false`) are never served.
    pub published: bool,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            slug: String::new(),
            title: String::new(),
            excerpt: None,
            body: None,
            author: None,
            image: None,
            published_at: None,
            updated_at: None,
            tags: Vec::new(),
            published: true,
        }
    }
}

impl Post {
    /// Explicit excerpt, or the body stripped of markup.
    pub fn summary(&self) -> Option<String> {
        if let Some(excerpt) = self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            return Some(normalize_description(excerpt));
        }
        let text = strip_markup(self.body.as_deref()?);
        (!text.is_empty()).then(|| normalize_description(&text))
    }

    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_date)
    }

    pub fn updated_date(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_date)
    }
}

/// A case study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Case {
    pub slug: String,
    pub title: String,
    pub client: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub industry: Option<String>,
}

/// A page template offered for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTemplate {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<u64>,
    pub currency: String,
    pub preview_image: Option<String>,
    pub demo_url: Option<String>,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            slug: String::new(),
            name: String::new(),
            description: None,
            price_cents: None,
            currency: "USD".into(),
            preview_image: None,
            demo_url: None,
        }
    }
}

impl PageTemplate {
    /// Price as a decimal string, e.g. `4900` → `"49.00"`.
    pub fn price(&self) -> Option<String> {
        self.price_cents
            .map(|cents| format!("{}.{:02}", cents / 100, cents % 100))
    }
}

// ============================================================================
// Store
// ============================================================================

/// All content, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStore {
    posts: Vec<Post>,
    cases: Vec<Case>,
    templates: Vec<PageTemplate>,
}

impl ContentStore {
    /// Load from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log!("content"; "{} not found, serving without content", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(ContentError::Io(path.to_path_buf(), err)),
        };
        Self::from_json(&content).map_err(|err| ContentError::Json(path.to_path_buf(), err))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut store: Self = serde_json::from_str(json)?;
        store.posts.sort_by(compare_posts);
        Ok(store)
    }

    /// Published posts, newest first.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| p.published)
    }

    pub fn post(&self, slug: &str) -> Option<&Post> {
        self.posts().find(|p| p.slug == slug)
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn case(&self, slug: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.slug == slug)
    }

    pub fn templates(&self) -> &[PageTemplate] {
        &self.templates
    }

    pub fn template(&self, slug: &str) -> Option<&PageTemplate> {
        self.templates.iter().find(|t| t.slug == slug)
    }

    /// `(posts, cases, templates)` counts, drafts excluded.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.posts().count(), self.cases.len(), self.templates.len())
    }
}

/// Newest first; undated posts last, ties broken by title.
fn compare_posts(a: &Post, b: &Post) -> Ordering {
    match (a.published_date(), b.published_date()) {
        (Some(da), Some(db)) => db.cmp(&da).then_with(|| a.title.cmp(&b.title)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339 into UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Drop tags and collapse whitespace.
fn strip_markup(html: &str) -> String {
    MARKUP
        .replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONTENT: &str = r#"{
        "posts": [
            { "slug": "old", "title": "Old news", "published_at": "2023-01-10" },
            { "slug": "undated", "title": "Undated" },
            { "slug": "new", "title": "Fresh", "published_at": "2024-06-01T09:30:00+02:00",
              "body": "<p>Hello <b>world</b>,\n  this is new.</p>" },
            { "slug": "draft", "title": "Draft", "published": false, "published_at": "2025-01-01" },
            { "slug": "mysql", "title": "From MySQL", "published_at": "2024-02-03 10:00:00" }
        ],
        "cases": [{ "slug": "acme", "title": "Acme rebrand", "client": "Acme" }],
        "templates": [{ "slug": "saas", "name": "SaaS Landing", "price_cents": 4905 }]
    }"#;

    #[test]
    fn test_posts_sorted_newest_first() {
        let store = ContentStore::from_json(CONTENT).unwrap();
        let slugs: Vec<_> = store.posts().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mysql", "old", "undated"]);
    }

    #[test]
    fn test_drafts_are_hidden() {
        let store = ContentStore::from_json(CONTENT).unwrap();
        assert!(store.post("draft").is_none());
        assert_eq!(store.counts(), (4, 1, 1));
    }

    #[test]
    fn test_lookups() {
        let store = ContentStore::from_json(CONTENT).unwrap();
        assert_eq!(store.post("old").unwrap().title, "Old news");
        assert_eq!(store.case("acme").unwrap().client.as_deref(), Some("Acme"));
        assert_eq!(store.template("saas").unwrap().currency, "USD");
        assert!(store.case("missing").is_none());
    }

    #[test]
    fn test_summary_falls_back_to_stripped_body() {
        let store = ContentStore::from_json(CONTENT).unwrap();
        let post = store.post("new").unwrap();
        assert_eq!(post.summary().as_deref(), Some("Hello world , this is new."));
        assert!(store.post("old").unwrap().summary().is_none());
    }

    #[test]
    fn test_template_price() {
        let store = ContentStore::from_json(CONTENT).unwrap();
        assert_eq!(store.template("saas").unwrap().price().as_deref(), Some("49.05"));
        assert_eq!(PageTemplate::default().price(), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("2024-06-01").unwrap().to_rfc3339(),
            "2024-06-01T00:00:00+00:00"
        );
        assert_eq!(
            parse_date("2024-06-01 12:30:00").unwrap().to_rfc3339(),
            "2024-06-01T12:30:00+00:00"
        );
        assert_eq!(
            parse_date("2024-06-01T09:30:00+02:00").unwrap().to_rfc3339(),
            "2024-06-01T07:30:00+00:00"
        );
        assert!(parse_date("June 1st").is_none());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::load(&dir.path().join("content.json")).unwrap();
        assert_eq!(store, ContentStore::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, "{ \"posts\": [ }").unwrap();

        let err = ContentStore::load(&path).unwrap_err();
        assert!(matches!(err, ContentError::Json(..)));
        assert!(err.to_string().contains("content.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, CONTENT).unwrap();

        let store = ContentStore::load(&path).unwrap();
        assert_eq!(store.cases().len(), 1);
        assert_eq!(store.templates().len(), 1);
    }
}
