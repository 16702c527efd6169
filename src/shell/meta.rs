//! Per-page metadata handed to the renderer.
//!
//! A `PageMetadata` is built fresh for every request and describes what the
//! page presents to crawlers and social previews:
//!
//! | Field         | Written as                                   |
//! |---------------|----------------------------------------------|
//! | `title`       | content of the first `<title>`               |
//! | `description` | `<meta name="description">`                  |
//! | `canonical`   | `<link rel="canonical">`                     |
//! | `open_graph`  | `<meta property="og:*">` (and `article:*`)   |
//! | `twitter`     | `<meta name="twitter:*">`                    |
//! | `json_ld`     | `<script type="application/ld+json">`        |
//!
//! Empty or whitespace-only values are treated as absent and never written.

use serde_json::Value;

/// Upper bound (in characters) for the description meta tag.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// Ordered tag-name → content mapping.
///
/// Keeps insertion order so the rendered head is deterministic. Setting an
/// existing key replaces its value in place; [`TagSet::append`] adds another
/// value for multi-valued properties such as `article:tag`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<(String, String)>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    /// Add another value for `key`, keeping earlier ones.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Insert `key` only when `value` is present.
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    /// Value for `key` if present and non-blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| non_blank(v))
    }

    /// Whether `key` carries a non-blank value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries with non-blank keys and values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| Some((non_blank(k)?, non_blank(v)?)))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

/// What a single page should present to crawlers and link previews.
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    /// Keyed by full property name, e.g. `og:title` or `article:author`.
    pub open_graph: TagSet,
    /// Keyed by full meta name, e.g. `twitter:card`.
    pub twitter: TagSet,
    pub json_ld: Option<Value>,
}

impl PageMetadata {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().and_then(non_blank)
    }

    /// Description with whitespace collapsed and length capped.
    pub fn description(&self) -> Option<String> {
        self.description
            .as_deref()
            .and_then(non_blank)
            .map(normalize_description)
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref().and_then(non_blank)
    }

    pub fn json_ld(&self) -> Option<&Value> {
        self.json_ld.as_ref().filter(|v| !v.is_null())
    }
}

/// Collapse runs of whitespace into single spaces and cap the result at
/// [`MAX_DESCRIPTION_CHARS`] characters, ending with `…` when cut.
pub fn normalize_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return collapsed;
    }

    let mut cut: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[inline]
fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_replaces_in_place() {
        let mut tags = TagSet::new();
        tags.set("og:title", "A").set("og:type", "website").set("og:title", "B");

        let entries: Vec<_> = tags.iter().collect();
        assert_eq!(entries, vec![("og:title", "B"), ("og:type", "website")]);
    }

    #[test]
    fn test_tag_set_skips_blank_values() {
        let tags: TagSet = [("og:title", "  "), ("og:type", "article"), ("", "x")]
            .into_iter()
            .collect();

        assert!(!tags.has("og:title"));
        assert_eq!(tags.iter().count(), 1);
        assert_eq!(tags.get("og:type"), Some("article"));
    }

    #[test]
    fn test_tag_set_append_keeps_earlier_values() {
        let mut tags = TagSet::new();
        tags.append("article:tag", "news").append("article:tag", "product");

        let entries: Vec<_> = tags.iter().collect();
        assert_eq!(entries, vec![("article:tag", "news"), ("article:tag", "product")]);
        assert_eq!(tags.get("article:tag"), Some("news"));
    }

    #[test]
    fn test_tag_set_set_opt() {
        let mut tags = TagSet::new();
        tags.set_opt("og:image", None::<String>)
            .set_opt("og:url", Some("https://example.com"));

        assert!(!tags.has("og:image"));
        assert!(tags.has("og:url"));
    }

    #[test]
    fn test_empty_fields_are_absent() {
        let meta = PageMetadata {
            title: Some(String::new()),
            description: Some(" \n\t".into()),
            canonical: Some(String::new()),
            json_ld: Some(Value::Null),
            ..Default::default()
        };

        assert!(meta.title().is_none());
        assert!(meta.description().is_none());
        assert!(meta.canonical().is_none());
        assert!(meta.json_ld().is_none());
    }

    #[test]
    fn test_normalize_description_collapses_whitespace() {
        assert_eq!(
            normalize_description("  Web design\n\n  and   branding\tstudio "),
            "Web design and branding studio"
        );
    }

    #[test]
    fn test_normalize_description_caps_length() {
        let long = "word \n ".repeat(120);
        let normalized = normalize_description(&long);

        assert!(normalized.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(normalized.ends_with('…'));
        assert!(!normalized.contains("  "));
        assert!(!normalized.contains('\n'));
    }

    #[test]
    fn test_normalize_description_multibyte_boundary() {
        let long = "é".repeat(MAX_DESCRIPTION_CHARS + 20);
        let normalized = normalize_description(&long);
        assert_eq!(normalized.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn test_normalize_description_exact_limit_untouched() {
        let exact = "a".repeat(MAX_DESCRIPTION_CHARS);
        assert_eq!(normalize_description(&exact), exact);
    }
}
