//! Locating and upserting head elements inside an HTML string.
//!
//! Elements are found with a regex scan that respects quoted attribute
//! values. Only the head is scanned, up to the first `</head>`, and tags
//! inside comments or `<script>` bodies are not markup. Each candidate's attributes are then parsed with `quick-xml`, so
//! identity is decided by exact attribute-value equality and never by a
//! substring match. Because of this, `og:title` never matches
//! `og:title:extended`, and neither attribute order nor self-closing syntax
//! matters.
//!
//! All operations are fail-soft. When the anchor they need (`</head>`,
//! `<title>`) is missing they leave the document untouched and report
//! `false`.

use quick_xml::events::BytesStart;
use regex::{Match, Regex};
use std::{ops::Range, sync::LazyLock};

use super::escape::{escape_attr, escape_text};

/// `<meta ...>` with quoted attribute values allowed to contain `>`.
///
/// A quote only opens a quoted value right after `=`, so an unquoted value
/// such as `content=O'Brien` cannot run past the end of the tag.
static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\b(?:[^>"'=]|=\s*"[^"]*"|=\s*'[^']*'|[="'])*>"#).unwrap()
});

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link\b(?:[^>"'=]|=\s*"[^"]*"|=\s*'[^']*'|[="'])*>"#).unwrap()
});

/// Comments and script bodies.
static OPAQUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>").unwrap());

static TITLE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

/// Element kinds that can be upserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Meta,
    Link,
}

impl Element {
    const fn name(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Link => "link",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Meta => &META_TAG,
            Self::Link => &LINK_TAG,
        }
    }
}

/// Identity of an upsertable tag: element plus one identifying attribute.
///
/// `<meta property="og:title">` is `TagKey::new(Element::Meta, "property", "og:title")`.
#[derive(Debug, Clone, Copy)]
pub struct TagKey<'a> {
    pub element: Element,
    pub attr: &'a str,
    pub value: &'a str,
}

impl<'a> TagKey<'a> {
    pub const fn new(element: Element, attr: &'a str, value: &'a str) -> Self {
        Self { element, attr, value }
    }

    pub const fn meta(attr: &'a str, value: &'a str) -> Self {
        Self::new(Element::Meta, attr, value)
    }

    /// Serialize `<meta {attr}="{value}" content="{content}" />`.
    pub fn meta_markup(&self, content: &str) -> String {
        format!(
            r#"<meta {}="{}" content="{}" />"#,
            self.attr,
            escape_attr(self.value),
            escape_attr(content)
        )
    }

    /// Serialize `<link {attr}="{value}" href="{href}" />`.
    pub fn link_markup(&self, href: &str) -> String {
        format!(
            r#"<link {}="{}" href="{}" />"#,
            self.attr,
            escape_attr(self.value),
            escape_attr(href)
        )
    }

    /// Whether the raw tag text `tag` (e.g. `<meta name="x" content="y">`)
    /// carries this key's attribute with exactly this value.
    fn matches(&self, tag: &str) -> bool {
        let name = self.element.name();
        let inner = tag
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(tag)
            .trim_end()
            .trim_end_matches('/');
        if inner.len() < name.len() {
            return false;
        }

        let elem = BytesStart::from_content(inner, name.len());
        elem.html_attributes().flatten().any(|attr| {
            attr.key.as_ref().eq_ignore_ascii_case(self.attr.as_bytes())
                && attr.value.as_ref() == self.value.as_bytes()
        })
    }
}

/// Byte ranges of `html` whose content is not markup.
fn opaque_ranges(html: &str) -> Vec<Range<usize>> {
    OPAQUE.find_iter(html).map(|m| m.range()).collect()
}

fn is_opaque(opaque: &[Range<usize>], pos: usize) -> bool {
    opaque.iter().any(|r| r.contains(&pos))
}

/// Offset of the first `</head>` that is real markup.
fn head_close(html: &str, opaque: &[Range<usize>]) -> Option<usize> {
    HEAD_CLOSE
        .find_iter(html)
        .map(|m| m.start())
        .find(|&pos| !is_opaque(opaque, pos))
}

/// `element` tags in the head, outside comments and scripts.
///
/// Without a `</head>` the whole document counts as head.
fn head_tags(html: &str, element: Element) -> impl Iterator<Item = Match<'_>> {
    let opaque = opaque_ranges(html);
    let end = head_close(html, &opaque).unwrap_or(html.len());
    element
        .pattern()
        .find_iter(&html[..end])
        .filter(move |m| !is_opaque(&opaque, m.start()))
}

/// Byte range of the first tag in the head identified by `key`.
pub fn find_tag(html: &str, key: &TagKey<'_>) -> Option<Range<usize>> {
    head_tags(html, key.element)
        .find(|m| key.matches(m.as_str()))
        .map(|m| m.range())
}

/// Replace the tag identified by `key` with `markup`, or append `markup`
/// before `</head>` when no such tag exists.
///
/// Returns `false` only when the tag is absent and there is no `</head>`
/// to anchor the insertion.
pub fn upsert(html: &mut String, key: &TagKey<'_>, markup: &str) -> bool {
    match find_tag(html, key) {
        Some(range) => {
            html.replace_range(range, markup);
            true
        }
        None => insert_before_head_close(html, markup),
    }
}

/// Insert `markup` (followed by a newline) right before the first `</head>`.
pub fn insert_before_head_close(html: &mut String, markup: &str) -> bool {
    let Some(pos) = head_close(html, &opaque_ranges(html)) else {
        return false;
    };
    html.insert_str(pos, &format!("{markup}\n"));
    true
}

/// Replace the text of the first `<title>` element in the head, escaping
/// `title`.
///
/// Attributes on the opening tag are preserved.
pub fn replace_title(html: &mut String, title: &str) -> bool {
    let opaque = opaque_ranges(html);
    let end = head_close(html, &opaque).unwrap_or(html.len());
    let Some(range) = TITLE_ELEMENT
        .captures_iter(&html[..end])
        .filter_map(|caps| caps.get(1))
        .find(|m| !is_opaque(&opaque, m.start()))
        .map(|m| m.range())
    else {
        return false;
    };
    html.replace_range(range, &escape_text(title));
    true
}

/// Count tags identified by `key`.
#[cfg(test)]
pub fn count_tags(html: &str, key: &TagKey<'_>) -> usize {
    head_tags(html, key.element)
        .filter(|m| key.matches(m.as_str()))
        .count()
}

/// Read the `content` attribute of the first `<meta>` identified by `key`.
#[cfg(test)]
pub fn meta_content(html: &str, key: &TagKey<'_>) -> Option<String> {
    let range = find_tag(html, key)?;
    attribute(&html[range], key.element, "content")
}

/// Read attribute `attr` from a raw tag string.
#[cfg(test)]
fn attribute(tag: &str, element: Element, attr: &str) -> Option<String> {
    let name = element.name();
    let inner = tag
        .strip_prefix('<')?
        .strip_suffix('>')?
        .trim_end()
        .trim_end_matches('/');
    let elem = BytesStart::from_content(inner, name.len());
    elem.html_attributes()
        .flatten()
        .find(|a| a.key.as_ref().eq_ignore_ascii_case(attr.as_bytes()))
        .map(|a| String::from_utf8_lossy(a.value.as_ref()).into_owned())
}
