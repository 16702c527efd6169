//! Per-route page metadata.
//!
//! Each builder turns site identity plus (optionally) one content entity
//! into a [`PageMetadata`]. Every page gets the same baseline:
//!
//! | Tag                                   | Source                      |
//! |---------------------------------------|-----------------------------|
//! | `<title>`, `og:title`, `twitter:title`| `"{page} \| {site name}"`   |
//! | description family                    | entity summary or site default |
//! | canonical                             | `base.url` + route path     |
//! | `og:site_name`, `og:locale`, `og:type`| site config / page kind     |
//! | `twitter:card`, `twitter:site`        | `summary_large_image`, config |
//!
//! Entity pages add images and schema.org JSON-LD.

use serde_json::{Map, Value, json};

use crate::config::SiteConfig;
use crate::content::{Case, ContentStore, PageTemplate, Post};
use crate::shell::{PageMetadata, normalize_description};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// How many entries the index pages list in their structured data.
const INDEX_LIMIT: usize = 20;

// ============================================================================
// Builders
// ============================================================================

pub fn home(config: &SiteConfig) -> PageMetadata {
    let base = &config.base;
    let title = format!("{} | {}", base.name, base.tagline);
    let mut meta = page(config, &title, None, "/", "website");

    let mut organization = json!({
        "@type": "Organization",
        "name": base.name,
        "url": base.absolute_url("/"),
        "logo": base.logo.as_deref().map(|logo| base.absolute_url(logo)),
    });
    if let Some(handle) = &base.twitter_site {
        organization["sameAs"] = json!([format!("https://x.com/{}", handle.trim_start_matches('@'))]);
    }

    meta.json_ld = Some(prune(json!({
        "@context": SCHEMA_CONTEXT,
        "@graph": [
            organization,
            {
                "@type": "WebSite",
                "name": base.name,
                "url": base.absolute_url("/"),
                "description": non_empty(&base.description),
            }
        ]
    })));
    meta
}

pub fn blog_index(config: &SiteConfig, content: &ContentStore) -> PageMetadata {
    let base = &config.base;
    let description = format!("Articles and notes from the {} team.", base.name);
    let mut meta = page(config, &base.page_title("Blog"), Some(&description), "/blog", "website");

    let posts: Vec<Value> = content
        .posts()
        .take(INDEX_LIMIT)
        .map(|post| {
            json!({
                "@type": "BlogPosting",
                "headline": post.title,
                "url": base.absolute_url(&post_path(post)),
                "datePublished": post.published_date().map(|d| d.to_rfc3339()),
            })
        })
        .collect();

    meta.json_ld = Some(prune(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Blog",
        "name": format!("{} Blog", base.name),
        "url": base.absolute_url("/blog"),
        "blogPost": posts,
    })));
    meta
}

pub fn blog_post(config: &SiteConfig, post: &Post) -> PageMetadata {
    let base = &config.base;
    let path = post_path(post);
    let summary = post.summary();
    let mut meta = page(config, &base.page_title(&post.title), summary.as_deref(), &path, "article");

    let published = post.published_date().map(|d| d.to_rfc3339());
    let modified = post.updated_date().map(|d| d.to_rfc3339());
    let image = post.image.as_deref().map(|src| base.absolute_url(src));

    meta.open_graph
        .set_opt("article:published_time", published.clone())
        .set_opt("article:modified_time", modified.clone())
        .set_opt("article:author", post.author.clone());
    for tag in &post.tags {
        meta.open_graph.append("article:tag", tag.clone());
    }
    set_image(&mut meta, image.clone());

    meta.json_ld = Some(prune(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BlogPosting",
        "headline": post.title,
        "description": summary,
        "url": base.absolute_url(&path),
        "mainEntityOfPage": base.absolute_url(&path),
        "datePublished": published,
        "dateModified": modified.or(published),
        "image": image,
        "author": post.author.as_ref().map(|name| json!({ "@type": "Person", "name": name })),
        "publisher": { "@type": "Organization", "name": base.name },
        "keywords": (!post.tags.is_empty()).then(|| post.tags.join(", ")),
    })));
    meta
}

pub fn case_index(config: &SiteConfig, content: &ContentStore) -> PageMetadata {
    let base = &config.base;
    let description = format!("Selected client work by {}.", base.name);
    let mut meta = page(config, &base.page_title("Cases"), Some(&description), "/cases", "website");
    meta.json_ld = Some(item_list(
        config,
        "/cases",
        "CreativeWork",
        content
            .cases()
            .iter()
            .map(|case| (case.title.as_str(), case_path(case))),
    ));
    meta
}

pub fn case_study(config: &SiteConfig, case: &Case) -> PageMetadata {
    let base = &config.base;
    let path = case_path(case);
    let summary = case.summary.as_deref().map(normalize_description);
    let mut meta = page(config, &base.page_title(&case.title), summary.as_deref(), &path, "article");

    let image = case.image.as_deref().map(|src| base.absolute_url(src));
    set_image(&mut meta, image.clone());

    meta.json_ld = Some(prune(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "CreativeWork",
        "name": case.title,
        "description": summary,
        "url": base.absolute_url(&path),
        "image": image,
        "genre": case.industry,
        "creator": { "@type": "Organization", "name": base.name },
        "sourceOrganization": case.client.as_ref().map(|client| json!({ "@type": "Organization", "name": client })),
    })));
    meta
}

pub fn template_index(config: &SiteConfig, content: &ContentStore) -> PageMetadata {
    let base = &config.base;
    let description = format!("Ready-made website templates designed by {}.", base.name);
    let mut meta = page(
        config,
        &base.page_title("Templates"),
        Some(&description),
        "/templates",
        "website",
    );
    meta.json_ld = Some(item_list(
        config,
        "/templates",
        "Product",
        content
            .templates()
            .iter()
            .map(|tpl| (tpl.name.as_str(), template_path(tpl))),
    ));
    meta
}

pub fn page_template(config: &SiteConfig, tpl: &PageTemplate) -> PageMetadata {
    let base = &config.base;
    let path = template_path(tpl);
    let description = tpl.description.as_deref().map(normalize_description);
    let mut meta = page(config, &base.page_title(&tpl.name), description.as_deref(), &path, "product");

    let image = tpl.preview_image.as_deref().map(|src| base.absolute_url(src));
    set_image(&mut meta, image.clone());

    let offer = tpl.price().map(|price| {
        json!({
            "@type": "Offer",
            "price": price,
            "priceCurrency": tpl.currency,
            "availability": "https://schema.org/InStock",
            "url": base.absolute_url(&path),
        })
    });
    if let Some(price) = tpl.price() {
        meta.open_graph
            .set("product:price:amount", price)
            .set("product:price:currency", tpl.currency.clone());
    }

    meta.json_ld = Some(prune(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Product",
        "name": tpl.name,
        "description": description,
        "image": image,
        "url": base.absolute_url(&path),
        "brand": { "@type": "Brand", "name": base.name },
        "offers": offer,
    })));
    meta
}

/// Metadata for an unknown entity. No canonical: the page should not be indexed.
pub fn not_found(config: &SiteConfig) -> PageMetadata {
    let mut meta = page(config, &config.base.page_title("Page not found"), None, "/", "website");
    meta.canonical = None;
    meta
}

/// Site defaults for client-side routes the server knows nothing about.
pub fn fallback(config: &SiteConfig, path: &str) -> PageMetadata {
    let base = &config.base;
    let title = format!("{} | {}", base.name, base.tagline);
    page(config, &title, None, path, "website")
}

// ============================================================================
// Paths
// ============================================================================

pub fn post_path(post: &Post) -> String {
    format!("/blog/{}", urlencoding::encode(&post.slug))
}

pub fn case_path(case: &Case) -> String {
    format!("/cases/{}", urlencoding::encode(&case.slug))
}

pub fn template_path(tpl: &PageTemplate) -> String {
    format!("/templates/{}", urlencoding::encode(&tpl.slug))
}

// ============================================================================
// Helpers
// ============================================================================

/// Baseline metadata shared by every page.
fn page(
    config: &SiteConfig,
    title: &str,
    description: Option<&str>,
    path: &str,
    og_type: &str,
) -> PageMetadata {
    let base = &config.base;
    let description = description
        .filter(|d| !d.trim().is_empty())
        .or_else(|| non_empty(&base.description))
        .map(normalize_description);

    let mut meta = PageMetadata {
        title: Some(title.to_owned()),
        description: description.clone(),
        canonical: Some(base.absolute_url(path)),
        ..Default::default()
    };

    meta.open_graph
        .set("og:site_name", base.name.clone())
        .set("og:locale", base.locale.clone())
        .set("og:type", og_type)
        .set("og:title", title)
        .set_opt("og:description", description.clone());

    meta.twitter
        .set("twitter:card", "summary_large_image")
        .set("twitter:title", title)
        .set_opt("twitter:description", description)
        .set_opt("twitter:site", base.twitter_site.clone());

    meta
}

/// Set both image tags; leave them unset (so the renderer falls back to the
/// default share image) when the entity has none.
fn set_image(meta: &mut PageMetadata, image: Option<String>) {
    if let Some(src) = image {
        meta.open_graph.set("og:image", src.clone());
        meta.twitter.set("twitter:image", src);
    }
}

/// `CollectionPage` whose list items are entities of `item_type`.
fn item_list<'a>(
    config: &SiteConfig,
    path: &str,
    item_type: &str,
    items: impl Iterator<Item = (&'a str, String)>,
) -> Value {
    let base = &config.base;
    let elements: Vec<Value> = items
        .take(INDEX_LIMIT)
        .enumerate()
        .map(|(i, (name, item_path))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "item": {
                    "@type": item_type,
                    "name": name,
                    "url": base.absolute_url(&item_path),
                },
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "CollectionPage",
        "url": base.absolute_url(path),
        "mainEntity": { "@type": "ItemList", "itemListElement": elements },
    })
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Remove `null` members so optional fields disappear from the JSON-LD.
fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune).collect()),
        other => other,
    }
}
