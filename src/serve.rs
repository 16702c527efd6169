//! HTTP server: static assets plus the shell rendered with per-route metadata.
//!
//! Built on `tiny_http`:
//!
//! - Static files from the assets directory (the shell's directory by default)
//! - Every other `GET`/`HEAD` path renders the shell with page metadata
//! - Graceful shutdown on Ctrl+C
//!
//! # Request flow
//!
//! ```text
//!   request ──► method check ──► static asset? ──► file
//!                                     │
//!                                     ▼
//!                              ensure_fresh() ──► 503 if no shell
//!                                     │
//!                                     ▼
//!                         route ──► PageMetadata ──► render ──► 200 / 404
//! ```
//!
//! Routing lives in [`resolve`], which is free of sockets so it can be
//! exercised directly (and by the `render` command).

use crate::{
    config::SiteConfig,
    content::ContentStore,
    log, log_verbose, pages,
    shell::{PageMetadata, Renderer, TemplateStore},
};
use anyhow::{Context, Result};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

// ============================================================================
// Application State
// ============================================================================

/// Everything a request needs, built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub config: SiteConfig,
    pub templates: TemplateStore,
    pub renderer: Renderer,
    pub content: ContentStore,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let content = ContentStore::load(&config.content.path)?;
        let templates = TemplateStore::new(config.template.candidate_paths());
        let renderer = Renderer::new(config.base.share_image());

        let (posts, cases, tpls) = content.counts();
        log_verbose!("content"; "{posts} posts, {cases} cases, {tpls} templates");

        Ok(Self {
            config,
            templates,
            renderer,
            content,
        })
    }
}

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the server and block until Ctrl+C.
pub fn serve_site(state: AppState) -> Result<()> {
    let interface: IpAddr = state.config.serve.interface.parse()?;
    let base_port = state.config.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    match state.templates.base_template() {
        Some(shell) => log!("shell"; "using {}", shell.source().display()),
        None => log!("shell"; "no shell found yet, answering 503 until one appears"),
    }
    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &state) {
            log!("error"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn handle_request(request: Request, state: &AppState) -> Result<()> {
    let reply = resolve(state, request.method(), request.url());
    log_verbose!("serve"; "{} {} {}", request.method(), request.url(), reply.status);
    request.respond(reply.into_response())?;
    Ok(())
}

// ============================================================================
// Routing
// ============================================================================

/// A response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub cache_control: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(status: u16, body: String, cache_control: String) -> Self {
        Self {
            status,
            content_type: HTML_CONTENT_TYPE,
            cache_control: Some(cache_control),
            body: body.into_bytes(),
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: TEXT_CONTENT_TYPE,
            cache_control: None,
            body: message.as_bytes().to_vec(),
        }
    }

    fn file(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            cache_control: None,
            body,
        }
    }

    #[cfg(test)]
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(header("Content-Type", self.content_type));
        if let Some(value) = self.cache_control
            && let Ok(h) = Header::from_bytes("Cache-Control", value)
        {
            response.add_header(h);
        }
        response
    }
}

/// Header from static ASCII.
fn header(name: &'static str, value: &'static str) -> Header {
    Header::from_bytes(name, value).expect("static header is valid ASCII")
}

/// Map a request to a reply.
///
/// Resolution order:
/// 1. Non-`GET`/`HEAD` → 405
/// 2. Existing file under the assets directory (except `index.html`) → file
/// 3. No shell available → 503
/// 4. Known route → rendered shell (404 for unknown slugs)
/// 5. Anything else → rendered shell with site defaults
pub fn resolve(state: &AppState, method: &Method, url: &str) -> Reply {
    if !matches!(method, Method::Get | Method::Head) {
        return Reply::text(405, "method not allowed");
    }

    // Strip query string (e.g. ?utm_source=x) before decoding
    let raw_path = url.split(['?', '#']).next().unwrap_or_default();
    let Ok(path) = urlencoding::decode(raw_path) else {
        return Reply::text(400, "bad request");
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == ".." || s.contains('\\')) {
        return Reply::text(400, "bad request");
    }

    let shell = state.templates.ensure_fresh();

    let assets_dir = state
        .config
        .serve
        .assets
        .clone()
        .or_else(|| shell.as_ref().and_then(|doc| doc.source().parent().map(Path::to_path_buf)));
    if let Some(file) = assets_dir.and_then(|dir| asset_path(&dir, &segments)) {
        return match fs::read(&file) {
            Ok(body) => Reply::file(guess_content_type(&file), body),
            Err(e) => {
                log!("error"; "failed to read {}: {e}", file.display());
                Reply::text(404, "not found")
            }
        };
    }

    let Some(shell) = shell else {
        return Reply::text(503, "site shell unavailable");
    };

    let (status, meta) = route(state, &segments);
    match state.renderer.render_template_with_meta(Some(&*shell), &meta) {
        Some(doc) => Reply::html(status, doc.into_string(), state.config.serve.cache_control()),
        None => Reply::text(503, "site shell unavailable"),
    }
}

/// Page metadata for a path, with the status to answer.
fn route(state: &AppState, segments: &[&str]) -> (u16, PageMetadata) {
    let config = &state.config;
    let content = &state.content;

    let found = |meta: Option<PageMetadata>| match meta {
        Some(meta) => (200, meta),
        None => (404, pages::not_found(config)),
    };

    match segments {
        [] => (200, pages::home(config)),
        ["blog"] => (200, pages::blog_index(config, content)),
        ["blog", slug] => found(content.post(slug).map(|post| pages::blog_post(config, post))),
        ["cases"] => (200, pages::case_index(config, content)),
        ["cases", slug] => found(content.case(slug).map(|case| pages::case_study(config, case))),
        ["templates"] => (200, pages::template_index(config, content)),
        ["templates", slug] => {
            found(content.template(slug).map(|tpl| pages::page_template(config, tpl)))
        }
        _ => (200, pages::fallback(config, &format!("/{}", segments.join("/")))),
    }
}

/// A regular file under `dir` addressed by `segments`, if any.
fn asset_path(dir: &Path, segments: &[&str]) -> Option<PathBuf> {
    let last = segments.last()?;
    if last.eq_ignore_ascii_case("index.html") {
        return None;
    }

    let path: PathBuf = segments.iter().fold(dir.to_path_buf(), |acc, s| acc.join(s));
    let relative = path.strip_prefix(dir).ok()?;
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    (contained && path.is_file()).then_some(path)
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => HTML_CONTENT_TYPE,
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json" | "map") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("pdf") => "application/pdf",
        Some("txt") => TEXT_CONTENT_TYPE,

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHELL: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8" />
<title>Northwind</title>
<meta name="description" content="placeholder" />
</head>
<body><div id="root"></div><script src="/assets/app.js"></script></body>
</html>"#;

    const CONTENT: &str = r#"{
        "posts": [
            { "slug": "launch-week", "title": "Launch week", "published_at": "2024-05-02" },
            { "slug": "café", "title": "Coffee notes" }
        ],
        "cases": [{ "slug": "acme", "title": "Acme rebrand" }],
        "templates": [{ "slug": "saas", "name": "SaaS Landing", "price_cents": 4900 }]
    }"#;

    const CONFIG: &str = r#"
        [base]
        name = "Northwind"
        url = "https://northwind.dev"
        description = "Websites and brands"

        [serve]
        max_age = 120
    "#;

    fn setup(with_shell: bool) -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(dist.join("assets")).unwrap();
        fs::write(dist.join("assets/app.js"), "console.log(1)").unwrap();
        if with_shell {
            fs::write(dist.join("index.html"), SHELL).unwrap();
        }
        fs::write(dir.path().join("content.json"), CONTENT).unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let mut config = SiteConfig::from_str(CONFIG).unwrap();
        config.update_path_with_root(dir.path());
        let state = AppState::new(config).unwrap();
        (dir, state)
    }

    fn get(state: &AppState, url: &str) -> Reply {
        resolve(state, &Method::Get, url)
    }

    #[test]
    fn test_home_page() {
        let (_dir, state) = setup(true);
        let reply = get(&state, "/");

        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "text/html; charset=UTF-8");
        assert_eq!(reply.cache_control.as_deref(), Some("public, max-age=120"));

        let body = reply.body_str();
        assert!(body.contains("<title>Northwind | Design &amp; Development Studio</title>"));
        assert!(body.contains(r#"<link rel="canonical" href="https://northwind.dev/" />"#));
        assert!(body.contains(r#"<meta name="description" content="Websites and brands" />"#));
        assert!(!body.contains("placeholder"));
    }

    #[test]
    fn test_blog_post_with_trailing_slash_and_query() {
        let (_dir, state) = setup(true);
        let reply = get(&state, "/blog/launch-week/?utm_source=news");

        assert_eq!(reply.status, 200);
        let body = reply.body_str();
        assert!(body.contains("<title>Launch week | Northwind</title>"));
        assert!(body.contains(r#"<meta property="og:type" content="article" />"#));
        assert!(body.contains(r#"<link rel="canonical" href="https://northwind.dev/blog/launch-week" />"#));
    }

    #[test]
    fn test_percent_encoded_slug() {
        let (_dir, state) = setup(true);
        let reply = get(&state, "/blog/caf%C3%A9");
        assert_eq!(reply.status, 200);
        assert!(reply.body_str().contains("<title>Coffee notes | Northwind</title>"));
        assert!(reply.body_str().contains(
            r#"<link rel="canonical" href="https://northwind.dev/blog/caf%C3%A9" />"#
        ));
    }

    #[test]
    fn test_unknown_slug_is_404_with_shell() {
        let (_dir, state) = setup(true);
        for url in ["/blog/missing", "/cases/missing", "/templates/missing"] {
            let reply = get(&state, url);
            assert_eq!(reply.status, 404, "{url}");
            assert!(reply.body_str().contains("<title>Page not found | Northwind</title>"));
            assert!(reply.body_str().contains(r#"<div id="root"></div>"#));
            assert!(!reply.body_str().contains("rel=\"canonical\""));
        }
    }

    #[test]
    fn test_known_routes() {
        let (_dir, state) = setup(true);
        assert!(get(&state, "/blog").body_str().contains("<title>Blog | Northwind</title>"));
        assert!(get(&state, "/cases/acme").body_str().contains("Acme rebrand | Northwind"));
        assert!(get(&state, "/templates").body_str().contains("<title>Templates | Northwind</title>"));
        assert!(
            get(&state, "/templates/saas")
                .body_str()
                .contains(r#""@type":"Product""#)
        );
    }

    #[test]
    fn test_spa_fallback() {
        let (_dir, state) = setup(true);
        let reply = get(&state, "/contact");

        assert_eq!(reply.status, 200);
        assert!(reply.body_str().contains(r#"<link rel="canonical" href="https://northwind.dev/contact" />"#));

        // The shell itself is never served raw
        let reply = get(&state, "/index.html");
        assert_eq!(reply.status, 200);
        assert!(!reply.body_str().contains("placeholder"));
    }

    #[test]
    fn test_static_asset() {
        let (_dir, state) = setup(true);
        let reply = get(&state, "/assets/app.js?v=3");

        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/javascript; charset=utf-8");
        assert_eq!(reply.body, b"console.log(1)");
        assert!(reply.cache_control.is_none());
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (_dir, state) = setup(true);
        assert_eq!(get(&state, "/../secret.txt").status, 400);
        assert_eq!(get(&state, "/assets/%2e%2e/%2e%2e/secret.txt").status, 400);
    }

    #[test]
    fn test_method_not_allowed() {
        let (_dir, state) = setup(true);
        assert_eq!(resolve(&state, &Method::Post, "/").status, 405);
        assert_eq!(resolve(&state, &Method::Head, "/").status, 200);
    }

    #[test]
    fn test_missing_shell_is_503() {
        let (_dir, state) = setup(false);
        let reply = get(&state, "/blog");

        assert_eq!(reply.status, 503);
        assert_eq!(reply.body_str(), "site shell unavailable");
    }

    #[test]
    fn test_assets_served_from_configured_dir_without_shell() {
        let (dir, mut state) = setup(false);
        state.config.serve.assets = Some(dir.path().join("dist"));

        assert_eq!(get(&state, "/assets/app.js").status, 200);
        assert_eq!(get(&state, "/").status, 503);
    }

    #[test]
    fn test_shell_change_picked_up() {
        let (dir, state) = setup(true);
        assert!(get(&state, "/").body_str().contains(r#"<div id="root"></div>"#));

        let shell = dir.path().join("dist/index.html");
        fs::write(&shell, SHELL.replace("root", "app")).unwrap();
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&shell)
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert!(get(&state, "/").body_str().contains(r#"<div id="app"></div>"#));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.woff2")), "font/woff2");
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
    }
}
