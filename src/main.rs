//! seo-shell - serve a single-page app's `index.html` with per-page SEO metadata.

mod cli;
mod config;
mod content;
mod logger;
mod pages;
mod serve;
mod shell;

use anyhow::{Result, bail};
use chrono::{DateTime, Local};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::{AppState, resolve, serve_site};
use std::io::{Write, stdout};
use tiny_http::Method;

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(&cli);

    let config = SiteConfig::load(&cli)?;
    log_verbose!("config"; "loaded {}", config.config_path.display());
    let state = AppState::new(config)?;

    match &cli.command {
        Commands::Serve { .. } => serve_site(state),
        Commands::Render { path } => render_path(&state, path),
        Commands::Check => check(&state),
    }
}

/// `render` writes HTML to stdout, so its log lines go to stderr.
fn configure_logging(cli: &Cli) {
    logger::set_verbose(cli.verbose);
    logger::log_to_stderr(matches!(cli.command, Commands::Render { .. }));
}

/// Render one path to stdout; the status goes to stderr.
fn render_path(state: &AppState, path: &str) -> Result<()> {
    let path = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    };
    let reply = resolve(state, &Method::Get, &path);

    let mut out = stdout().lock();
    out.write_all(&reply.body)?;
    out.flush()?;
    eprintln!("{} {}", reply.status, path);

    if reply.status >= 400 {
        bail!("`{path}` answered {}", reply.status);
    }
    Ok(())
}

/// Report the winning shell candidate and loaded content.
fn check(state: &AppState) -> Result<()> {
    let shell = state.templates.base_template();

    for candidate in state.templates.candidates() {
        let marker = match &shell {
            Some(doc) if doc.source() == candidate => "*",
            _ if candidate.is_file() => "+",
            _ => "-",
        };
        log!("shell"; "{marker} {}", candidate.display());
    }

    let Some(doc) = shell else {
        bail!("no shell candidate could be read");
    };

    let modified = doc
        .modified()
        .map(|time| DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".into());
    log!("shell"; "using {} (modified {modified})", doc.source().display());

    let (posts, cases, templates) = state.content.counts();
    log!(
        "content";
        "{posts} posts, {cases} cases, {templates} templates from {}",
        state.config.content.path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_logs_to_stderr() {
        configure_logging(&Cli::parse_from(["seo-shell", "-v", "render", "/"]));
        assert!(logger::logs_to_stderr());

        configure_logging(&Cli::parse_from(["seo-shell", "-v", "check"]));
        assert!(!logger::logs_to_stderr());
    }
}
