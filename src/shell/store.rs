//! Cached site shell with mtime-based freshness.
//!
//! The shell is the frontend build's `index.html`. It is looked up in a
//! prioritized candidate list: the configured override first, then the
//! conventional build-output locations. The first candidate that exists and
//! is a regular file wins.
//!
//! # Freshness
//!
//! There is no background poller. [`TemplateStore::ensure_fresh`] stats the
//! candidates on every call and re-reads the winning file when its path or
//! modification time differs from what is cached.
//!
//! # Concurrency
//!
//! The cached document lives in an `ArcSwapOption`. Readers get an
//! `Arc<CachedDocument>` without locking. A refresh builds a new document
//! and swaps it in. When refreshes run concurrently, the last writer wins.

use arc_swap::ArcSwapOption;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use crate::log;

/// In-memory copy of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    html: String,
    source: PathBuf,
    modified: Option<SystemTime>,
}

impl CachedDocument {
    /// Build a document that is not backed by a file.
    #[cfg(test)]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            source: PathBuf::new(),
            modified: None,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// File the document was read from (empty for in-memory documents).
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Modification time observed before the file was read.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn is_current(&self, stat: &Stat) -> bool {
        self.source == stat.path && self.modified == stat.modified
    }
}

/// Result of statting a candidate.
#[derive(Debug)]
struct Stat {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// Owner of the cached shell.
///
/// Intended to be created once and shared with request handlers, but any
/// number of independent stores can coexist (tests rely on that).
#[derive(Debug)]
pub struct TemplateStore {
    candidates: Vec<PathBuf>,
    cached: ArcSwapOption<CachedDocument>,
}

impl TemplateStore {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            cached: ArcSwapOption::empty(),
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Currently cached shell, loading it on first access.
    ///
    /// Returns `None` when no candidate can be read. Callers should then
    /// serve the page without SEO injection.
    pub fn base_template(&self) -> Option<Arc<CachedDocument>> {
        self.cached.load_full().or_else(|| self.refresh())
    }

    /// Re-stat the candidates and reload the shell if the winning file or its
    /// modification time changed.
    ///
    /// A candidate that exists but cannot be read is skipped in favor of the
    /// next one. If no candidate is readable right now (e.g. mid-deploy), the
    /// last successfully loaded shell keeps being served.
    pub fn ensure_fresh(&self) -> Option<Arc<CachedDocument>> {
        let current = self.cached.load_full();

        for stat in self.candidates.iter().filter_map(|path| stat_path(path)) {
            if current.as_deref().is_some_and(|doc| doc.is_current(&stat)) {
                return current;
            }
            if let Some(doc) = read_document(stat) {
                if current.is_some() {
                    log!("shell"; "reloaded {}", doc.source.display());
                }
                return Some(self.store(doc));
            }
        }

        if current.is_some() {
            log!("shell"; "no readable shell candidate, serving last loaded copy");
        }
        current
    }

    /// Reload unconditionally, bypassing the modification time check.
    ///
    /// Returns `None` (and keeps the previous copy cached) when no candidate
    /// can be read.
    pub fn refresh(&self) -> Option<Arc<CachedDocument>> {
        let doc = self
            .candidates
            .iter()
            .filter_map(|path| stat_path(path))
            .find_map(read_document)?;
        Some(self.store(doc))
    }

    fn store(&self, doc: CachedDocument) -> Arc<CachedDocument> {
        let doc = Arc::new(doc);
        self.cached.store(Some(Arc::clone(&doc)));
        doc
    }
}

fn stat_path(path: &Path) -> Option<Stat> {
    let meta = fs::metadata(path).ok().filter(fs::Metadata::is_file)?;
    Some(Stat {
        path: path.to_path_buf(),
        modified: meta.modified().ok(),
    })
}

/// The mtime recorded is the one seen before reading, so a write that lands
/// mid-read is picked up by the next freshness check.
fn read_document(stat: Stat) -> Option<CachedDocument> {
    match fs::read_to_string(&stat.path) {
        Ok(html) => Some(CachedDocument {
            html,
            source: stat.path,
            modified: stat.modified,
        }),
        Err(err) => {
            log!("shell"; "failed to read {}: {err}", stat.path.display());
            None
        }
    }
}
