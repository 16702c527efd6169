//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn tagline() -> String {
        "Design & Development Studio".into()
    }

    pub fn default_image() -> String {
        crate::shell::render::DEFAULT_SHARE_IMAGE.into()
    }

    pub fn locale() -> String {
        "en_US".into()
    }
}

// ============================================================================
// [template] Section Defaults
// ============================================================================

pub mod template {
    use std::path::PathBuf;

    /// Conventional build-output locations, in priority order.
    pub fn candidates() -> Vec<PathBuf> {
        [
            "dist/index.html",
            "build/index.html",
            "client/dist/index.html",
            "client/build/index.html",
            "public/index.html",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect()
    }
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "content.json".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5300
    }

    /// `Cache-Control: public, max-age=<this>` for rendered pages.
    pub fn max_age() -> u32 {
        300
    }
}
