//! SEO metadata injection into the site shell.
//!
//! - [`store`]: cached `index.html` with freshness checks
//! - [`render`]: merges [`PageMetadata`] into the cached shell
//! - [`tags`]: upsert primitives used by the renderer
//!
//! ```ignore
//! let store = TemplateStore::new(candidates);
//! let renderer = Renderer::new(default_image);
//!
//! let base = store.ensure_fresh();
//! let html = renderer.render_template_with_meta(base.as_deref(), &meta);  // None => serve without SEO
//! ```

pub mod escape;
pub mod meta;
pub mod render;
pub mod store;
pub mod tags;

pub use meta::{PageMetadata, normalize_description};
pub use render::Renderer;
pub use store::TemplateStore;
