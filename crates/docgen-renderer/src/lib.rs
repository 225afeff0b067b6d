//! HTML rendering for docgen.
//!
//! - [`MarkdownRenderer`] converts doc strings, module docs and notes to HTML
//!   over `pulldown-cmark` events, with GitHub-style heading anchors and math
//!   left in place for MathJax.
//! - [`render_efmt`] turns pretty-printed types into linked HTML.
//! - [`Linker`] builds declaration links from the name-location table.
//!
//! # Example
//!
//! ```
//! use docgen_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("# Groups\n\nSee `group`.");
//! assert_eq!(result.toc[0].id, "groups");
//! ```

mod efmt;
mod html;
mod linker;
mod markdown;
mod state;
mod summary;

pub use efmt::render_efmt;
pub use html::{htmlify_name, import_options};
pub use linker::Linker;
pub use markdown::{DEFAULT_CODE_LANGUAGE, MarkdownRenderer, RenderResult, render_markdown};
pub use state::{TocEntry, escape_html, heading_anchor};
pub use summary::{DEFAULT_SUMMARY_CHARS, plaintext_summary, split_on_hr};
