//! Diagram compilation for `mdv`.
//!
//! Renders mermaid diagram source to SVG or PNG through an isolated headless
//! browser session per call (see `mdv-browser` for the session seam):
//!
//! - [`Compiler::render`] produces a [`CompiledDiagram`] and never fails:
//!   every failure mode is carried in the result's `error` field so callers
//!   apply their own fallback policy
//! - [`Compiler::render_to_png`] captures a raster screenshot and does
//!   propagate errors, since a raster has no partial-success representation
//!
//! Also provides the helpers the rendering pipeline needs around compiled
//! diagrams: SVG dimension extraction, the preview box fallback, file
//! export, and mermaid.live / mermaid.ink URLs.

mod compiler;
mod consts;
mod svg;
mod url;

pub use compiler::{CompileError, CompiledDiagram, Compiler};
pub use svg::{extract_svg_dimensions, preview_box, save_png, save_svg};
pub use url::{image_url, live_url};
