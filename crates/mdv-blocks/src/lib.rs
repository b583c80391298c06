//! Content block detection for markdown documents.
//!
//! This crate locates the typed spans that `mdv` renders out of band:
//! - [`detect_diagram_blocks`]: fenced diagram code blocks (` ```mermaid `)
//! - [`detect_image_blocks`]: inline image references (`![alt](path)`)
//! - [`rewrite_wiki_syntax`]: Obsidian-style `[[..]]` / `![[..]]` shorthand,
//!   rewritten into standard markdown before detection
//! - [`merge_blocks`]: all detected blocks merged into one sequence ordered
//!   by document position
//!
//! Detectors are pure functions over the raw document text. They never fail;
//! a document without special content simply yields an empty sequence. Line
//! numbers are 1-indexed against the document split on `\n` and are only
//! valid for the exact text the detection pass ran on.

mod block;
mod diagram;
mod fence;
mod image;
mod wiki;

pub use block::{ContentBlock, DiagramBlock, ImageBlock, merge_blocks};
pub use diagram::{classify_diagram_kind, detect_diagram_blocks};
pub use image::detect_image_blocks;
pub use wiki::rewrite_wiki_syntax;
