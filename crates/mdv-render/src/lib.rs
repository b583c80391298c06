//! Inline rendering pipeline for `mdv`.
//!
//! Walks a preprocessed document in order, styling prose segments and
//! dispatching diagram and image blocks to their mode-specific renderers
//! so everything appears at its original document position:
//!
//! - [`Pipeline::render`]: the segment walk itself
//! - [`RenderOptions`] / [`Mode`]: what to do with diagram blocks
//!
//! A failed block is logged and skipped; the surrounding prose and the
//! remaining blocks still render.

mod options;
mod pipeline;

pub use options::{Mode, ParseModeError, RenderOptions};
pub use pipeline::Pipeline;

use mdv_style::StyleError;

/// Errors that abort a whole render invocation.
///
/// Per-block failures never surface here; they are downgraded to warnings
/// inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
