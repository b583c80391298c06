//! Terminal capabilities and raster helpers for `mdv`.
//!
//! - [`ImageProtocol`]: which inline-image escape protocol the active
//!   terminal understands, classified from environment signals
//! - [`write_inline_image`]: emit a PNG through the detected protocol
//! - [`resize_to_width`]: aspect-preserving raster resize for width hints
//! - [`terminal_width`]: wrap-width probe with an 80-column fallback

mod protocol;
mod resize;
mod width;

pub use protocol::{EnvSignals, ImageProtocol, write_inline_image};
pub use resize::resize_to_width;
pub use width::terminal_width;

/// Errors from inline-image display and raster handling.
#[derive(Debug, thiserror::Error)]
pub enum TermImageError {
    #[error("inline images are not supported in this terminal")]
    Unsupported,

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
