//! Aspect-preserving raster resizing.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageFormat;

use crate::TermImageError;

/// Resize an encoded image to a target pixel width, preserving aspect
/// ratio, and re-encode as PNG.
///
/// An image already at the target width is returned unchanged (original
/// encoding included).
pub fn resize_to_width(bytes: &[u8], target_width: u32) -> Result<Vec<u8>, TermImageError> {
    let img = image::load_from_memory(bytes)?;
    if img.width() == target_width {
        return Ok(bytes.to_vec());
    }

    let height = scaled_height(img.width(), img.height(), target_width);
    let resized = img.resize_exact(target_width, height, FilterType::Triangle);

    let mut buf = Vec::new();
    resized.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let ratio = f64::from(height) / f64::from(width);
    ((f64::from(target_width) * ratio).round() as u32).max(1)
}
