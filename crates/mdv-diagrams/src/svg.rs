//! SVG dimension extraction, preview box, and file export.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Fallback dimensions when the SVG declares none.
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// Inner width of the preview box.
const PREVIEW_WIDTH: usize = 48;

static VIEWBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"viewBox="[^"]*\s([0-9.]+)\s+([0-9.]+)""#).expect("valid viewBox regex")
});
static WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"width="([0-9.]+)""#).expect("valid width regex"));
static HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"height="([0-9.]+)""#).expect("valid height regex"));

/// Extract pixel dimensions from SVG markup.
///
/// Prefers the `viewBox` extent, falls back to explicit `width`/`height`
/// attributes, and defaults to 800x600 when neither is parseable.
#[must_use]
pub fn extract_svg_dimensions(svg: &str) -> (u32, u32) {
    if let Some(caps) = VIEWBOX_RE.captures(svg)
        && let (Some(w), Some(h)) = (parse_px(&caps[1]), parse_px(&caps[2]))
    {
        return (w, h);
    }

    let width = WIDTH_RE
        .captures(svg)
        .and_then(|caps| parse_px(&caps[1]))
        .unwrap_or(DEFAULT_WIDTH);
    let height = HEIGHT_RE
        .captures(svg)
        .and_then(|caps| parse_px(&caps[1]))
        .unwrap_or(DEFAULT_HEIGHT);
    (width, height)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_px(value: &str) -> Option<u32> {
    let px = value.parse::<f64>().ok()?;
    if px.is_finite() && px >= 0.0 {
        Some(px.round() as u32)
    } else {
        None
    }
}

/// Fixed-width text box naming a diagram's kind and dimensions, printed
/// when a terminal cannot display the rendered diagram inline.
#[must_use]
pub fn preview_box(kind: &str, width: u32, height: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!("┌{}┐\n", "─".repeat(PREVIEW_WIDTH + 2)));
    out.push_str(&format!("│ {:<PREVIEW_WIDTH$} │\n", clip(&format!("Diagram: {kind}"))));
    out.push_str(&format!(
        "│ {:<PREVIEW_WIDTH$} │\n",
        clip(&format!("Size: {width}x{height} px"))
    ));
    out.push_str(&format!("└{}┘\n", "─".repeat(PREVIEW_WIDTH + 2)));
    out
}

fn clip(text: &str) -> String {
    text.chars().take(PREVIEW_WIDTH).collect()
}

/// Write SVG markup to a file, creating parent directories on demand.
pub fn save_svg(svg: &str, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, svg)
}

/// Write PNG bytes to a file, creating parent directories on demand.
pub fn save_png(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytes)
}
