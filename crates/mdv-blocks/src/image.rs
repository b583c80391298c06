//! Inline image reference detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{ContentBlock, ImageBlock};
use crate::fence::FenceTracker;

/// Inline image syntax: `![alt text](path)`.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid image regex"));

/// File extensions supported for inline display.
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Alt-text delimiter for an out-of-band width hint.
const WIDTH_ANNOTATION: &str = "|width=";

/// Detect local image references, one single-line block per match.
///
/// Web URLs and unsupported file extensions are skipped: those stay in the
/// prose and are styled as ordinary markdown. A `|width=<n>` annotation in
/// the alt text is parsed out; if the value is not an unsigned integer the
/// raw alt text is kept as-is and the width stays unset.
///
/// Lines inside fenced code blocks are skipped, so image syntax quoted in
/// code (a mermaid node label, say) never produces a block overlapping a
/// diagram span.
#[must_use]
pub fn detect_image_blocks(text: &str) -> Vec<ContentBlock> {
    let mut tracker = FenceTracker::new();
    let mut blocks = Vec::new();

    for (idx, line) in text.split('\n').enumerate() {
        if tracker.update(line) || tracker.in_fence() {
            continue;
        }
        for caps in IMAGE_RE.captures_iter(line) {
            let alt = &caps[1];
            let path = caps[2].trim();

            if path.starts_with("http://") || path.starts_with("https://") {
                continue;
            }
            if !has_supported_extension(path) {
                continue;
            }

            let (alt, width) = parse_width_annotation(alt);
            blocks.push(ContentBlock::Image(ImageBlock {
                alt,
                path: path.to_owned(),
                width,
                line: idx + 1,
            }));
        }
    }

    blocks
}

fn has_supported_extension(path: &str) -> bool {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Split a `|width=<n>` annotation off the alt text.
///
/// A malformed width is a recoverable, silent condition: the annotation stays
/// in the alt text and the width is reported as 0 (unset).
fn parse_width_annotation(alt: &str) -> (String, u32) {
    if let Some((clean, value)) = alt.split_once(WIDTH_ANNOTATION)
        && let Ok(width) = value.parse::<u32>()
    {
        return (clean.to_owned(), width);
    }
    (alt.to_owned(), 0)
}
