//! Shareable viewing URLs for diagram source.
//!
//! Used by URL mode, where diagrams are never compiled locally: the raw
//! source is base64-encoded into hosted viewer/image URL templates instead.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const LIVE_URL_PREFIX: &str = "https://mermaid.live/edit#pako:";
const IMAGE_URL_PREFIX: &str = "https://mermaid.ink/img/";

/// URL opening the diagram in the live editor.
#[must_use]
pub fn live_url(source: &str) -> String {
    format!("{LIVE_URL_PREFIX}{}", STANDARD.encode(source.trim()))
}

/// URL serving the diagram as a rendered image.
#[must_use]
pub fn image_url(source: &str) -> String {
    format!("{IMAGE_URL_PREFIX}{}", STANDARD.encode(source.trim()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_live_url_encodes_trimmed_source() {
        let url = live_url("  graph TD\n  A --> B\n  ");
        assert_eq!(
            url,
            format!("{LIVE_URL_PREFIX}{}", STANDARD.encode("graph TD\n  A --> B"))
        );
    }

    #[test]
    fn test_image_url_prefix() {
        assert!(image_url("pie").starts_with(IMAGE_URL_PREFIX));
    }

    #[test]
    fn test_urls_differ_only_in_template() {
        let live = live_url("graph TD");
        let image = image_url("graph TD");
        let live_payload = live.strip_prefix(LIVE_URL_PREFIX).unwrap();
        let image_payload = image.strip_prefix(IMAGE_URL_PREFIX).unwrap();
        assert_eq!(live_payload, image_payload);
    }
}
