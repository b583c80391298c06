//! Code fence tracking for line-by-line scans.
//!
//! Both the diagram detector and the wiki-syntax rewriter walk the document
//! line by line and need to know where fenced code blocks open and close.
//! Fences can use backticks or tildes (three or more); the closing fence must
//! use the same character and be at least as long as the opening fence.

/// An open code fence: its delimiter character and opening length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fence {
    ch: char,
    len: usize,
}

/// Parse a line as an opening fence.
///
/// Returns the fence and the info string after the delimiter (untrimmed).
pub(crate) fn parse_opening(line: &str) -> Option<(Fence, &str)> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let len = trimmed.chars().take_while(|&c| c == first).count();
    if len < 3 {
        return None;
    }

    Some((Fence { ch: first, len }, &trimmed[len..]))
}

/// Check whether a line closes the given fence.
///
/// The closing fence must use the same character, be at least as long as the
/// opening fence, and carry nothing but whitespace after the delimiter.
pub(crate) fn closes(line: &str, fence: Fence) -> bool {
    let trimmed = line.trim_start();
    if !trimmed.starts_with(fence.ch) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == fence.ch).count();
    if count < fence.len {
        return false;
    }

    trimmed[count..].chars().all(char::is_whitespace)
}

/// Tracks fence state during line-by-line processing.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Update fence state for a line. Returns `true` if the line is a fence
    /// marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        if let Some(fence) = self.open {
            if closes(line, fence) {
                self.open = None;
                return true;
            }
            false
        } else if let Some((fence, _)) = parse_opening(line) {
            self.open = Some(fence);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence_roundtrip() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("```rust"));
        assert!(tracker.in_fence());
        assert!(!tracker.update("fn main() {}"));
        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("~~~python"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_shorter_fence_does_not_close() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("````"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("````"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_mismatched_char_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.update("```");
        assert!(!tracker.update("~~~"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_two_backticks_not_a_fence() {
        assert!(parse_opening("``inline``").is_none());
    }

    #[test]
    fn test_opening_info_string() {
        let (fence, info) = parse_opening("```mermaid").unwrap();
        assert_eq!(info, "mermaid");
        assert!(closes("```", fence));
        assert!(closes("````  ", fence));
        assert!(!closes("``` trailing", fence));
    }

    #[test]
    fn test_indented_fence_detected() {
        let (_, info) = parse_opening("   ```rust").unwrap();
        assert_eq!(info, "rust");
    }
}
