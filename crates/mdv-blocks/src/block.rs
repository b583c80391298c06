//! Content block types and merging.

/// A fenced diagram code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Classified diagram kind ("Flowchart", "Sequence Diagram", "Unknown", ...).
    pub kind: String,
    /// Raw diagram source between the fences, verbatim.
    pub source: String,
    /// 1-indexed line of the opening fence.
    pub start_line: usize,
    /// 1-indexed line of the closing fence.
    pub end_line: usize,
}

/// An inline image reference on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    /// Alt text with any `|width=` annotation stripped.
    pub alt: String,
    /// Image path as written in the document.
    pub path: String,
    /// Width hint in pixels from the `|width=` annotation (0 = unset).
    pub width: u32,
    /// 1-indexed line of the reference.
    pub line: usize,
}

/// A typed, positioned span of special content within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Diagram(DiagramBlock),
    Image(ImageBlock),
}

impl ContentBlock {
    /// 1-indexed line where this block starts.
    #[must_use]
    pub fn start_line(&self) -> usize {
        match self {
            Self::Diagram(d) => d.start_line,
            Self::Image(i) => i.line,
        }
    }

    /// 1-indexed line where this block ends (inclusive).
    #[must_use]
    pub fn end_line(&self) -> usize {
        match self {
            Self::Diagram(d) => d.end_line,
            Self::Image(i) => i.line,
        }
    }
}

/// Merge detector outputs into one sequence ordered by document position.
///
/// Blocks are concatenated and stable-sorted by start line, so at equal start
/// lines diagram blocks keep their place ahead of image blocks (detector
/// arrival order). Empty inputs yield an empty sequence, which downstream
/// code treats as "style the whole document as one segment".
///
/// Detectors produce non-overlapping spans by construction; this is asserted
/// in debug builds. The rendering pipeline still clamps block windows, so a
/// violated invariant degrades rather than panics in release builds.
#[must_use]
pub fn merge_blocks(diagrams: Vec<ContentBlock>, images: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut blocks = diagrams;
    blocks.extend(images);
    blocks.sort_by_key(ContentBlock::start_line);

    debug_assert!(
        blocks
            .windows(2)
            .all(|w| w[0].end_line() < w[1].start_line() || w[0].start_line() == w[1].start_line()),
        "detectors produced overlapping block spans"
    );

    blocks
}
