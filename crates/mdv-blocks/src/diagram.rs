//! Diagram fence detection.
//!
//! A single left-to-right scan over the document lines, tracking fence state
//! and line numbers incrementally. Fences whose info string names a diagram
//! language become [`DiagramBlock`]s; all other fences are still tracked so a
//! diagram marker inside an ordinary code block is not misdetected.

use crate::block::{ContentBlock, DiagramBlock};
use crate::fence::{self, Fence};

/// Diagram kind keywords, matched by prefix against the first non-blank line
/// of the diagram source. Slice order is the match order, which keeps
/// classification deterministic.
const DIAGRAM_KINDS: &[(&str, &str)] = &[
    ("sequenceDiagram", "Sequence Diagram"),
    ("classDiagram", "Class Diagram"),
    ("stateDiagram", "State Diagram"),
    ("erDiagram", "ER Diagram"),
    ("flowchart", "Flowchart"),
    ("graph", "Flowchart"),
    ("gantt", "Gantt Chart"),
    ("pie", "Pie Chart"),
    ("gitgraph", "Git Graph"),
    ("journey", "User Journey"),
];

/// Fence info strings that mark a diagram block.
const DIAGRAM_MARKER: &str = "mermaid";

/// Classify diagram source by its first non-blank line.
///
/// Unrecognized content classifies as `"Unknown"`.
#[must_use]
pub fn classify_diagram_kind(source: &str) -> &'static str {
    let first_line = source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    DIAGRAM_KINDS
        .iter()
        .find(|(keyword, _)| first_line.starts_with(keyword))
        .map_or("Unknown", |&(_, kind)| kind)
}

/// State of the scan: outside any fence, inside a diagram fence collecting
/// its body, or inside an ordinary code fence waiting for it to close.
enum ScanState {
    Outside,
    InDiagram {
        fence: Fence,
        start_line: usize,
        body: Vec<usize>,
    },
    InCode(Fence),
}

/// Detect fenced diagram blocks in document order.
///
/// Line numbers are 1-indexed; `start_line` is the opening fence and
/// `end_line` the closing fence. The inner text is kept verbatim. An
/// unterminated fence at end of document produces no block.
#[must_use]
pub fn detect_diagram_blocks(text: &str) -> Vec<ContentBlock> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut blocks = Vec::new();
    let mut state = ScanState::Outside;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        state = match state {
            ScanState::Outside => match fence::parse_opening(line) {
                Some((fence, info)) if info.trim() == DIAGRAM_MARKER => ScanState::InDiagram {
                    fence,
                    start_line: line_no,
                    body: Vec::new(),
                },
                Some((fence, _)) => ScanState::InCode(fence),
                None => ScanState::Outside,
            },
            ScanState::InDiagram {
                fence,
                start_line,
                mut body,
            } => {
                if fence::closes(line, fence) {
                    let source: String = body
                        .iter()
                        .map(|&i| lines[i])
                        .collect::<Vec<_>>()
                        .join("\n");
                    blocks.push(ContentBlock::Diagram(DiagramBlock {
                        kind: classify_diagram_kind(&source).to_owned(),
                        source,
                        start_line,
                        end_line: line_no,
                    }));
                    ScanState::Outside
                } else {
                    body.push(idx);
                    ScanState::InDiagram {
                        fence,
                        start_line,
                        body,
                    }
                }
            }
            ScanState::InCode(fence) => {
                if fence::closes(line, fence) {
                    ScanState::Outside
                } else {
                    ScanState::InCode(fence)
                }
            }
        };
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diagrams(text: &str) -> Vec<DiagramBlock> {
        detect_diagram_blocks(text)
            .into_iter()
            .map(|b| match b {
                ContentBlock::Diagram(d) => d,
                ContentBlock::Image(_) => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_no_diagrams() {
        assert_eq!(diagrams("# Title\n\nplain prose\n"), Vec::new());
        assert_eq!(diagrams("```rust\nfn main() {}\n```\n"), Vec::new());
    }

    #[test]
    fn test_single_diagram_line_numbers() {
        let text = "intro\n\n```mermaid\ngraph TD\n  A --> B\n```\ntail\n";
        let found = diagrams(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_line, 3);
        assert_eq!(found[0].end_line, 6);
        assert_eq!(found[0].source, "graph TD\n  A --> B");
        assert_eq!(found[0].kind, "Flowchart");
    }

    #[test]
    fn test_source_kept_verbatim() {
        let text = "```mermaid\n  graph TD\n\n    A --> B\n```\n";
        let found = diagrams(text);
        assert_eq!(found[0].source, "  graph TD\n\n    A --> B");
    }

    #[test]
    fn test_multiple_diagrams_in_document_order() {
        let text = "```mermaid\ngraph TD\n```\n\ntext\n\n```mermaid\nsequenceDiagram\n```\n";
        let found = diagrams(text);
        assert_eq!(found.len(), 2);
        assert!(found[0].start_line < found[1].start_line);
        assert_eq!(found[1].kind, "Sequence Diagram");
    }

    #[test]
    fn test_marker_inside_ordinary_fence_ignored() {
        let text = "````text\n```mermaid\ngraph TD\n```\n````\n";
        assert_eq!(diagrams(text), Vec::new());
    }

    #[test]
    fn test_unterminated_fence_yields_no_block() {
        let text = "```mermaid\ngraph TD\n  A --> B\n";
        assert_eq!(diagrams(text), Vec::new());
    }

    #[test]
    fn test_lines_within_document_bounds() {
        let text = "a\n```mermaid\npie\n```\nb";
        let line_count = text.split('\n').count();
        for block in diagrams(text) {
            assert!(block.start_line >= 1);
            assert!(block.start_line <= block.end_line);
            assert!(block.end_line <= line_count);
        }
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify_diagram_kind("sequenceDiagram\n  A->>B: hi"), "Sequence Diagram");
        assert_eq!(classify_diagram_kind("graph LR"), "Flowchart");
        assert_eq!(classify_diagram_kind("flowchart TB"), "Flowchart");
        assert_eq!(classify_diagram_kind("classDiagram"), "Class Diagram");
        assert_eq!(classify_diagram_kind("stateDiagram-v2"), "State Diagram");
        assert_eq!(classify_diagram_kind("erDiagram"), "ER Diagram");
        assert_eq!(classify_diagram_kind("gantt"), "Gantt Chart");
        assert_eq!(classify_diagram_kind("pie title Pets"), "Pie Chart");
        assert_eq!(classify_diagram_kind("gitgraph"), "Git Graph");
        assert_eq!(classify_diagram_kind("journey"), "User Journey");
    }

    #[test]
    fn test_classification_unknown() {
        assert_eq!(classify_diagram_kind("zebraDiagram"), "Unknown");
        assert_eq!(classify_diagram_kind(""), "Unknown");
    }

    #[test]
    fn test_classification_skips_blank_lines() {
        assert_eq!(classify_diagram_kind("\n\n  gantt\n"), "Gantt Chart");
    }
}
