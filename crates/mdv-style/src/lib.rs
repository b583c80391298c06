//! Markdown styling for terminal display.
//!
//! [`TextStyler`] turns GitHub-flavored Markdown into ANSI-styled,
//! word-wrapped text. [`AnsiStyler`] is the pulldown-cmark
//! implementation; [`Theme`] selects the color palette.

mod ansi;
mod theme;

pub use ansi::AnsiStyler;
pub use theme::Theme;

use std::io;
use std::path::PathBuf;

/// Errors from theme resolution and styling.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("unknown style token {0:?} in theme")]
    UnknownToken(String),

    #[error("failed to read theme file {path}: {source}")]
    ThemeRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("theme file {path} is not valid JSON: {source}")]
    ThemeParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Converts Markdown text into terminal-ready output.
pub trait TextStyler {
    /// Style a Markdown document for display.
    fn style(&self, markdown: &str) -> Result<String, StyleError>;
}
