//! Rendering options shared across the pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What to do with diagram blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Inline image in capable terminals, ASCII preview box otherwise.
    #[default]
    Terminal,
    /// Export each diagram as an SVG file next to its re-styled source.
    Svg,
    /// Export each diagram as a PNG file next to its re-styled source.
    Png,
    /// Splice view/image URLs into the document instead of compiling.
    Url,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown diagram mode {0:?}, expected terminal, svg, png or url")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terminal" => Ok(Self::Terminal),
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "url" => Ok(Self::Url),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

/// Immutable per-invocation rendering configuration.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Theme name (`auto|dark|light|clean`) or path to a theme file.
    pub style: String,
    /// Wrap width in columns.
    pub width: u16,
    /// When false, diagram fences stay ordinary code blocks.
    pub diagrams_enabled: bool,
    /// Diagram handling mode.
    pub mode: Mode,
    /// Directory for exported diagram files, created on demand.
    pub out_dir: PathBuf,
    /// In terminal mode, also persist each diagram's SVG.
    pub keep_files: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: "clean".to_owned(),
            width: 80,
            diagrams_enabled: true,
            mode: Mode::Terminal,
            out_dir: std::env::temp_dir(),
            keep_files: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_mode_parse_round_trip() {
        for mode in [Mode::Terminal, Mode::Svg, Mode::Png, Mode::Url] {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "jpeg".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("jpeg"));
    }

    #[test]
    fn test_default_mode_is_terminal() {
        assert_eq!(Mode::default(), Mode::Terminal);
        assert_eq!(RenderOptions::default().mode, Mode::Terminal);
    }
}
