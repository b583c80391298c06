//! Color themes for terminal output.

use std::fs;
use std::path::Path;

use console::{Color, Style};
use serde::Deserialize;

use crate::StyleError;

/// Resolved set of [`Style`]s applied while rendering.
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub subheading: Style,
    pub code: Style,
    pub code_block: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    pub link: Style,
    pub url: Style,
    pub blockquote: Style,
    pub bullet: Style,
    pub rule: Style,
}

impl Theme {
    /// Resolve a theme by name, or load a JSON theme file from a path.
    ///
    /// Built-in names are `auto`, `dark`, `light` and `clean`; anything
    /// else is treated as a filesystem path.
    pub fn resolve(name: &str) -> Result<Self, StyleError> {
        match name {
            "auto" => Ok(if console::colors_enabled() {
                Self::dark()
            } else {
                Self::clean()
            }),
            "dark" => Ok(Self::dark()),
            "light" => Ok(Self::light()),
            "clean" => Ok(Self::clean()),
            path => Self::from_file(Path::new(path)),
        }
    }

    /// Plain text: no colors, no attributes.
    #[must_use]
    pub fn clean() -> Self {
        Self {
            heading: Style::new(),
            subheading: Style::new(),
            code: Style::new(),
            code_block: Style::new(),
            emphasis: Style::new(),
            strong: Style::new(),
            strikethrough: Style::new(),
            link: Style::new(),
            url: Style::new(),
            blockquote: Style::new(),
            bullet: Style::new(),
            rule: Style::new(),
        }
    }

    /// Palette tuned for dark backgrounds.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            heading: Style::new().cyan().bold(),
            subheading: Style::new().cyan(),
            code: Style::new().yellow(),
            code_block: Style::new().yellow(),
            emphasis: Style::new().italic(),
            strong: Style::new().bold(),
            strikethrough: Style::new().strikethrough().dim(),
            link: Style::new().blue().underlined(),
            url: Style::new().dim(),
            blockquote: Style::new().green(),
            bullet: Style::new().magenta(),
            rule: Style::new().dim(),
        }
    }

    /// Palette tuned for light backgrounds.
    #[must_use]
    pub fn light() -> Self {
        Self {
            heading: Style::new().blue().bold(),
            subheading: Style::new().blue(),
            code: Style::new().red(),
            code_block: Style::new().red(),
            emphasis: Style::new().italic(),
            strong: Style::new().bold(),
            strikethrough: Style::new().strikethrough().dim(),
            link: Style::new().blue().underlined(),
            url: Style::new().dim(),
            blockquote: Style::new().magenta(),
            bullet: Style::new().blue(),
            rule: Style::new().dim(),
        }
    }

    fn from_file(path: &Path) -> Result<Self, StyleError> {
        let raw = fs::read_to_string(path).map_err(|source| StyleError::ThemeRead {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: ThemeSpec =
            serde_json::from_str(&raw).map_err(|source| StyleError::ThemeParse {
                path: path.to_path_buf(),
                source,
            })?;
        spec.into_theme()
    }
}

/// On-disk theme file. Each field is a space-separated token list, e.g.
/// `"bold cyan"` or `"bright red underline"`; omitted fields keep the
/// dark-theme default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeSpec {
    heading: Option<String>,
    subheading: Option<String>,
    code: Option<String>,
    code_block: Option<String>,
    emphasis: Option<String>,
    strong: Option<String>,
    strikethrough: Option<String>,
    link: Option<String>,
    url: Option<String>,
    blockquote: Option<String>,
    bullet: Option<String>,
    rule: Option<String>,
}

impl ThemeSpec {
    fn into_theme(self) -> Result<Theme, StyleError> {
        let mut theme = Theme::dark();
        apply(&mut theme.heading, self.heading)?;
        apply(&mut theme.subheading, self.subheading)?;
        apply(&mut theme.code, self.code)?;
        apply(&mut theme.code_block, self.code_block)?;
        apply(&mut theme.emphasis, self.emphasis)?;
        apply(&mut theme.strong, self.strong)?;
        apply(&mut theme.strikethrough, self.strikethrough)?;
        apply(&mut theme.link, self.link)?;
        apply(&mut theme.url, self.url)?;
        apply(&mut theme.blockquote, self.blockquote)?;
        apply(&mut theme.bullet, self.bullet)?;
        apply(&mut theme.rule, self.rule)?;
        Ok(theme)
    }
}

fn apply(slot: &mut Style, spec: Option<String>) -> Result<(), StyleError> {
    if let Some(spec) = spec {
        *slot = parse_style(&spec)?;
    }
    Ok(())
}

fn parse_style(spec: &str) -> Result<Style, StyleError> {
    let mut style = Style::new();
    for token in spec.split_whitespace() {
        style = match token {
            "bold" => style.bold(),
            "dim" => style.dim(),
            "italic" => style.italic(),
            "underline" => style.underlined(),
            "strikethrough" => style.strikethrough(),
            "reverse" => style.reverse(),
            "bright" => style.bright(),
            _ => style.fg(parse_color(token)?),
        };
    }
    Ok(style)
}

fn parse_color(token: &str) -> Result<Color, StyleError> {
    Ok(match token {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        other => other
            .parse::<u8>()
            .map(Color::Color256)
            .map_err(|_| StyleError::UnknownToken(other.to_owned()))?,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Render a probe string with styling forced on, so two styles can
    /// be compared by their escape output.
    fn rendered(style: &Style) -> String {
        style
            .clone()
            .force_styling(true)
            .apply_to("probe")
            .to_string()
    }

    #[test]
    fn test_builtin_names_resolve() {
        for name in ["auto", "dark", "light", "clean"] {
            assert!(Theme::resolve(name).is_ok(), "builtin {name} failed");
        }
    }

    #[test]
    fn test_missing_theme_file_is_read_error() {
        let err = Theme::resolve("/no/such/theme.json").unwrap_err();
        assert!(matches!(err, StyleError::ThemeRead { .. }));
    }

    #[test]
    fn test_theme_file_overrides_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"heading": "bold red", "bullet": "208"}}"#).unwrap();

        let theme = Theme::resolve(&file.path().to_string_lossy()).unwrap();
        assert_eq!(
            rendered(&theme.heading),
            rendered(&Style::new().bold().fg(Color::Red))
        );
        assert_eq!(
            rendered(&theme.bullet),
            rendered(&Style::new().fg(Color::Color256(208)))
        );
        // Untouched fields keep the dark default.
        assert_eq!(rendered(&theme.code), rendered(&Theme::dark().code));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Theme::resolve(&file.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, StyleError::ThemeParse { .. }));
    }

    #[test]
    fn test_unknown_token_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"heading": "sparkly"}}"#).unwrap();

        let err = Theme::resolve(&file.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, StyleError::UnknownToken(t) if t == "sparkly"));
    }

    #[test]
    fn test_parse_style_combines_tokens() {
        let style = parse_style("bright cyan underline").unwrap();
        assert_eq!(
            rendered(&style),
            rendered(&Style::new().bright().fg(Color::Cyan).underlined())
        );
    }
}
