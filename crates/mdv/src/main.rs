//! mdv - terminal markdown viewer with inline diagram rendering.
//!
//! Views markdown files (or stdin) with ANSI styling, compiles mermaid
//! diagram fences to inline terminal images or exported files, and can
//! export whole documents to PDF.

mod error;
mod output;

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use error::CliError;
use mdv_blocks::ContentBlock;
use mdv_render::{Mode, Pipeline, RenderOptions};
use mdv_style::AnsiStyler;
use output::Output;

/// Terminal markdown viewer with mermaid diagram support.
#[derive(Parser)]
#[command(
    name = "mdv",
    version,
    about,
    long_about = "mdv renders markdown files with ANSI styling in the terminal. Mermaid \
diagram fences are compiled and shown inline where the terminal allows it, \
exported to SVG/PNG files, or linked as mermaid.live URLs. Documents can \
also be exported to PDF.

Examples:
  mdv README.md                 # view a markdown file
  cat notes.md | mdv            # read from stdin
  mdv notes.md --style dark     # dark color theme
  mdv notes.md -p notes.pdf     # export to PDF"
)]
struct Cli {
    /// Markdown file to view ("-" reads standard input).
    file: Option<PathBuf>,

    /// Color style: clean, auto, dark, light, or a path to a theme file.
    #[arg(short, long, default_value = "clean")]
    style: String,

    /// Wrap width in columns (0 = auto-detect).
    #[arg(short, long, default_value_t = 0)]
    width: u16,

    /// Disable diagram detection; fences render as ordinary code blocks.
    #[arg(long)]
    no_diagrams: bool,

    /// Open each diagram in the browser before viewing.
    #[arg(long)]
    open_diagrams: bool,

    /// Export the document to a PDF file instead of viewing it.
    #[arg(short = 'p', long, value_name = "FILE")]
    export_pdf: Option<PathBuf>,

    /// Diagram rendering mode: terminal, svg, png or url.
    #[arg(long, default_value = "terminal")]
    diagram_mode: Mode,

    /// Directory for exported diagram files (default: system temp).
    #[arg(long, value_name = "DIR")]
    diagram_dir: Option<PathBuf>,

    /// Save each diagram's SVG to disk in terminal mode.
    #[arg(short = 'k', long)]
    keep_diagrams: bool,

    /// Enable verbose logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

enum Input {
    Stdin,
    File(PathBuf),
}

#[allow(clippy::exit)]
fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli, &output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli, output: &Output) -> Result<(), CliError> {
    let input = resolve_input(cli.file.as_deref())?;

    if let Some(pdf_path) = &cli.export_pdf {
        return export_pdf(&input, pdf_path, output);
    }

    let width = if cli.width == 0 {
        mdv_term::terminal_width()
    } else {
        cli.width
    };
    let options = RenderOptions {
        style: cli.style.clone(),
        width,
        diagrams_enabled: !cli.no_diagrams,
        mode: cli.diagram_mode,
        out_dir: cli.diagram_dir.clone().unwrap_or_else(std::env::temp_dir),
        keep_files: cli.keep_diagrams,
    };

    let (text, base_dir) = read_input(&input)?;

    if cli.open_diagrams && !cli.no_diagrams {
        open_diagrams(&text, output);
    }

    let styler = AnsiStyler::new(&options.style, options.width)?;
    let mut stdout = std::io::stdout().lock();
    Pipeline::new(&styler, &options)
        .with_base_dir(base_dir)
        .render(&text, &mut stdout)?;
    Ok(())
}

fn resolve_input(file: Option<&Path>) -> Result<Input, CliError> {
    match file {
        Some(path) if path.as_os_str() == "-" => Ok(Input::Stdin),
        Some(path) => Ok(Input::File(path.to_path_buf())),
        None if !std::io::stdin().is_terminal() => Ok(Input::Stdin),
        None => Err(CliError::NoInput),
    }
}

/// Read the document text plus the directory relative image paths resolve
/// against.
fn read_input(input: &Input) -> Result<(String, PathBuf), CliError> {
    match input {
        Input::Stdin => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(CliError::ReadStdin)?;
            Ok((text, PathBuf::from(".")))
        }
        Input::File(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
                path: path.clone(),
                source,
            })?;
            let base_dir = path
                .canonicalize()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            Ok((text, base_dir))
        }
    }
}

fn export_pdf(input: &Input, pdf_path: &Path, output: &Output) -> Result<(), CliError> {
    let exporter = mdv_pdf::Exporter::new();
    match input {
        Input::File(path) => {
            output.info(&format!("Generating PDF from {}...", path.display()));
            exporter.export_file(path, pdf_path)?;
        }
        Input::Stdin => {
            output.info("Generating PDF from standard input...");
            let (text, _) = read_input(input)?;
            let pdf = exporter.export(&text)?;
            std::fs::write(pdf_path, pdf).map_err(|source| CliError::WriteOutput {
                path: pdf_path.to_path_buf(),
                source,
            })?;
        }
    }
    output.success(&format!("PDF exported to {}", pdf_path.display()));
    Ok(())
}

/// Open every diagram's mermaid.live view in the default browser.
fn open_diagrams(text: &str, output: &Output) {
    let blocks = mdv_blocks::detect_diagram_blocks(text);
    if blocks.is_empty() {
        return;
    }

    output.info(&format!(
        "Opening {} diagram(s) in browser...",
        blocks.len()
    ));
    for (i, block) in blocks.iter().enumerate() {
        let ContentBlock::Diagram(diagram) = block else {
            continue;
        };
        let url = mdv_diagrams::live_url(&diagram.source);
        output.info(&format!("  {}. {}: {url}", i + 1, diagram.kind));
        if let Err(error) = mdv_browser::open_in_browser(&url) {
            output.warning(&format!("     failed to open URL: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dash_selects_stdin() {
        assert!(matches!(
            resolve_input(Some(Path::new("-"))).unwrap(),
            Input::Stdin
        ));
    }

    #[test]
    fn test_path_selects_file() {
        let input = resolve_input(Some(Path::new("README.md"))).unwrap();
        assert!(matches!(input, Input::File(p) if p == Path::new("README.md")));
    }

    #[test]
    fn test_default_flags() {
        let cli = Cli::parse_from(["mdv", "doc.md"]);
        assert_eq!(cli.style, "clean");
        assert_eq!(cli.width, 0);
        assert_eq!(cli.diagram_mode, Mode::Terminal);
        assert!(!cli.no_diagrams);
        assert!(!cli.keep_diagrams);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_mode_flag_parses() {
        let cli = Cli::parse_from(["mdv", "doc.md", "--diagram-mode", "svg"]);
        assert_eq!(cli.diagram_mode, Mode::Svg);
    }
}
