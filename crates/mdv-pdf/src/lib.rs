//! PDF export for `mdv`.
//!
//! Converts a markdown document to styled HTML (diagram fences replaced by
//! their compiled SVGs where possible), loads it into a headless browser
//! page, and prints it to PDF: US Letter, 0.4in margins, background
//! graphics included. The print options themselves live behind the
//! `mdv-browser` page seam.

mod html;

pub use html::{render_html_body, replace_diagrams, wrap_html};

use std::path::Path;
use std::time::Duration;

use mdv_browser::{BrowserError, ChromeLauncher, PageLauncher};
use mdv_diagrams::Compiler;

/// Budget for loading the document into the page before printing.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from PDF export.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("browser session failed: {0}")]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Markdown to PDF exporter.
pub struct Exporter {
    launcher: Box<dyn PageLauncher>,
    compiler: Compiler,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Create an exporter backed by headless Chrome sessions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            launcher: Box::new(ChromeLauncher::new()),
            compiler: Compiler::new(),
        }
    }

    /// Create an exporter over custom sessions (used by tests).
    #[must_use]
    pub fn with_launcher(launcher: Box<dyn PageLauncher>, compiler: Compiler) -> Self {
        Self { launcher, compiler }
    }

    /// Convert a markdown document to PDF bytes.
    pub fn export(&self, markdown: &str) -> Result<Vec<u8>, PdfError> {
        let processed = replace_diagrams(markdown, &self.compiler);
        let document = wrap_html(&render_html_body(&processed));
        self.html_to_pdf(&document)
    }

    /// Print a complete HTML document to PDF bytes.
    pub fn html_to_pdf(&self, document: &str) -> Result<Vec<u8>, PdfError> {
        let page = self.launcher.open_page(None)?;
        // JSON string literal, so document content cannot escape the script.
        let html_json = serde_json::Value::String(document.to_owned()).to_string();
        let script =
            format!("document.open(); document.write({html_json}); document.close(); true");
        page.eval(&script, LOAD_TIMEOUT)?;
        Ok(page.print_pdf()?)
    }

    /// Read a markdown file and write its PDF to the given path, creating
    /// parent directories on demand.
    pub fn export_file(&self, input: &Path, output: &Path) -> Result<(), PdfError> {
        let markdown = std::fs::read_to_string(input)?;
        let pdf = self.export(&markdown)?;
        if let Some(dir) = output.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(output, pdf)?;
        tracing::info!(input = %input.display(), output = %output.display(), "exported PDF");
        Ok(())
    }
}
