//! CLI error type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no input file specified and stdin is a terminal (see 'mdv --help')")]
    NoInput,

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read standard input: {0}")]
    ReadStdin(#[source] std::io::Error),

    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Style(#[from] mdv_style::StyleError),

    #[error("PDF export failed: {0}")]
    Pdf(#[from] mdv_pdf::PdfError),

    #[error(transparent)]
    Render(#[from] mdv_render::RenderError),
}
