//! Headless browser session seam.
//!
//! Diagram compilation and PDF generation both need a blank browser page
//! that can evaluate scripts and capture output. This crate defines the
//! seam as a pair of traits ([`PageLauncher`] opens an isolated page,
//! [`BrowserPage`] evaluates scripts against it) plus the Chrome-backed
//! implementation. Callers that need determinism (tests) substitute their
//! own implementations.
//!
//! Every [`PageLauncher::open_page`] call produces a fully isolated session:
//! no page state, cookies, or script globals survive from one call to the
//! next. The cost of a fresh browser per call is the isolation mechanism.

mod chrome;

use std::time::Duration;

pub use chrome::ChromeLauncher;

/// Errors from browser session handling.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("script evaluation failed: {0}")]
    Eval(String),

    #[error("script returned no value")]
    NoValue,

    #[error("screenshot capture failed: {0}")]
    Screenshot(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// One isolated browser page on a blank document.
pub trait BrowserPage {
    /// Evaluate a script expression, awaiting it if it yields a promise,
    /// and return the JSON-shaped result value.
    ///
    /// The timeout bounds the whole evaluation; an expression that never
    /// settles fails instead of hanging the caller.
    fn eval(&self, script: &str, timeout: Duration) -> Result<serde_json::Value, BrowserError>;

    /// Capture a full-page PNG screenshot at the page's viewport size.
    fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError>;

    /// Print the current document to PDF (US Letter, 0.4in margins,
    /// background graphics included).
    fn print_pdf(&self) -> Result<Vec<u8>, BrowserError>;
}

/// Opens isolated browser pages.
pub trait PageLauncher {
    /// Open a fresh page on a blank document, optionally at a fixed
    /// viewport size (pixels).
    fn open_page(&self, viewport: Option<(u32, u32)>) -> Result<Box<dyn BrowserPage>, BrowserError>;
}

/// Open a URL in the user's default browser (not the headless session).
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    open::that_detached(url)
}
