//! Chrome-backed implementation of the browser seam.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::{BrowserError, BrowserPage, PageLauncher};

/// US Letter paper size in inches.
const PAPER_WIDTH_IN: f64 = 8.5;
const PAPER_HEIGHT_IN: f64 = 11.0;

/// Page margins in inches, all four sides.
const MARGIN_IN: f64 = 0.4;

/// Launches a fresh headless Chrome process per page.
///
/// Requires a Chrome or Chromium installation discoverable on the system.
#[derive(Debug, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PageLauncher for ChromeLauncher {
    fn open_page(&self, viewport: Option<(u32, u32)>) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(viewport)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        tab.navigate_to("about:blank")
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Box::new(ChromePage {
            _browser: browser,
            tab,
        }))
    }
}

/// A tab in a dedicated browser process; dropping the page tears the
/// whole process down.
struct ChromePage {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserPage for ChromePage {
    fn eval(&self, script: &str, timeout: Duration) -> Result<serde_json::Value, BrowserError> {
        self.tab.set_default_timeout(timeout);
        let object = self
            .tab
            .evaluate(script, true)
            .map_err(|e| BrowserError::Eval(e.to_string()))?;
        object.value.ok_or(BrowserError::NoValue)
    }

    fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| BrowserError::Screenshot(e.to_string()))
    }

    fn print_pdf(&self) -> Result<Vec<u8>, BrowserError> {
        let options = PrintToPdfOptions {
            print_background: Some(true),
            prefer_css_page_size: Some(false),
            paper_width: Some(PAPER_WIDTH_IN),
            paper_height: Some(PAPER_HEIGHT_IN),
            margin_top: Some(MARGIN_IN),
            margin_bottom: Some(MARGIN_IN),
            margin_left: Some(MARGIN_IN),
            margin_right: Some(MARGIN_IN),
            ..PrintToPdfOptions::default()
        };
        self.tab
            .print_to_pdf(Some(options))
            .map_err(|e| BrowserError::Pdf(e.to_string()))
    }
}
