//! Diagram compiler backed by per-call browser sessions.

use std::time::Instant;

use mdv_browser::{BrowserError, ChromeLauncher, PageLauncher};
use serde_json::Value;

use crate::consts::{CALL_TIMEOUT, SCRIPT_TIMEOUT, inject_script, load_library_script, render_script};
use crate::svg::extract_svg_dimensions;

/// Errors from diagram compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("browser session failed: {0}")]
    Session(#[from] BrowserError),

    #[error("diagram rendering error: {0}")]
    Library(String),

    #[error("no SVG returned from diagram library")]
    EmptyResult,
}

/// Result of one compile call.
///
/// On failure `svg` is empty, dimensions are zero, and `error` carries the
/// cause. Results are never cached; each appearance of a diagram is
/// recompiled against its exact current source.
#[derive(Debug)]
pub struct CompiledDiagram {
    /// Rendered SVG markup (empty on failure).
    pub svg: String,
    /// Pixel width extracted from the SVG.
    pub width: u32,
    /// Pixel height extracted from the SVG.
    pub height: u32,
    /// Failure cause, when compilation did not produce usable output.
    pub error: Option<CompileError>,
}

impl CompiledDiagram {
    fn from_error(error: CompileError) -> Self {
        Self {
            svg: String::new(),
            width: 0,
            height: 0,
            error: Some(error),
        }
    }
}

/// Renders diagram source through a fresh browser session per call.
///
/// No session is reused and no result is cached: a malformed diagram cannot
/// corrupt state seen by the next one, at the price of per-call startup.
pub struct Compiler {
    launcher: Box<dyn PageLauncher>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a compiler that launches headless Chrome sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_launcher(Box::new(ChromeLauncher::new()))
    }

    /// Create a compiler over a custom page launcher (used by tests).
    #[must_use]
    pub fn with_launcher(launcher: Box<dyn PageLauncher>) -> Self {
        Self { launcher }
    }

    /// Compile diagram source to SVG.
    ///
    /// Never fails: launch, transport, library, and timeout failures are all
    /// returned as data in the result's `error` field.
    #[must_use]
    pub fn render(&self, source: &str) -> CompiledDiagram {
        match self.try_render(source) {
            Ok(compiled) => compiled,
            Err(error) => {
                tracing::debug!(%error, "diagram compile failed");
                CompiledDiagram::from_error(error)
            }
        }
    }

    fn try_render(&self, source: &str) -> Result<CompiledDiagram, CompileError> {
        let started = Instant::now();
        let page = self.launcher.open_page(None)?;

        let budget = remaining(started);
        page.eval(&load_library_script(), budget)?;

        let source_json = serde_json::Value::String(source.to_owned()).to_string();
        let budget = remaining(started).min(SCRIPT_TIMEOUT);
        let result = page.eval(&render_script(&source_json, budget), budget)?;

        if let Some(message) = error_field(&result) {
            return Err(CompileError::Library(message.to_owned()));
        }

        let svg = result
            .get("svg")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(CompileError::EmptyResult)?;

        let (width, height) = extract_svg_dimensions(svg);
        Ok(CompiledDiagram {
            svg: svg.to_owned(),
            width,
            height,
            error: None,
        })
    }

    /// Compile diagram source to PNG bytes at the given viewport size.
    ///
    /// Unlike [`render`](Self::render), failures are propagated: a raster
    /// has no meaningful degraded form.
    pub fn render_to_png(
        &self,
        source: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, CompileError> {
        let started = Instant::now();
        let page = self.launcher.open_page(Some((width, height)))?;

        let budget = remaining(started);
        page.eval(&load_library_script(), budget)?;

        let source_json = serde_json::Value::String(source.to_owned()).to_string();
        let budget = remaining(started).min(SCRIPT_TIMEOUT);
        let result = page.eval(&inject_script(&source_json, budget), budget)?;

        if let Some(message) = error_field(&result) {
            return Err(CompileError::Library(message.to_owned()));
        }
        if !result.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            return Err(CompileError::EmptyResult);
        }

        Ok(page.screenshot_png()?)
    }
}

/// Budget left within the overall call timeout (never zero, so a session
/// that used the whole budget still fails through the transport rather than
/// an instant zero-length wait).
fn remaining(started: Instant) -> std::time::Duration {
    CALL_TIMEOUT
        .saturating_sub(started.elapsed())
        .max(std::time::Duration::from_millis(1))
}

fn error_field(result: &Value) -> Option<&str> {
    result
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    use mdv_browser::{BrowserError, BrowserPage, PageLauncher};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    /// Scripted page: answers each eval from a queue.
    struct FakePage {
        evals: RefCell<VecDeque<Result<Value, BrowserError>>>,
        screenshot: Result<Vec<u8>, ()>,
    }

    impl BrowserPage for FakePage {
        fn eval(&self, _script: &str, _timeout: Duration) -> Result<Value, BrowserError> {
            self.evals
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(BrowserError::NoValue))
        }

        fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError> {
            self.screenshot
                .clone()
                .map_err(|()| BrowserError::Screenshot("capture failed".to_owned()))
        }

        fn print_pdf(&self) -> Result<Vec<u8>, BrowserError> {
            unreachable!("not used by the compiler")
        }
    }

    enum FakeLauncher {
        Fails,
        Answers {
            evals: Vec<Result<Value, BrowserError>>,
            screenshot: Result<Vec<u8>, ()>,
        },
    }

    impl PageLauncher for FakeLauncher {
        fn open_page(
            &self,
            _viewport: Option<(u32, u32)>,
        ) -> Result<Box<dyn BrowserPage>, BrowserError> {
            match self {
                Self::Fails => Err(BrowserError::Launch("no chrome installed".to_owned())),
                Self::Answers { evals, screenshot } => {
                    let evals = evals
                        .iter()
                        .map(|r| match r {
                            Ok(v) => Ok(v.clone()),
                            Err(e) => Err(BrowserError::Eval(e.to_string())),
                        })
                        .collect();
                    Ok(Box::new(FakePage {
                        evals: RefCell::new(evals),
                        screenshot: screenshot.clone(),
                    }))
                }
            }
        }
    }

    fn compiler_answering(evals: Vec<Result<Value, BrowserError>>) -> Compiler {
        Compiler::with_launcher(Box::new(FakeLauncher::Answers {
            evals,
            screenshot: Ok(vec![0x89, b'P', b'N', b'G']),
        }))
    }

    #[test]
    fn test_render_success_extracts_dimensions() {
        let svg = r#"<svg viewBox="0 0 400 300" xmlns="http://www.w3.org/2000/svg"></svg>"#;
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Ok(json!({ "svg": svg, "error": null })),
        ]);

        let compiled = compiler.render("graph TD\n  A --> B");
        assert!(compiled.error.is_none());
        assert_eq!(compiled.width, 400);
        assert_eq!(compiled.height, 300);
        assert_eq!(compiled.svg, svg);
    }

    #[test]
    fn test_render_library_error_is_data_not_panic() {
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Ok(json!({ "svg": null, "error": "Parse error on line 1" })),
        ]);

        let compiled = compiler.render("not a diagram");
        assert!(matches!(compiled.error, Some(CompileError::Library(_))));
        assert_eq!(compiled.svg, "");
        assert_eq!(compiled.width, 0);
    }

    #[test]
    fn test_render_empty_svg_is_error() {
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Ok(json!({ "svg": "", "error": null })),
        ]);

        let compiled = compiler.render("graph TD");
        assert!(matches!(compiled.error, Some(CompileError::EmptyResult)));
    }

    #[test]
    fn test_render_launch_failure_is_data() {
        let compiler = Compiler::with_launcher(Box::new(FakeLauncher::Fails));
        let compiled = compiler.render("graph TD");
        assert!(matches!(compiled.error, Some(CompileError::Session(_))));
    }

    #[test]
    fn test_render_timeout_is_data() {
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Err(BrowserError::Eval("evaluation timed out".to_owned())),
        ]);

        let compiled = compiler.render("graph TD");
        assert!(matches!(compiled.error, Some(CompileError::Session(_))));
    }

    #[test]
    fn test_render_to_png_success() {
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Ok(json!({ "ok": true, "error": null })),
        ]);

        let png = compiler.render_to_png("graph TD", 800, 600).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_render_to_png_propagates_library_error() {
        let compiler = compiler_answering(vec![
            Ok(json!(true)),
            Ok(json!({ "ok": false, "error": "bad diagram" })),
        ]);

        let result = compiler.render_to_png("nope", 800, 600);
        assert!(matches!(result, Err(CompileError::Library(_))));
    }

    #[test]
    fn test_render_to_png_propagates_launch_failure() {
        let compiler = Compiler::with_launcher(Box::new(FakeLauncher::Fails));
        assert!(matches!(
            compiler.render_to_png("graph TD", 800, 600),
            Err(CompileError::Session(_))
        ));
    }
}
