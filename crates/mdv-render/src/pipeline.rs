//! Segment walk over a document's prose and content blocks.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use mdv_blocks::{
    ContentBlock, DiagramBlock, ImageBlock, detect_diagram_blocks, detect_image_blocks,
    merge_blocks, rewrite_wiki_syntax,
};
use mdv_diagrams::{CompileError, Compiler, image_url, live_url, preview_box, save_png, save_svg};
use mdv_style::{StyleError, TextStyler};
use mdv_term::{ImageProtocol, TermImageError, write_inline_image};

use crate::{Mode, RenderError, RenderOptions};

/// Failure of a single content block. Caught by the segment walk and
/// downgraded to a warning so the rest of the document still renders.
#[derive(Debug, thiserror::Error)]
enum BlockError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Term(#[from] TermImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Renders a document to a terminal writer, splicing diagrams and images
/// inline at their original positions.
pub struct Pipeline<'a> {
    styler: &'a dyn TextStyler,
    options: &'a RenderOptions,
    base_dir: PathBuf,
    compiler: Option<Compiler>,
    protocol_override: Option<ImageProtocol>,
}

impl<'a> Pipeline<'a> {
    pub fn new(styler: &'a dyn TextStyler, options: &'a RenderOptions) -> Self {
        Self {
            styler,
            options,
            base_dir: PathBuf::from("."),
            compiler: None,
            protocol_override: None,
        }
    }

    /// Directory against which relative image paths are resolved,
    /// normally the document's containing directory.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Pin the inline-image protocol instead of detecting it from the
    /// environment on every block.
    #[must_use]
    pub fn with_protocol(mut self, protocol: ImageProtocol) -> Self {
        self.protocol_override = Some(protocol);
        self
    }

    /// Supply a pre-built diagram compiler (used by tests to avoid
    /// launching a real browser).
    #[must_use]
    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Render the whole document.
    ///
    /// The text is preprocessed (wiki-link shorthand), blocks are detected
    /// and ordered, and prose segments between blocks are styled and
    /// written in document order. Detector output drives the walk; a
    /// document without special content is styled as one unit.
    pub fn render(&mut self, text: &str, out: &mut dyn Write) -> Result<(), RenderError> {
        let text = rewrite_wiki_syntax(text);

        // URL mode never compiles: callouts are spliced into the text and
        // the whole document is styled as one unit, diagram fences intact.
        if self.options.mode == Mode::Url && self.options.diagrams_enabled {
            let spliced = splice_url_callouts(&text);
            out.write_all(self.styler.style(&spliced)?.as_bytes())?;
            return Ok(());
        }

        let diagrams = if self.options.diagrams_enabled {
            detect_diagram_blocks(&text)
        } else {
            Vec::new()
        };
        let images = detect_image_blocks(&text);
        let blocks = merge_blocks(diagrams, images);

        if blocks.is_empty() {
            out.write_all(self.styler.style(&text)?.as_bytes())?;
            return Ok(());
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let mut curr_line = 0usize;
        let mut diagram_index = 0usize;

        for block in &blocks {
            // Clamp the block window; a malformed span degrades to a
            // truncated segment instead of a panic.
            let start = (block.start_line() - 1).clamp(curr_line, lines.len());
            let end = block.end_line().clamp(start, lines.len());

            if start > curr_line {
                self.print_segment(&lines[curr_line..start], out)?;
            }

            let result = match block {
                ContentBlock::Diagram(diagram) => {
                    diagram_index += 1;
                    self.render_diagram(diagram, diagram_index, out)
                }
                ContentBlock::Image(image) => self.render_image(image, out),
            };
            if let Err(error) = result {
                tracing::warn!(line = block.start_line(), %error, "content block failed");
            }

            curr_line = end;
        }

        if curr_line < lines.len() {
            self.print_segment(&lines[curr_line..], out)?;
        }
        Ok(())
    }

    /// Style and print a prose slice. All-whitespace slices are dropped so
    /// block boundaries do not emit empty styled segments.
    fn print_segment(&self, lines: &[&str], out: &mut dyn Write) -> Result<(), RenderError> {
        let segment = lines.join("\n");
        if !segment.trim().is_empty() {
            out.write_all(self.styler.style(&segment)?.as_bytes())?;
        }
        Ok(())
    }

    fn compiler(&mut self) -> &Compiler {
        self.compiler.get_or_insert_with(Compiler::new)
    }

    fn protocol(&self) -> ImageProtocol {
        self.protocol_override.unwrap_or_else(ImageProtocol::detect)
    }

    fn render_diagram(
        &mut self,
        block: &DiagramBlock,
        index: usize,
        out: &mut dyn Write,
    ) -> Result<(), BlockError> {
        match self.options.mode {
            Mode::Terminal => self.render_diagram_terminal(block, index, out),
            Mode::Svg => self.render_diagram_svg(block, index, out),
            Mode::Png => self.render_diagram_png(block, index, out),
            // Handled upstream in render(); a diagram block never reaches
            // per-block dispatch in URL mode.
            Mode::Url => Ok(()),
        }
    }

    fn render_diagram_terminal(
        &mut self,
        block: &DiagramBlock,
        index: usize,
        out: &mut dyn Write,
    ) -> Result<(), BlockError> {
        let compiled = self.compiler().render(&block.source);
        if let Some(error) = compiled.error {
            return Err(error.into());
        }

        let protocol = self.protocol();
        if protocol.supports_inline_images() {
            let (width, height) = dims_or(compiled.width, compiled.height, 800, 600);
            match self.compiler().render_to_png(&block.source, width, height) {
                Ok(png) => {
                    writeln!(out, "📊 Mermaid Diagram ({}):", block.kind)?;
                    write_inline_image(out, &png, protocol)?;
                    writeln!(out)?;
                }
                Err(error) => {
                    tracing::warn!(%error, "raster render failed, falling back to preview");
                    out.write_all(
                        preview_box(&block.kind, compiled.width, compiled.height).as_bytes(),
                    )?;
                }
            }
        } else {
            out.write_all(preview_box(&block.kind, compiled.width, compiled.height).as_bytes())?;
        }

        if self.options.keep_files {
            let path = self.export_path(index, "svg");
            match save_svg(&compiled.svg, &path) {
                Ok(()) => writeln!(out, "  💾 Saved to: {}", path.display())?,
                Err(error) => {
                    tracing::warn!(%error, path = %path.display(), "failed to save SVG");
                }
            }
        }
        Ok(())
    }

    fn render_diagram_svg(
        &mut self,
        block: &DiagramBlock,
        index: usize,
        out: &mut dyn Write,
    ) -> Result<(), BlockError> {
        let compiled = self.compiler().render(&block.source);
        if let Some(error) = compiled.error {
            return Err(error.into());
        }

        let path = self.export_path(index, "svg");
        save_svg(&compiled.svg, &path)?;

        self.print_fence(block, out)?;
        writeln!(out, "📁 Mermaid diagram {index} {}", path.display())?;
        Ok(())
    }

    fn render_diagram_png(
        &mut self,
        block: &DiagramBlock,
        index: usize,
        out: &mut dyn Write,
    ) -> Result<(), BlockError> {
        // Vector pass first, for dimensions and early error detection.
        let compiled = self.compiler().render(&block.source);
        if let Some(error) = compiled.error {
            return Err(error.into());
        }

        let (width, height) = dims_or(compiled.width, compiled.height, 1200, 800);
        let png = self.compiler().render_to_png(&block.source, width, height)?;

        let path = self.export_path(index, "png");
        save_png(&png, &path)?;

        self.print_fence(block, out)?;
        writeln!(out, "📁 Mermaid diagram {index} {}", path.display())?;
        Ok(())
    }

    /// Re-style the original fenced source as an ordinary code block,
    /// falling back to the raw fence if the styler rejects it.
    fn print_fence(&self, block: &DiagramBlock, out: &mut dyn Write) -> Result<(), BlockError> {
        let code = format!("```mermaid\n{}\n```\n", block.source.trim());
        match self.styler.style(&code) {
            Ok(styled) => out.write_all(styled.as_bytes())?,
            Err(_) => out.write_all(code.as_bytes())?,
        }
        Ok(())
    }

    fn export_path(&self, index: usize, extension: &str) -> PathBuf {
        self.options
            .out_dir
            .join(format!("diagram-{index}.{extension}"))
    }

    fn render_image(&self, block: &ImageBlock, out: &mut dyn Write) -> Result<(), BlockError> {
        let protocol = self.protocol();
        if !protocol.supports_inline_images() {
            return self.print_image_markdown(block, out);
        }

        let path = if Path::new(&block.path).is_absolute() {
            PathBuf::from(&block.path)
        } else {
            self.base_dir.join(&block.path)
        };
        let Ok(mut bytes) = fs::read(&path) else {
            // Unreadable file degrades to the textual form.
            return self.print_image_markdown(block, out);
        };

        if block.width > 0 {
            match mdv_term::resize_to_width(&bytes, block.width) {
                Ok(resized) => bytes = resized,
                Err(error) => {
                    tracing::warn!(%error, path = %path.display(), "failed to resize image");
                }
            }
        }

        if block.alt.is_empty() {
            writeln!(out, "🖼️  Image:")?;
        } else {
            writeln!(out, "🖼️  {}:", block.alt)?;
        }
        write_inline_image(out, &bytes, protocol)?;
        writeln!(out)?;
        Ok(())
    }

    fn print_image_markdown(
        &self,
        block: &ImageBlock,
        out: &mut dyn Write,
    ) -> Result<(), BlockError> {
        let markdown = format!("![{}]({})", block.alt, block.path);
        out.write_all(self.styler.style(&markdown)?.as_bytes())?;
        Ok(())
    }
}

fn dims_or(width: u32, height: u32, default_width: u32, default_height: u32) -> (u32, u32) {
    (
        if width == 0 { default_width } else { width },
        if height == 0 { default_height } else { height },
    )
}

/// Insert a view/image URL callout immediately before each diagram fence.
/// The fences themselves stay in place and render as ordinary code blocks.
fn splice_url_callouts(text: &str) -> String {
    let blocks = detect_diagram_blocks(text);
    if blocks.is_empty() {
        return text.to_owned();
    }

    let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    let mut offset = 0usize;
    for block in &blocks {
        let ContentBlock::Diagram(diagram) = block else {
            continue;
        };
        let callout = format!(
            "\n> 📊 **Mermaid Diagram** ({})\n>\n> 🔗 View: <{}>\n> 📷 Image: <{}>\n",
            diagram.kind,
            live_url(&diagram.source),
            image_url(&diagram.source)
        );
        let insert = diagram.start_line - 1 + offset;
        if insert <= lines.len() {
            lines.insert(insert, callout);
            offset += 1;
        }
    }
    lines.join("\n")
}
