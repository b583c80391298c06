//! Markdown to print-ready HTML.

use mdv_blocks::{ContentBlock, detect_diagram_blocks};
use mdv_diagrams::Compiler;
use pulldown_cmark::{Options, Parser, html};

/// Convert a markdown body to an HTML fragment.
///
/// GFM extensions plus smart punctuation; raw HTML passes through, which
/// is what lets pre-rendered diagram SVGs survive the conversion. Intended
/// for local documents, not untrusted input.
#[must_use]
pub fn render_html_body(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
        | Options::ENABLE_SMART_PUNCTUATION;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

/// Replace each diagram fence with its compiled SVG, wrapped in a block
/// element. A fence whose diagram fails to compile is left in place so the
/// source stays visible in the document.
#[must_use]
pub fn replace_diagrams(markdown: &str, compiler: &Compiler) -> String {
    let blocks = detect_diagram_blocks(markdown);
    if blocks.is_empty() {
        return markdown.to_owned();
    }

    let mut lines: Vec<String> = markdown.split('\n').map(str::to_owned).collect();
    // Reverse order keeps earlier line spans valid while splicing.
    for block in blocks.iter().rev() {
        let ContentBlock::Diagram(diagram) = block else {
            continue;
        };
        let compiled = compiler.render(&diagram.source);
        if let Some(error) = compiled.error {
            tracing::warn!(%error, line = diagram.start_line, "keeping diagram fence in PDF");
            continue;
        }
        let replacement = format!("<div class=\"mermaid-diagram\">{}</div>", compiled.svg);
        let tail = lines.split_off(diagram.end_line);
        lines.truncate(diagram.start_line - 1);
        lines.push(replacement);
        lines.extend(tail);
    }
    lines.join("\n")
}

/// Wrap an HTML fragment in a complete document with print styling.
#[must_use]
pub fn wrap_html(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Markdown Document</title>
<style>
body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
    line-height: 1.6;
    color: #333;
    max-width: 800px;
    margin: 0 auto;
    padding: 20px;
}}
h1, h2, h3, h4, h5, h6 {{
    margin-top: 24px;
    margin-bottom: 16px;
    font-weight: 600;
    line-height: 1.25;
}}
h1 {{ font-size: 2em; border-bottom: 1px solid #eaecef; padding-bottom: 0.3em; }}
h2 {{ font-size: 1.5em; border-bottom: 1px solid #eaecef; padding-bottom: 0.3em; }}
h3 {{ font-size: 1.25em; }}
code {{
    background-color: #f6f8fa;
    padding: 0.2em 0.4em;
    font-size: 85%;
    border-radius: 3px;
    font-family: 'SF Mono', Monaco, Consolas, monospace;
}}
pre {{
    background-color: #f6f8fa;
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
}}
pre code {{ background-color: transparent; padding: 0; }}
blockquote {{
    padding: 0 1em;
    color: #6a737d;
    border-left: 0.25em solid #dfe2e5;
    margin: 0;
}}
table {{ border-collapse: collapse; width: 100%; }}
table th, table td {{ padding: 6px 13px; border: 1px solid #dfe2e5; }}
table tr:nth-child(2n) {{ background-color: #f6f8fa; }}
img {{ max-width: 100%; }}
hr {{ border: 0; border-top: 1px solid #eaecef; margin: 24px 0; }}
a {{ color: #0366d6; text-decoration: none; }}
a:hover {{ text-decoration: underline; }}
.mermaid-diagram {{ margin: 20px 0; text-align: center; }}
</style>
</head>
<body>
{body}
</body>
</html>"#
    )
}
