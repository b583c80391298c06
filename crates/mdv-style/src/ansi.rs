//! Markdown to ANSI terminal text.

use console::{Style, measure_text_width};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::theme::Theme;
use crate::{StyleError, TextStyler};

/// Narrow terminals still get a usable column for text.
const MIN_WRAP_WIDTH: usize = 20;

/// Markdown styler producing wrapped, ANSI-colored terminal text.
///
/// GFM extensions (tables, strikethrough, task lists) are always on.
pub struct AnsiStyler {
    theme: Theme,
    width: usize,
}

impl AnsiStyler {
    /// Build a styler for the named theme (or theme file path) and wrap
    /// width in columns.
    pub fn new(style: &str, width: u16) -> Result<Self, StyleError> {
        Ok(Self {
            theme: Theme::resolve(style)?,
            width: usize::from(width).max(MIN_WRAP_WIDTH),
        })
    }

    /// Build a styler around an already-resolved theme.
    #[must_use]
    pub fn with_theme(theme: Theme, width: u16) -> Self {
        Self {
            theme,
            width: usize::from(width).max(MIN_WRAP_WIDTH),
        }
    }
}

impl TextStyler for AnsiStyler {
    fn style(&self, markdown: &str) -> Result<String, StyleError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let mut renderer = Renderer::new(&self.theme, self.width);
        for event in Parser::new_ext(markdown, options) {
            renderer.event(event);
        }
        Ok(renderer.finish())
    }
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    current: Vec<String>,
    cell: String,
    has_head: bool,
}

/// Event-driven layout engine. Inline events accumulate styled words;
/// block boundaries flush them through the greedy wrapper.
struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    out: String,
    words: Vec<(String, usize)>,
    plain: Style,
    heading: Option<u8>,
    strong: bool,
    emphasis: bool,
    strike: bool,
    link: Option<(String, String)>,
    image: Option<(String, String)>,
    code_block: Option<String>,
    list_counters: Vec<Option<u64>>,
    quote_depth: usize,
    item_marker: Option<String>,
    hang: usize,
    table: Option<TableState>,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            out: String::with_capacity(4096),
            words: Vec::new(),
            plain: Style::new(),
            heading: None,
            strong: false,
            emphasis: false,
            strike: false,
            link: None,
            image: None,
            code_block: None,
            list_counters: Vec::new(),
            quote_depth: 0,
            item_marker: None,
            hang: 0,
            table: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::SoftBreak => {}
            Event::HardBreak => self.flush_words(),
            Event::Rule => self.rule(),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x]" } else { "[ ]" };
                self.words
                    .push((self.theme.bullet.apply_to(marker).to_string(), 3));
            }
            // Raw HTML has no terminal rendering.
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush_words();
                self.heading = Some(heading_num(level));
            }
            Tag::BlockQuote(_) => {
                self.flush_words();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush_words();
                self.code_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_words();
                self.list_counters.push(start);
            }
            Tag::Item => {
                let depth = self.list_counters.len().saturating_sub(1);
                let marker = match self.list_counters.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{n}. ");
                        *n += 1;
                        m
                    }
                    _ => "• ".to_owned(),
                };
                self.item_marker = Some(format!("{}{marker}", "  ".repeat(depth)));
            }
            Tag::Table(_) => {
                self.flush_words();
                self.table = Some(TableState::default());
            }
            Tag::TableHead | Tag::TableRow | Tag::TableCell => {}
            Tag::Emphasis => self.emphasis = true,
            Tag::Strong => self.strong = true,
            Tag::Strikethrough => self.strike = true,
            Tag::Link { dest_url, .. } => {
                self.link = Some((dest_url.to_string(), String::new()));
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => {
                self.flush_words();
                self.heading = None;
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_words();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(_) => {
                self.list_counters.pop();
                if self.list_counters.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_words();
                self.item_marker = None;
                self.hang = 0;
            }
            TagEnd::Table => self.end_table(),
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.current);
                    table.rows.push(row);
                    table.has_head = true;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.current);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    let cell = std::mem::take(&mut table.cell);
                    table.current.push(cell.trim().to_owned());
                }
            }
            TagEnd::Emphasis => self.emphasis = false,
            TagEnd::Strong => self.strong = false,
            TagEnd::Strikethrough => self.strike = false,
            TagEnd::Link => self.end_link(),
            TagEnd::Image => self.end_image(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = &mut self.code_block {
            code.push_str(text);
            return;
        }
        if let Some(table) = &mut self.table {
            table.cell.push_str(text);
            return;
        }
        if let Some((_, alt)) = &mut self.image {
            alt.push_str(text);
            return;
        }
        if let Some((_, label)) = &mut self.link {
            label.push_str(text);
        }
        for word in text.split_whitespace() {
            self.push_word(word);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(table) = &mut self.table {
            table.cell.push_str(code);
            return;
        }
        if let Some((_, label)) = &mut self.link {
            label.push_str(code);
        }
        // Inline code stays a single unit even when it contains spaces.
        self.words.push((
            self.theme.code.apply_to(code).to_string(),
            measure_text_width(code),
        ));
    }

    fn push_word(&mut self, word: &str) {
        let rendered = self.word_style().apply_to(word).to_string();
        self.words.push((rendered, measure_text_width(word)));
    }

    fn word_style(&self) -> &Style {
        match self.heading {
            Some(1 | 2) => return &self.theme.heading,
            Some(_) => return &self.theme.subheading,
            None => {}
        }
        if self.link.is_some() {
            &self.theme.link
        } else if self.strong {
            &self.theme.strong
        } else if self.emphasis {
            &self.theme.emphasis
        } else if self.strike {
            &self.theme.strikethrough
        } else if self.quote_depth > 0 {
            &self.theme.blockquote
        } else {
            &self.plain
        }
    }

    fn end_link(&mut self) {
        if let Some((dest, label)) = self.link.take() {
            // Autolinks already show the target as their text.
            if !dest.is_empty() && label.trim() != dest {
                let url = format!("({dest})");
                self.words.push((
                    self.theme.url.apply_to(&url).to_string(),
                    measure_text_width(&url),
                ));
            }
        }
    }

    fn end_image(&mut self) {
        if let Some((dest, alt)) = self.image.take() {
            let label = if alt.trim().is_empty() {
                "image"
            } else {
                alt.trim()
            };
            self.words.push((
                self.theme.link.apply_to(label).to_string(),
                measure_text_width(label),
            ));
            let url = format!("({dest})");
            self.words.push((
                self.theme.url.apply_to(&url).to_string(),
                measure_text_width(&url),
            ));
        }
    }

    /// Emit buffered words as wrapped lines. The first line carries a
    /// pending list marker; continuations hang under it.
    fn flush_words(&mut self) {
        if self.words.is_empty() {
            return;
        }
        let words = std::mem::take(&mut self.words);

        let quote = "│ ".repeat(self.quote_depth);
        let quote_styled = if quote.is_empty() {
            String::new()
        } else {
            self.theme.blockquote.apply_to(&quote).to_string()
        };

        let (first, hang) = match self.item_marker.take() {
            Some(marker) => {
                self.hang = measure_text_width(&marker);
                let styled = self.theme.bullet.apply_to(&marker).to_string();
                (format!("{quote_styled}{styled}"), self.hang)
            }
            None => (
                format!("{quote_styled}{}", " ".repeat(self.hang)),
                self.hang,
            ),
        };
        let cont = format!("{quote_styled}{}", " ".repeat(hang));

        let avail = self
            .width
            .saturating_sub(2 * self.quote_depth + hang)
            .max(MIN_WRAP_WIDTH / 2);

        let mut line = String::new();
        let mut line_width = 0usize;
        let mut first_line = true;
        for (word, word_width) in words {
            if line_width > 0 && line_width + 1 + word_width > avail {
                self.out
                    .push_str(if first_line { &first } else { &cont });
                self.out.push_str(&line);
                self.out.push('\n');
                first_line = false;
                line.clear();
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(&word);
            line_width += word_width;
        }
        if !line.is_empty() {
            self.out
                .push_str(if first_line { &first } else { &cont });
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }

    fn end_code_block(&mut self) {
        let Some(code) = self.code_block.take() else {
            return;
        };
        for line in code.trim_end_matches('\n').split('\n') {
            if line.is_empty() {
                self.out.push('\n');
            } else {
                self.out.push_str("    ");
                self.out
                    .push_str(&self.theme.code_block.apply_to(line).to_string());
                self.out.push('\n');
            }
        }
        self.blank_line();
    }

    fn end_table(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        if table.rows.is_empty() {
            return;
        }

        let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; cols];
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }

        for (index, row) in table.rows.iter().enumerate() {
            let mut line = String::new();
            for (i, &w) in widths.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                let cell = row.get(i).map_or("", String::as_str);
                line.push_str(&format!("{cell:<w$}"));
            }
            let line = line.trim_end();
            if index == 0 && table.has_head {
                self.out
                    .push_str(&self.theme.strong.apply_to(line).to_string());
                self.out.push('\n');
                let sep = widths
                    .iter()
                    .map(|&w| "─".repeat(w))
                    .collect::<Vec<_>>()
                    .join("──");
                self.out
                    .push_str(&self.theme.rule.apply_to(&sep).to_string());
            } else {
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
        self.blank_line();
    }

    fn rule(&mut self) {
        self.flush_words();
        let bar = "─".repeat(self.width);
        self.out
            .push_str(&self.theme.rule.apply_to(&bar).to_string());
        self.out.push('\n');
        self.blank_line();
    }

    /// Separate blocks with exactly one empty line.
    fn blank_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(mut self) -> String {
        self.flush_words();
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.out
    }
}

fn heading_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Clean theme emits no escape codes, so output is byte-comparable.
    fn plain(markdown: &str) -> String {
        AnsiStyler::with_theme(Theme::clean(), 80)
            .style(markdown)
            .unwrap()
    }

    fn plain_at(markdown: &str, width: u16) -> String {
        AnsiStyler::with_theme(Theme::clean(), width)
            .style(markdown)
            .unwrap()
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let out = plain("First paragraph.\n\nSecond paragraph.");
        assert_eq!(out, "First paragraph.\n\nSecond paragraph.\n");
    }

    #[test]
    fn test_heading_then_body() {
        let out = plain("# Title\n\nBody text.");
        assert_eq!(out, "Title\n\nBody text.\n");
    }

    #[test]
    fn test_soft_breaks_reflow() {
        let out = plain("one\ntwo\nthree");
        assert_eq!(out, "one two three\n");
    }

    #[test]
    fn test_hard_break_keeps_line() {
        let out = plain("one  \ntwo");
        assert_eq!(out, "one\ntwo\n");
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let out = plain_at(text, 24);
        for line in out.lines() {
            assert!(line.len() <= 24, "line too long: {line:?}");
        }
        assert!(out.lines().count() > 1);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let out = plain_at("short superduperextremelylongword short", 20);
        assert!(out.contains("superduperextremelylongword"));
    }

    #[test]
    fn test_bullet_list_markers() {
        let out = plain("- apple\n- banana");
        assert_eq!(out, "• apple\n• banana\n");
    }

    #[test]
    fn test_ordered_list_counts_from_start() {
        let out = plain("3. third\n4. fourth");
        assert_eq!(out, "3. third\n4. fourth\n");
    }

    #[test]
    fn test_nested_list_indents() {
        let out = plain("- outer\n  - inner");
        assert_eq!(out, "• outer\n  • inner\n");
    }

    #[test]
    fn test_list_continuation_hangs_under_marker() {
        let out = plain_at("1. alpha beta gamma delta epsilon zeta", 20);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("1. "));
        assert!(lines[1].starts_with("   "));
        assert!(!lines[1].starts_with("    "));
    }

    #[test]
    fn test_task_list_markers() {
        let out = plain("- [ ] open\n- [x] done");
        assert!(out.contains("[ ] open"));
        assert!(out.contains("[x] done"));
    }

    #[test]
    fn test_blockquote_prefix() {
        let out = plain("> quoted text");
        assert_eq!(out, "│ quoted text\n");
    }

    #[test]
    fn test_nested_blockquote_prefix() {
        let out = plain("> outer\n>\n> > inner");
        assert!(out.contains("│ outer"));
        assert!(out.contains("│ │ inner"));
    }

    #[test]
    fn test_code_block_indented_verbatim() {
        let out = plain("```rust\nfn main() {\n    body();\n}\n```");
        assert!(out.contains("    fn main() {"));
        assert!(out.contains("        body();"));
        assert!(out.contains("    }"));
    }

    #[test]
    fn test_code_block_not_wrapped() {
        let long = format!("```\n{}\n```", "x".repeat(60));
        let out = plain_at(&long, 24);
        assert!(out.contains(&"x".repeat(60)));
    }

    #[test]
    fn test_inline_code_preserved() {
        let out = plain("Run `cargo build --release` now.");
        assert_eq!(out, "Run cargo build --release now.\n");
    }

    #[test]
    fn test_link_shows_target() {
        let out = plain("See [the docs](https://example.com/docs).");
        assert!(out.contains("the docs (https://example.com/docs)"));
    }

    #[test]
    fn test_autolink_target_not_repeated() {
        let out = plain("Visit <https://example.com> today.");
        assert_eq!(out, "Visit https://example.com today.\n");
    }

    #[test]
    fn test_image_shows_alt_and_path() {
        let out = plain("![a chart](./chart.png)");
        assert_eq!(out, "a chart (./chart.png)\n");
    }

    #[test]
    fn test_rule_spans_width() {
        let out = plain_at("above\n\n---\n\nbelow", 30);
        assert!(out.contains(&"─".repeat(30)));
    }

    #[test]
    fn test_table_columns_aligned() {
        let out = plain("| Name | Qty |\n|------|-----|\n| tea | 2 |\n| coffee | 10 |");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name    Qty");
        assert!(lines[1].starts_with('─'));
        assert_eq!(lines[2], "tea     2");
        assert_eq!(lines[3], "coffee  10");
    }

    #[test]
    fn test_raw_html_dropped() {
        let out = plain("before\n\n<div>\nhtml\n</div>\n\nafter");
        assert!(out.contains("before"));
        assert!(out.contains("after"));
        assert!(!out.contains("<div>"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(plain(""), "");
    }

    #[test]
    fn test_output_ends_with_single_newline() {
        let out = plain("# A\n\ntext\n\n- item\n");
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }
}
