//! Obsidian-style link and embed rewriting.
//!
//! Downstream detectors and the styler only understand standard markdown, so
//! wiki shorthand is rewritten first:
//!
//! - `![[path]]` / `![[path|width]]` becomes `![base](path)`, with the width
//!   carried in the alt text as a `|width=` annotation for the image detector
//! - `[[target]]` / `[[target|Label]]` becomes `[Label](href)`, mapping bare
//!   note names to `./name.md`
//!
//! Lines inside fenced code blocks are left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::fence::FenceTracker;

/// Wiki link: `[[target]]` or `[[target|Label]]`.
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(\|([^\]]+))?\]\]").expect("valid wiki link regex"));

/// Image embed: `![[path]]` or `![[path|width]]`.
static IMAGE_EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]|]+)(\|([0-9]+))?\]\]").expect("valid embed regex"));

/// Rewrite wiki-style shorthand into standard markdown, line by line.
#[must_use]
pub fn rewrite_wiki_syntax(text: &str) -> String {
    let mut tracker = FenceTracker::new();
    let mut out = Vec::new();

    for line in text.split('\n') {
        if tracker.update(line) || tracker.in_fence() {
            out.push(line.to_owned());
            continue;
        }

        // Embeds first: they start with `![[` and would otherwise be eaten
        // by the wiki-link pattern.
        let line = IMAGE_EMBED_RE.replace_all(line, rewrite_embed);
        let line = WIKI_LINK_RE.replace_all(&line, rewrite_link);
        out.push(line.into_owned());
    }

    out.join("\n")
}

fn rewrite_embed(caps: &Captures<'_>) -> String {
    let path = normalize_path(caps[1].trim());
    let width = caps.get(3).map(|m| m.as_str().trim());

    let base = path.rsplit('/').next().unwrap_or(&path);
    let mut alt = match base.rsplit_once('.') {
        Some((stem, _)) => stem.to_owned(),
        None => base.to_owned(),
    };
    if let Some(width) = width {
        alt.push_str("|width=");
        alt.push_str(width);
    }

    format!("![{alt}]({path})")
}

fn rewrite_link(caps: &Captures<'_>) -> String {
    let target = caps[1].trim();
    let label = caps
        .get(3)
        .map_or(target, |m| m.as_str().trim())
        .to_owned();

    // Bare note names map to markdown files next to the document; anything
    // that already looks like a path keeps its shape.
    let href = if !target.contains('/') && !target.contains('.') {
        format!("./{target}.md")
    } else {
        normalize_path(target)
    };

    format!("[{label}]({href})")
}

/// Prefix relative paths with `./` unless already anchored.
fn normalize_path(path: &str) -> String {
    if path.starts_with("./") || path.starts_with('/') {
        path.to_owned()
    } else {
        format!("./{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_note_link() {
        assert_eq!(rewrite_wiki_syntax("See [[Foo]]."), "See [Foo](./Foo.md).");
    }

    #[test]
    fn test_labeled_path_link() {
        assert_eq!(
            rewrite_wiki_syntax("[[Notes/Foo|See Foo]]"),
            "[See Foo](./Notes/Foo)"
        );
    }

    #[test]
    fn test_link_with_extension_keeps_target() {
        assert_eq!(
            rewrite_wiki_syntax("[[guide.md]]"),
            "[guide.md](./guide.md)"
        );
    }

    #[test]
    fn test_absolute_target_unchanged() {
        assert_eq!(
            rewrite_wiki_syntax("[[/abs/path.md|abs]]"),
            "[abs](/abs/path.md)"
        );
    }

    #[test]
    fn test_image_embed() {
        assert_eq!(
            rewrite_wiki_syntax("![[pics/cat.png]]"),
            "![cat](./pics/cat.png)"
        );
    }

    #[test]
    fn test_image_embed_with_width() {
        assert_eq!(
            rewrite_wiki_syntax("![[cat.png|320]]"),
            "![cat|width=320](./cat.png)"
        );
    }

    #[test]
    fn test_embed_path_already_anchored() {
        assert_eq!(
            rewrite_wiki_syntax("![[./cat.png]]"),
            "![cat](./cat.png)"
        );
    }

    #[test]
    fn test_code_fences_untouched() {
        let text = "```\n[[Foo]]\n![[bar.png]]\n```\n[[Foo]]";
        assert_eq!(
            rewrite_wiki_syntax(text),
            "```\n[[Foo]]\n![[bar.png]]\n```\n[Foo](./Foo.md)"
        );
    }

    #[test]
    fn test_fence_marker_line_untouched() {
        let text = "```mermaid\ngraph TD\n```";
        assert_eq!(rewrite_wiki_syntax(text), text);
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = "no shorthand here\n\njust prose";
        assert_eq!(rewrite_wiki_syntax(text), text);
    }

    #[test]
    fn test_both_forms_on_one_line() {
        assert_eq!(
            rewrite_wiki_syntax("![[a.png]] then [[B]]"),
            "![a](./a.png) then [B](./B.md)"
        );
    }
}
