//! Heading collection for the table of contents.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::strip_tags;

static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,3})\s+(.+)$").expect("valid regex"));
static LITERAL_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h([23])[^>]*>(.*?)</h[23]>").expect("valid regex"));
static INTRO_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^##\s+(?:introduction|overview)\b").expect("valid regex"));
static LITERAL_INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<h2[^>]*>\s*(?:introduction|overview)\b").expect("valid regex")
});
static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

/// A level-2 or level-3 heading in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Heading {
    pub level: u8,
    pub title: String,
}

/// Collect `##`/`###` lines and literal `<h2>`/`<h3>` blocks, skipping
/// fenced code. Titles come back with inline markup stripped.
pub(crate) fn collect_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_code_block = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if let Some(caps) = ATX_HEADING_RE.captures(line) {
            headings.push(Heading {
                level: caps[1].len() as u8,
                title: strip_inline_markup(caps[2].trim()),
            });
            continue;
        }
        for caps in LITERAL_HEADING_RE.captures_iter(line) {
            headings.push(Heading {
                level: caps[1].parse().unwrap_or(2),
                title: strip_inline_markup(strip_tags(&caps[2]).trim()),
            });
        }
    }
    headings
}

/// True when the document opens its own introduction, in which case the
/// renderer must not synthesize one.
pub(crate) fn has_intro_heading(markdown: &str) -> bool {
    INTRO_HEADING_RE.is_match(markdown) || LITERAL_INTRO_RE.is_match(markdown)
}

/// Drop emphasis, code spans, and link syntax from a heading title.
pub(crate) fn strip_inline_markup(title: &str) -> String {
    let unlinked = MD_LINK_RE.replace_all(title, "$1");
    unlinked
        .replace("**", "")
        .replace("__", "")
        .replace(['*', '_', '`'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_h2_and_h3_in_order() {
        let md = "# Title\n\n## First\n\nbody\n\n### Detail\n\n## Second\n";
        let headings = collect_headings(md);
        assert_eq!(
            headings,
            vec![
                Heading { level: 2, title: "First".into() },
                Heading { level: 3, title: "Detail".into() },
                Heading { level: 2, title: "Second".into() },
            ]
        );
    }

    #[test]
    fn skips_headings_inside_code_fences() {
        let md = "## Real\n\n```\n## not a heading\n```\n\n## Also real\n";
        let titles: Vec<String> = collect_headings(md).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Real", "Also real"]);
    }

    #[test]
    fn literal_html_headings_are_recognized() {
        let md = "intro\n\n<h2 class=\"x\">Embedded <b>Heading</b></h2>\n\n<h3>Nested</h3>\n";
        let headings = collect_headings(md);
        assert_eq!(
            headings,
            vec![
                Heading { level: 2, title: "Embedded Heading".into() },
                Heading { level: 3, title: "Nested".into() },
            ]
        );
    }

    #[test]
    fn inline_markup_is_stripped_from_titles() {
        assert_eq!(strip_inline_markup("**Bold** and `code`"), "Bold and code");
        assert_eq!(strip_inline_markup("[Linked](https://a.example) title"), "Linked title");
        assert_eq!(strip_inline_markup("_emphasis_"), "emphasis");
    }

    #[test]
    fn intro_heading_detection() {
        assert!(has_intro_heading("## Introduction\n\nbody"));
        assert!(has_intro_heading("## Overview and Scope\n"));
        assert!(has_intro_heading("<h2>Introduction</h2>"));
        assert!(!has_intro_heading("## Introducing the Team\n"));
        assert!(!has_intro_heading("### Introduction\n"));
        assert!(!has_intro_heading("body only"));
    }
}
