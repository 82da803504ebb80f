//! Raw text and HTML to canonical Markdown normalization.
//!
//! Input that looks like HTML (structural tags present) is converted to
//! Markdown with `htmd`, with `<table>` elements pre-converted through
//! `scraper` since htmd has no table handling. Everything then flows
//! through the cleanup pipeline in [`cleanup`].
//!
//! [`normalize`] is total: any input string, including empty or binary-ish
//! garbage, yields canonical Markdown, and normalizing canonical output is
//! a no-op.

mod cleanup;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use pressroom_shared::{PressroomError, Result};

// ---------------------------------------------------------------------------
// Normalizer entry point
// ---------------------------------------------------------------------------

/// Normalize raw extracted text into canonical Markdown.
#[instrument(skip_all, fields(len = raw.len()))]
pub fn normalize(raw: &str) -> String {
    let text = if is_probably_html(raw) {
        match convert_html(raw) {
            Ok(markdown) => markdown,
            Err(err) => {
                warn!(%err, "HTML conversion failed, normalizing raw text");
                raw.to_string()
            }
        }
    } else {
        raw.to_string()
    };

    cleanup::run_pipeline(&text)
}

/// Structural-tag detection. Inline-only fragments (`<br>`, `<em>`) and
/// generics-looking text (`Vec<i32>`) stay on the Markdown path, so
/// canonical output never re-triggers conversion.
fn is_probably_html(text: &str) -> bool {
    static STRUCTURAL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)</?(?:html|head|body|p|div|h[1-6]|ul|ol|li|table|thead|tbody|tr|td|th|blockquote|pre|section|article|aside|header|footer|figure|main)\b[^>]*>",
        )
        .expect("valid regex")
    });

    STRUCTURAL_TAG_RE.is_match(text)
}

// ---------------------------------------------------------------------------
// HTML conversion
// ---------------------------------------------------------------------------

/// Convert an HTML document or fragment to raw (pre-cleanup) Markdown.
fn convert_html(html: &str) -> Result<String> {
    let content = extract_body_html(html);
    let content = preprocess_tables(&content);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "nav", "iframe", "noscript", "svg"])
        .build();

    let markdown = converter
        .convert(&content)
        .map_err(|e| PressroomError::conversion(format!("htmd conversion failed: {e}")))?;

    debug!(html_len = html.len(), markdown_len = markdown.len(), "converted HTML");

    Ok(strip_residual_tags(&markdown))
}

/// Use the `<body>` subtree when a full document is supplied; fragments
/// parse into an implicit body and pass through unchanged.
fn extract_body_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body_sel = Selector::parse("body").expect("valid selector");

    if let Some(body) = doc.select(&body_sel).next() {
        let inner = body.inner_html();
        if !inner.trim().is_empty() {
            return inner;
        }
    }

    html.to_string()
}

/// Replace `<table>` elements with pipe-table Markdown before the htmd
/// pass. htmd would otherwise flatten table cells into run-on text.
fn preprocess_tables(html: &str) -> String {
    let table_sel = Selector::parse("table").expect("valid selector");
    let doc = Html::parse_fragment(html);

    if doc.select(&table_sel).next().is_none() {
        return html.to_string();
    }

    let mut result = html.to_string();
    for table in doc.select(&table_sel) {
        let markdown = html_table_to_markdown(&table);
        result = result.replacen(&table.html(), &markdown, 1);
    }

    result
}

fn html_table_to_markdown(table: &scraper::ElementRef<'_>) -> String {
    let tr_sel = Selector::parse("tr").expect("valid selector");
    let cell_sel = Selector::parse("th, td").expect("valid selector");

    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in table.select(&tr_sel) {
        let cells: Vec<String> = tr
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if rows.is_empty() {
        return String::new();
    }

    let cols = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(cols, String::new());
    }

    let mut md = String::from("\n\n");
    for (i, row) in rows.iter().enumerate() {
        md.push_str("| ");
        md.push_str(&row.join(" | "));
        md.push_str(" |\n");
        if i == 0 {
            md.push_str("| ");
            md.push_str(&vec!["---"; cols].join(" | "));
            md.push_str(" |\n");
        }
    }
    md.push('\n');
    md
}

/// Remove structural tags that survive conversion, keeping inner text.
/// The output must never contain a tag that [`is_probably_html`] matches,
/// otherwise a second normalize would round-trip through htmd again.
fn strip_residual_tags(md: &str) -> String {
    static RESIDUAL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?i)</?(?:html|head|body|p|div|span|h[1-6]|ul|ol|li|table|thead|tbody|tr|td|th|blockquote|pre|section|article|aside|header|footer|figure|figcaption|details|summary|main)\b[^>]*>",
        )
        .expect("valid regex")
    });

    let mut result = String::new();
    let mut in_code_block = false;

    for line in md.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            result.push_str(line);
        } else if in_code_block {
            result.push_str(line);
        } else {
            result.push_str(&RESIDUAL_TAG_RE.replace_all(line, ""));
        }
        result.push('\n');
    }

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
