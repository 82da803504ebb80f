//! Markdown conversion, figure rewriting, and section splitting.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, html};
use regex::{Captures, Regex};

use pressroom_shared::{RenderConfig, SlugSet, slugify};

use crate::proxy::{ImageUrlRewriter, placeholder_url};

const PLACEHOLDER_WIDTH: u32 = 800;
const PLACEHOLDER_HEIGHT: u32 = 400;

static HEADING_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h([1-6])>\s*#+\s*").expect("valid regex"));
static PARAGRAPH_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p>\s*#+\s+").expect("valid regex"));
static CAPTIONED_IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p><img src="([^"]*)"(?: alt="([^"]*)")?[^>]*/?></p>\s*<p><em>([^<]+)</em></p>"#)
        .expect("valid regex")
});
static STANDALONE_IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p><img src="([^"]*)"(?: alt="([^"]*)")?[^>]*/?></p>"#).expect("valid regex")
});
static H2_ID_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<h2[^>]*\sid="([^"]*)""#).expect("valid regex"));
static H2_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h2[^>]*>(.*?)</h2>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

// ---------------------------------------------------------------------------
// Markdown conversion
// ---------------------------------------------------------------------------

/// Convert canonical markdown to HTML. Tables and strikethrough are on, and
/// single newlines render as hard breaks.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Remove `#` runs that survive conversion at the start of headings and
/// paragraphs (input like `## # Title` or a hash-prefixed line glued to the
/// previous paragraph).
pub(crate) fn strip_stray_hashes(body: &str) -> String {
    let pass = HEADING_HASH_RE.replace_all(body, "<h${1}>");
    PARAGRAPH_HASH_RE.replace_all(&pass, "<p>").into_owned()
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

/// Replace rendered image paragraphs with `<figure>` blocks. An image
/// paragraph followed by an emphasized paragraph is treated as a captioned
/// figure; a bare image paragraph becomes a figure captioned by its alt
/// text. Sources go through `rewriter` exactly here.
pub(crate) fn rewrite_figures(
    body: &str,
    rewriter: &dyn ImageUrlRewriter,
    config: &RenderConfig,
) -> String {
    let pass = CAPTIONED_IMG_RE.replace_all(body, |caps: &Captures<'_>| {
        let alt = caps.get(2).map_or("", |m| m.as_str());
        figure_block(&caps[1], alt, caps[3].trim(), rewriter, config)
    });
    STANDALONE_IMG_RE
        .replace_all(&pass, |caps: &Captures<'_>| {
            let alt = caps.get(2).map_or("", |m| m.as_str());
            figure_block(&caps[1], alt, alt.trim(), rewriter, config)
        })
        .into_owned()
}

fn figure_block(
    src_attr: &str,
    alt_attr: &str,
    caption: &str,
    rewriter: &dyn ImageUrlRewriter,
    config: &RenderConfig,
) -> String {
    // Captured attributes are entity-escaped; the rewriter wants the real URL.
    let src = escape_html(&rewriter.rewrite(&unescape_html(src_attr)));
    let fallback_text = if caption.is_empty() {
        "image".to_string()
    } else {
        unescape_html(caption)
    };
    let fallback = placeholder_url(
        &config.placeholder_prefix,
        &fallback_text,
        PLACEHOLDER_WIDTH,
        PLACEHOLDER_HEIGHT,
    );
    let figcaption = if caption.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{caption}</figcaption>")
    };
    format!(
        "<figure class=\"article-figure\"><img src=\"{src}\" alt=\"{alt_attr}\" loading=\"lazy\" \
         onerror=\"this.onerror=null;this.src='{fallback}'\">{figcaption}</figure>",
    )
}

// ---------------------------------------------------------------------------
// Section splitting
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct SectionSplit {
    pub intro: Option<IntroBlock>,
    pub sections: Vec<SectionBlock>,
}

/// Content preceding the first `<h2>`. `id` is set when the renderer
/// synthesizes an introduction around it.
#[derive(Debug)]
pub(crate) struct IntroBlock {
    pub id: Option<String>,
    pub html: String,
}

#[derive(Debug)]
pub(crate) struct SectionBlock {
    pub id: String,
    pub html: String,
}

/// Split rendered HTML on `<h2` boundaries. Each section id prefers an
/// explicit `id` attribute, then the slugified heading text, then a
/// positional `section-N`; `slugs` keeps them unique document-wide.
pub(crate) fn split_sections(
    body: &str,
    has_explicit_intro: bool,
    slugs: &mut SlugSet,
) -> SectionSplit {
    let starts: Vec<usize> = body.match_indices("<h2").map(|(i, _)| i).collect();

    let lead = starts.first().map_or(body, |&first| &body[..first]);
    let intro = (!lead.trim().is_empty()).then(|| IntroBlock {
        id: (!has_explicit_intro).then(|| slugs.claim("introduction")),
        html: lead.trim().to_string(),
    });

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(body.len());
        let block = &body[start..end];
        let id = section_id(block, i, slugs);
        sections.push(SectionBlock {
            id,
            html: block.trim().to_string(),
        });
    }

    SectionSplit { intro, sections }
}

fn section_id(block: &str, index: usize, slugs: &mut SlugSet) -> String {
    if let Some(caps) = H2_ID_ATTR_RE.captures(block) {
        let explicit = caps[1].trim();
        if !explicit.is_empty() {
            return slugs.claim(explicit);
        }
    }
    let slug = H2_TEXT_RE
        .captures(block)
        .map(|caps| slugify(strip_tags(&caps[1]).trim()))
        .unwrap_or_default();
    if slug.is_empty() {
        slugs.claim(&format!("section-{}", index + 1))
    } else {
        slugs.claim(&slug)
    }
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

pub(crate) fn strip_tags(fragment: &str) -> String {
    TAG_RE.replace_all(fragment, "").into_owned()
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// Replacement order keeps double-escaped input (`&amp;lt;`) from collapsing
// past one level.
pub(crate) fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
