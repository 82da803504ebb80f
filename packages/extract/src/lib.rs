//! Document extraction for pressroom.
//!
//! [`extract`] turns an uploaded office-document buffer (DOCX) into an HTML
//! fragment, an ordered inventory of embedded images, and a coarse document
//! structure (title, author, headings). [`scan_markdown_images`] and
//! [`extract_markdown_images`] are the sibling entry points for
//! pasted-markdown inputs, where images arrive as `![alt](url "title")`
//! tokens instead of ZIP media entries.

mod docx;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use pressroom_shared::{DocumentStructure, ExtractedImage, Result};

/// Everything extraction produces: the HTML rendition of the document body,
/// images in document order, and title/author/heading metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub content: String,
    pub images: Vec<ExtractedImage>,
    pub structure: DocumentStructure,
}

/// Extract a DOCX buffer. Fails only on container-level problems (not a
/// ZIP, missing or malformed `word/document.xml`); unreadable media entries
/// are dropped with a warning.
pub async fn extract(buffer: &[u8]) -> Result<ExtractedDocument> {
    docx::extract_docx(buffer).await
}

static MD_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"([^"]*)")?\s*\)"#).expect("valid regex")
});
static MD_IMAGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"([^"]*)")?\s*\)\s*$"#)
        .expect("valid regex")
});
static MD_CAPTION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*\n]+)\*$").expect("valid regex"));

/// Collect `![alt](url "title")` tokens from raw markdown as images.
/// Caption comes from the title when present, else the alt text; no
/// position hint is attached.
pub fn scan_markdown_images(markdown: &str) -> Vec<ExtractedImage> {
    MD_IMAGE_RE
        .captures_iter(markdown)
        .map(image_from_token)
        .collect()
}

/// Lift standalone image lines out of pasted markdown so the placement
/// engine can re-anchor them. Returns the text with those lines (and a
/// directly-following `*caption*` line, when present) removed, plus the
/// images in document order. Images embedded mid-sentence stay in the text.
pub fn extract_markdown_images(markdown: &str) -> (String, Vec<ExtractedImage>) {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut kept: Vec<&str> = Vec::new();
    let mut images = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(caps) = MD_IMAGE_LINE_RE.captures(lines[i]) else {
            kept.push(lines[i]);
            i += 1;
            continue;
        };
        let mut image = image_from_token(caps);

        // An emphasized line just below the token is its caption.
        let mut next = i + 1;
        while next < lines.len() && lines[next].trim().is_empty() {
            next += 1;
        }
        if let Some(caption) = lines
            .get(next)
            .and_then(|line| MD_CAPTION_LINE_RE.captures(line.trim()))
        {
            image.caption = caption[1].trim().to_string();
            i = next + 1;
        } else {
            i += 1;
        }
        images.push(image);
    }

    (kept.join("\n"), images)
}

fn image_from_token(caps: regex::Captures<'_>) -> ExtractedImage {
    let alt = caps.get(1).map_or("", |m| m.as_str()).trim();
    let url = caps[2].to_string();
    let mut image = ExtractedImage::new(url.clone(), alt);
    if let Some(title) = caps.get(3) {
        let title = title.as_str().trim();
        if !title.is_empty() {
            image.caption = title.to_string();
        }
    }
    image.mime_type = mime_for_src(&url);
    image
}

/// MIME type for an image source: data URIs carry their own type, file
/// extensions map `.png`/`.gif`/`.svg`, anything else is `image/jpeg`.
pub(crate) fn mime_for_src(src: &str) -> String {
    if let Some(rest) = src.strip_prefix("data:") {
        if let Some(mime) = rest.split([';', ',']).next() {
            if !mime.is_empty() {
                return mime.to_string();
            }
        }
    }

    let path = src.split(['?', '#']).next().unwrap_or(src);
    let ext = path
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
    .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
