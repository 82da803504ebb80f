//! DOCX container parsing.
//!
//! A DOCX buffer is a ZIP archive holding WordprocessingML XML parts. The
//! walker reads `word/document.xml`, maps paragraph styles to headings,
//! numbering references to list items, and drawing blips to embedded media,
//! emitting an HTML fragment plus the image inventory and coarse document
//! structure. Media entries are decoded into data URIs on the blocking pool,
//! one task per entry; extraction never fails because one image is
//! unreadable, only when the container itself cannot be parsed.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::future::join_all;
use roxmltree::{Document as XmlDoc, Node};
use tracing::{debug, instrument, warn};
use zip::ZipArchive;

use pressroom_shared::{
    DEFAULT_DOCUMENT_TITLE, DEFAULT_IMAGE_ALT, ExtractedImage, HeadingRef, PositionHint,
    PressroomError, Result, slugify,
};

use crate::{ExtractedDocument, mime_for_src};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a DOCX buffer into HTML, images, and document structure.
///
/// Container-level failures (not a ZIP, missing or malformed
/// `word/document.xml`) are fatal. Individual media entries that fail to
/// read are dropped with a warning.
#[instrument(skip_all, fields(bytes = buffer.len()))]
pub(crate) async fn extract_docx(buffer: &[u8]) -> Result<ExtractedDocument> {
    let shared: Arc<Vec<u8>> = Arc::new(buffer.to_vec());
    let parsed = parse_container(&shared)?;

    debug!(
        paragraphs = parsed.paragraph_count,
        pending_images = parsed.images.len(),
        "parsed DOCX container"
    );

    // One blocking-pool task per media entry; each opens its own reader
    // over the shared bytes. Awaiting in spawn order preserves document
    // order in the output.
    let mut handles = Vec::with_capacity(parsed.images.len());
    for pending in parsed.images {
        let bytes = Arc::clone(&shared);
        handles.push(tokio::task::spawn_blocking(move || {
            resolve_image(&bytes, pending)
        }));
    }

    let mut images = Vec::new();
    for joined in join_all(handles).await {
        match joined {
            Ok(Some(image)) => images.push(image),
            Ok(None) => {}
            Err(err) => warn!(%err, "image extraction task failed"),
        }
    }

    Ok(ExtractedDocument {
        content: parsed.html,
        images,
        structure: parsed.structure,
    })
}

// ---------------------------------------------------------------------------
// Container parsing
// ---------------------------------------------------------------------------

struct ParsedContainer {
    html: String,
    structure: pressroom_shared::DocumentStructure,
    images: Vec<PendingImage>,
    paragraph_count: usize,
}

/// An image reference discovered during the body walk, not yet decoded.
struct PendingImage {
    source: MediaSource,
    alt_text: String,
    percent: f32,
}

enum MediaSource {
    /// ZIP entry path, e.g. `word/media/image1.png`.
    Archive(String),
    /// External target (http/https URL) referenced by the relationship.
    External(String),
}

fn parse_container(bytes: &[u8]) -> Result<ParsedContainer> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PressroomError::conversion_with("buffer is not a DOCX archive", e))?;

    let document_xml = read_zip_text(&mut archive, "word/document.xml")
        .ok_or_else(|| PressroomError::conversion("missing word/document.xml"))?;
    let rels = read_relationships(&mut archive, "word/_rels/document.xml.rels");
    let numbering = read_numbering(&mut archive);
    let (core_title, core_author) = read_core_properties(&mut archive);

    let xml = XmlDoc::parse(strip_bom(&document_xml))
        .map_err(|e| PressroomError::conversion_with("malformed word/document.xml", e))?;

    let body = xml
        .descendants()
        .find(|n| is_tag(n, "body"))
        .ok_or_else(|| PressroomError::conversion("document has no body element"))?;

    walk_body(&body, &rels, &numbering, core_title, core_author)
}

/// Walk top-level body blocks in document order, emitting HTML and
/// collecting image references and headings.
fn walk_body(
    body: &Node<'_, '_>,
    rels: &Relationships,
    numbering: &Numbering,
    core_title: Option<String>,
    core_author: Option<String>,
) -> Result<ParsedContainer> {
    let paragraph_count = body.children().filter(|n| is_tag(n, "p")).count();

    let mut html = String::new();
    let mut images: Vec<PendingImage> = Vec::new();
    let mut headings: Vec<HeadingRef> = Vec::new();
    let mut first_h1: Option<String> = None;
    let mut first_h2: Option<String> = None;
    let mut open_list: Option<&'static str> = None;
    let mut paragraph_index = 0usize;

    fn close_list(html: &mut String, open_list: &mut Option<&'static str>) {
        if let Some(tag) = open_list.take() {
            html.push_str(&format!("</{tag}>\n"));
        }
    }

    for node in body.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "p" => {
                let percent = if paragraph_count == 0 {
                    0.0
                } else {
                    paragraph_index as f32 / paragraph_count as f32 * 100.0
                };
                collect_images(&node, rels, percent, &mut images);

                let text = block_text(&node);
                let level = heading_level(&node);
                let trimmed = text.trim();

                if trimmed.is_empty() {
                    paragraph_index += 1;
                    continue;
                }

                if let Some(level) = level {
                    close_list(&mut html, &mut open_list);
                    if level == 1 {
                        if first_h1.is_none() {
                            first_h1 = Some(trimmed.to_string());
                        }
                    } else {
                        if first_h2.is_none() && level == 2 {
                            first_h2 = Some(trimmed.to_string());
                        }
                        headings.push(HeadingRef {
                            level,
                            text: trimmed.to_string(),
                            id: slugify(trimmed),
                        });
                    }
                    html.push_str(&format!(
                        "<h{level}>{}</h{level}>\n",
                        escape_html(trimmed)
                    ));
                } else if let Some(num_id) = list_number_id(&node) {
                    let tag = if numbering.is_bullet(&num_id) { "ul" } else { "ol" };
                    if open_list != Some(tag) {
                        close_list(&mut html, &mut open_list);
                        html.push_str(&format!("<{tag}>\n"));
                        open_list = Some(tag);
                    }
                    html.push_str(&format!("<li>{}</li>\n", escape_html(trimmed)));
                } else {
                    close_list(&mut html, &mut open_list);
                    html.push_str(&format!("<p>{}</p>\n", escape_html(trimmed)));
                }

                paragraph_index += 1;
            }
            "tbl" => {
                close_list(&mut html, &mut open_list);
                emit_table(&node, &mut html);
            }
            _ => {}
        }
    }
    close_list(&mut html, &mut open_list);

    let title = first_h1
        .or(first_h2)
        .or(core_title)
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string());

    Ok(ParsedContainer {
        html,
        structure: pressroom_shared::DocumentStructure {
            title,
            author: core_author,
            headings,
        },
        images,
        paragraph_count,
    })
}

fn emit_table(node: &Node<'_, '_>, html: &mut String) {
    html.push_str("<table>\n");
    for tr in node.children().filter(|n| is_tag(n, "tr")) {
        html.push_str("<tr>");
        for tc in tr.children().filter(|n| is_tag(n, "tc")) {
            let text = block_text(&tc);
            html.push_str(&format!("<td>{}</td>", escape_html(text.trim())));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

/// Concatenated run text of a block: `w:t` text nodes, tabs as spaces,
/// breaks as newlines.
fn block_text(node: &Node<'_, '_>) -> String {
    let mut buf = String::new();
    for child in node.descendants().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "t" => {
                if let Some(text) = child.text() {
                    buf.push_str(text);
                }
            }
            "tab" => buf.push(' '),
            "br" | "cr" => buf.push('\n'),
            _ => {}
        }
    }
    buf
}

/// Heading level from the paragraph style: `Heading1`..`Heading6` map to
/// their level, `Title` maps to 1.
fn heading_level(p: &Node<'_, '_>) -> Option<u8> {
    let style = child(p, "pPr")
        .and_then(|ppr| child(&ppr, "pStyle"))
        .and_then(|s| attr_local(&s, "val"))?;
    let lower = style.to_ascii_lowercase();

    if lower == "title" {
        return Some(1);
    }
    let digits = lower.strip_prefix("heading")?;
    let level: u8 = digits.trim_start_matches('-').parse().ok()?;
    (level >= 1).then_some(level.min(6))
}

/// The paragraph's numbering reference id, when it is a list item.
fn list_number_id(p: &Node<'_, '_>) -> Option<String> {
    let numpr = child(p, "pPr").and_then(|ppr| child(&ppr, "numPr"))?;
    let num_id = child(&numpr, "numId").and_then(|n| attr_local(&n, "val"))?;
    Some(num_id.to_string())
}

/// Collect drawing blips inside a paragraph as pending images.
fn collect_images(
    p: &Node<'_, '_>,
    rels: &Relationships,
    percent: f32,
    images: &mut Vec<PendingImage>,
) {
    for drawing in p.descendants().filter(|n| is_tag(n, "drawing")) {
        let Some(blip) = drawing.descendants().find(|n| is_tag(n, "blip")) else {
            continue;
        };
        let Some(rel_id) = attr_local(&blip, "embed").or_else(|| attr_local(&blip, "link"))
        else {
            continue;
        };
        let Some(target) = rels.get(rel_id) else {
            warn!(rel_id, "drawing references unknown relationship, skipping");
            continue;
        };

        let alt_text = drawing
            .descendants()
            .find(|n| is_tag(n, "docPr"))
            .and_then(|n| attr_local(&n, "descr").or_else(|| attr_local(&n, "name")))
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_ALT.to_string());

        let source = if target.starts_with("http://") || target.starts_with("https://") {
            MediaSource::External(target.to_string())
        } else {
            MediaSource::Archive(format!("word/{}", target.trim_start_matches('/')))
        };

        images.push(PendingImage {
            source,
            alt_text,
            percent,
        });
    }
}

// ---------------------------------------------------------------------------
// Media resolution (blocking pool)
// ---------------------------------------------------------------------------

/// Turn a pending image into an [`ExtractedImage`], reading archive media
/// into a data URI. Returns `None` when the entry cannot be read.
fn resolve_image(bytes: &[u8], pending: PendingImage) -> Option<ExtractedImage> {
    let (src, mime) = match &pending.source {
        MediaSource::External(url) => (url.clone(), mime_for_src(url)),
        MediaSource::Archive(path) => match read_media_entry(bytes, path) {
            Ok(data) => {
                let mime = mime_for_src(path);
                (format!("data:{mime};base64,{}", BASE64.encode(&data)), mime)
            }
            Err(err) => {
                warn!(entry = %path, %err, "dropping unreadable embedded image");
                return None;
            }
        },
    };

    let mut image = ExtractedImage::new(src, pending.alt_text);
    image.mime_type = mime;
    image.position = Some(PositionHint::PercentThroughDocument(pending.percent));
    Some(image)
}

fn read_media_entry(bytes: &[u8], path: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PressroomError::conversion_with("cannot reopen archive", e))?;
    let mut entry = archive
        .by_name(path)
        .map_err(|e| PressroomError::conversion_with(format!("missing media entry {path}"), e))?;
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data).map_err(|e| {
        PressroomError::conversion_with(format!("cannot read media entry {path}"), e)
    })?;
    Ok(data)
}

// ---------------------------------------------------------------------------
// Auxiliary parts
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    fn get(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }
}

fn read_relationships<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Relationships {
    let Some(text) = read_zip_text(archive, path) else {
        return Relationships::default();
    };
    let Ok(xml) = XmlDoc::parse(strip_bom(&text)) else {
        return Relationships::default();
    };

    let mut targets = HashMap::new();
    for rel in xml.descendants().filter(|n| is_tag(n, "Relationship")) {
        if let (Some(id), Some(target)) = (attr_local(&rel, "Id"), attr_local(&rel, "Target")) {
            targets.insert(id.to_string(), target.to_string());
        }
    }
    Relationships { targets }
}

/// Numbering definitions flattened to bullet-or-ordered per `numId`.
#[derive(Debug, Default)]
struct Numbering {
    bullet_by_num_id: HashMap<String, bool>,
}

impl Numbering {
    /// Unknown ids render as bullets.
    fn is_bullet(&self, num_id: &str) -> bool {
        self.bullet_by_num_id.get(num_id).copied().unwrap_or(true)
    }
}

fn read_numbering<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Numbering {
    let Some(text) = read_zip_text(archive, "word/numbering.xml") else {
        return Numbering::default();
    };
    let Ok(xml) = XmlDoc::parse(strip_bom(&text)) else {
        return Numbering::default();
    };

    let mut abstract_is_bullet: HashMap<String, bool> = HashMap::new();
    for abs in xml.descendants().filter(|n| is_tag(n, "abstractNum")) {
        let Some(abs_id) = attr_local(&abs, "abstractNumId") else {
            continue;
        };
        let base_level = abs
            .children()
            .filter(|n| is_tag(n, "lvl"))
            .find(|lvl| attr_local(lvl, "ilvl") == Some("0"))
            .or_else(|| abs.children().find(|n| is_tag(n, "lvl")));
        let is_bullet = base_level
            .and_then(|lvl| child(&lvl, "numFmt"))
            .and_then(|fmt| attr_local(&fmt, "val"))
            .is_some_and(|val| val == "bullet");
        abstract_is_bullet.insert(abs_id.to_string(), is_bullet);
    }

    let mut bullet_by_num_id = HashMap::new();
    for num in xml.descendants().filter(|n| is_tag(n, "num")) {
        if let (Some(num_id), Some(abs_id)) = (
            attr_local(&num, "numId"),
            child(&num, "abstractNumId").and_then(|n| attr_local(&n, "val")),
        ) {
            let is_bullet = abstract_is_bullet.get(abs_id).copied().unwrap_or(true);
            bullet_by_num_id.insert(num_id.to_string(), is_bullet);
        }
    }

    Numbering { bullet_by_num_id }
}

/// Title and author from `docProps/core.xml`, both optional. Authors named
/// "unknown" are treated as absent.
fn read_core_properties<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> (Option<String>, Option<String>) {
    let Some(text) = read_zip_text(archive, "docProps/core.xml") else {
        return (None, None);
    };
    let Ok(xml) = XmlDoc::parse(strip_bom(&text)) else {
        return (None, None);
    };

    let title = xml
        .descendants()
        .find(|n| is_tag(n, "title"))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let author = xml
        .descendants()
        .find(|n| is_tag(n, "creator"))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("unknown"))
        .map(str::to_string);

    (title, author)
}

// ---------------------------------------------------------------------------
// XML and ZIP helpers
// ---------------------------------------------------------------------------

fn read_zip_text<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Option<String> {
    let mut file = archive.by_name(path).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).ok()?;
    Some(text)
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}

fn is_tag(node: &Node<'_, '_>, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

fn child<'a>(node: &Node<'a, 'a>, local: &str) -> Option<Node<'a, 'a>> {
    node.children().find(|n| is_tag(n, local))
}

/// Attribute lookup by local name, ignoring the namespace prefix.
fn attr_local<'a>(node: &Node<'a, 'a>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document
    xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
    xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
    xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
    xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Quarterly Report</w:t></w:r></w:p>
    <w:p><w:r><w:t>Opening paragraph with enough text to matter.</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Findings</w:t></w:r></w:p>
    <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>First finding</w:t></w:r></w:p>
    <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>Second finding</w:t></w:r></w:p>
    <w:p><w:r><w:drawing><wp:inline><wp:docPr id="1" name="chart1" descr="Revenue chart"/><a:blip r:embed="rId5"/></wp:inline></w:drawing></w:r></w:p>
  </w:body>
</w:document>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;

    const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl></w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
</w:numbering>"#;

    const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties
    xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Core Title</dc:title>
  <dc:creator>Jordan Blake</dc:creator>
</cp:coreProperties>"#;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfakepixels";

    /// Assemble an in-memory DOCX from named parts.
    pub(crate) fn build_docx(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in parts {
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(data).expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    pub(crate) fn fixture_docx() -> Vec<u8> {
        build_docx(&[
            ("word/document.xml", DOCUMENT_XML.as_bytes()),
            ("word/_rels/document.xml.rels", RELS_XML.as_bytes()),
            ("word/numbering.xml", NUMBERING_XML.as_bytes()),
            ("docProps/core.xml", CORE_XML.as_bytes()),
            ("word/media/image1.png", PNG_BYTES),
        ])
    }

    #[tokio::test]
    async fn extracts_structure_and_content() {
        let doc = extract_docx(&fixture_docx()).await.expect("extract");

        assert_eq!(doc.structure.title, "Quarterly Report");
        assert_eq!(doc.structure.author.as_deref(), Some("Jordan Blake"));
        assert_eq!(doc.structure.headings.len(), 1);
        assert_eq!(doc.structure.headings[0].level, 2);
        assert_eq!(doc.structure.headings[0].id, "findings");

        assert!(doc.content.contains("<h1>Quarterly Report</h1>"));
        assert!(doc.content.contains("<h2>Findings</h2>"));
        assert!(doc.content.contains("<p>Opening paragraph"));
        assert!(doc.content.contains("<ul>"));
        assert!(doc.content.contains("<li>First finding</li>"));
        assert!(!doc.content.contains("<img"));
    }

    #[tokio::test]
    async fn embedded_image_becomes_data_uri() {
        let doc = extract_docx(&fixture_docx()).await.expect("extract");

        assert_eq!(doc.images.len(), 1);
        let image = &doc.images[0];
        assert!(image.src.starts_with("data:image/png;base64,"));
        assert_eq!(image.alt_text, "Revenue chart");
        assert_eq!(image.caption, "Revenue chart");
        assert_eq!(image.mime_type, "image/png");

        match image.position {
            Some(PositionHint::PercentThroughDocument(pct)) => {
                // drawing sits in the sixth of six paragraphs
                assert!((pct - 83.333_336).abs() < 0.01, "pct = {pct}");
            }
            ref other => panic!("expected percent hint, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn corrupt_buffer_is_a_conversion_error() {
        let err = extract_docx(b"definitely not a zip archive").await.unwrap_err();
        assert!(matches!(err, PressroomError::Conversion { .. }));
    }

    #[tokio::test]
    async fn archive_without_document_xml_fails() {
        let docx = build_docx(&[("word/other.xml", b"<x/>")]);
        let err = extract_docx(&docx).await.unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[tokio::test]
    async fn missing_media_entry_drops_image_only() {
        // rels points at media/image1.png but the entry is absent
        let docx = build_docx(&[
            ("word/document.xml", DOCUMENT_XML.as_bytes()),
            ("word/_rels/document.xml.rels", RELS_XML.as_bytes()),
        ]);
        let doc = extract_docx(&docx).await.expect("extract still succeeds");

        assert!(doc.images.is_empty());
        assert!(doc.content.contains("<h1>Quarterly Report</h1>"));
    }

    #[tokio::test]
    async fn missing_core_properties_defaults_author_to_none() {
        let docx = build_docx(&[("word/document.xml", DOCUMENT_XML.as_bytes())]);
        let doc = extract_docx(&docx).await.expect("extract");

        assert_eq!(doc.structure.title, "Quarterly Report");
        assert!(doc.structure.author.is_none());
    }

    #[tokio::test]
    async fn untitled_document_falls_back() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body><w:p><w:r><w:t>Body only.</w:t></w:r></w:p></w:body></w:document>"#;
        let docx = build_docx(&[("word/document.xml", xml.as_bytes())]);
        let doc = extract_docx(&docx).await.expect("extract");

        assert_eq!(doc.structure.title, DEFAULT_DOCUMENT_TITLE);
    }

    #[test]
    fn heading_levels_parsed_from_styles() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>T</w:t></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="Heading3"/></w:pPr><w:r><w:t>H3</w:t></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="Heading9"/></w:pPr><w:r><w:t>Deep</w:t></w:r></w:p>
</w:body></w:document>"#;
        let doc = XmlDoc::parse(xml).expect("parse");
        let levels: Vec<Option<u8>> = doc
            .descendants()
            .filter(|n| is_tag(n, "p"))
            .map(|p| heading_level(&p))
            .collect();
        assert_eq!(levels, vec![Some(1), Some(3), Some(6)]);
    }

    #[tokio::test]
    async fn tables_emit_rows_and_cells() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body><w:tbl>
<w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Value</w:t></w:r></w:p></w:tc></w:tr>
<w:tr><w:tc><w:p><w:r><w:t>foo</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>42</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl></w:body></w:document>"#;
        let docx = build_docx(&[("word/document.xml", xml.as_bytes())]);
        let doc = extract_docx(&docx).await.expect("extract");

        assert!(doc.content.contains("<td>Name</td><td>Value</td>"));
        assert!(doc.content.contains("<td>foo</td><td>42</td>"));
    }
}
