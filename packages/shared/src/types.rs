//! Core domain types for the pressroom pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when a document has no level-1/level-2 heading at all.
pub const DEFAULT_DOCUMENT_TITLE: &str = "Untitled Document";

/// Alt text used when an embedded image carries no description.
pub const DEFAULT_IMAGE_ALT: &str = "Document image";

// ---------------------------------------------------------------------------
// ArticleId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for generated-article identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    /// Generate a new time-sortable article identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// DocumentInput
// ---------------------------------------------------------------------------

/// One generation request's input: an office-document buffer or a raw
/// markdown/HTML string. Consumed once, never persisted by the core.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// Binary office document (DOCX container).
    Binary(Vec<u8>),
    /// Pasted markdown or HTML.
    Markdown(String),
}

// ---------------------------------------------------------------------------
// ExtractedImage
// ---------------------------------------------------------------------------

/// An explicit placement hint carried by an image from extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PositionHint {
    /// Absolute character offset into the normalized text.
    TextPosition(usize),
    /// Percentage of the way through the document (0-100).
    PercentThroughDocument(f32),
}

/// One image located in the source document or markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Data URI for embedded media, or a URL for linked images.
    pub src: String,
    /// Alt text; may be empty.
    pub alt_text: String,
    /// Display caption. Falls back to alt text, then to a generated
    /// "Figure N" during placement.
    pub caption: String,
    /// MIME type inferred from the media entry or URL extension.
    pub mime_type: String,
    /// Placement hint from extraction, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionHint>,
    /// Character offset in the normalized text where the image is inserted.
    /// Assigned by the placement engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion_point: Option<usize>,
    /// Index into the section list once placement is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_index: Option<usize>,
}

impl ExtractedImage {
    /// Build an image with the caption defaulted from the alt text.
    pub fn new(src: impl Into<String>, alt_text: impl Into<String>) -> Self {
        let alt_text = alt_text.into();
        Self {
            src: src.into(),
            caption: alt_text.clone(),
            alt_text,
            mime_type: "image/jpeg".into(),
            position: None,
            insertion_point: None,
            section_index: None,
        }
    }

    /// An image with no source cannot be rendered and is dropped by placement.
    pub fn has_source(&self) -> bool {
        !self.src.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Paragraph / Section
// ---------------------------------------------------------------------------

/// A contiguous run of normalized text between blank lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Position index in document order.
    pub index: usize,
    /// Raw paragraph text (may span multiple lines for list blocks).
    pub text: String,
    /// Whether this paragraph is an ATX heading (explicit or inferred).
    pub is_heading: bool,
    /// Whether this paragraph is a list block.
    pub is_list: bool,
    /// Heuristic importance, 0-10.
    pub importance: u8,
    /// Offset of the first character in the full normalized text
    /// (paragraphs joined with blank lines). Monotonically non-decreasing.
    pub char_position: usize,
}

impl Paragraph {
    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A maximal run of paragraphs headed by one heading paragraph, or the
/// implicit leading "Introduction".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Heading text with leading `#`s stripped.
    pub title: String,
    /// URL-safe id, unique within the document.
    pub id: String,
    /// Heading-level- and position-weighted importance.
    pub importance: u8,
    /// Member paragraphs in document order (the heading paragraph included).
    pub paragraphs: Vec<Paragraph>,
}

// ---------------------------------------------------------------------------
// DocumentStructure
// ---------------------------------------------------------------------------

/// One heading surfaced by extraction, levels 2-6 only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingRef {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Coarse structural summary of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStructure {
    /// First level-1 heading, else first level-2 heading, else
    /// [`DEFAULT_DOCUMENT_TITLE`].
    pub title: String,
    /// Declared document author, when the container records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Headings in document order, levels 2-6.
    pub headings: Vec<HeadingRef>,
}

impl Default for DocumentStructure {
    fn default() -> Self {
        Self {
            title: DEFAULT_DOCUMENT_TITLE.into(),
            author: None,
            headings: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TocEntry / ArticleMeta / GeneratedArticle
// ---------------------------------------------------------------------------

/// A single table-of-contents entry; ids match rendered section ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
}

impl TocEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Presentation metadata declared by the caller; anything absent is
/// resolved from the document or config defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Result of one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArticle {
    /// Unique identifier (UUID v7).
    pub article_id: ArticleId,
    /// Resolved display title.
    pub title: String,
    /// Resolved author.
    pub author: String,
    /// Resolved category.
    pub category: String,
    /// Resolved excerpt (declared, else derived from the first body
    /// paragraph).
    pub excerpt: String,
    /// Final HTML fragment.
    pub html: String,
    /// Canonical markdown with figures interleaved.
    pub markdown: String,
    /// Navigation entries in document order.
    pub toc: Vec<TocEntry>,
    /// Display read time, e.g. "2 min read".
    pub read_time: String,
    /// Whitespace-split word count of the canonical markdown, before
    /// figures are interleaved.
    pub word_count: usize,
    /// Hero/cover image, reserved by placement when the document has more
    /// than one valid image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<ExtractedImage>,
    /// SHA-256 hex digest of the canonical markdown.
    pub content_hash: String,
    /// When the article was generated.
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_roundtrip() {
        let id = ArticleId::new();
        let s = id.to_string();
        let parsed: ArticleId = s.parse().expect("parse ArticleId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn image_caption_defaults_from_alt() {
        let img = ExtractedImage::new("data:image/png;base64,AA==", "Flow chart");
        assert_eq!(img.caption, "Flow chart");
        assert_eq!(img.mime_type, "image/jpeg");
        assert!(img.has_source());
        assert!(img.insertion_point.is_none());
    }

    #[test]
    fn image_without_source_is_invalid() {
        let img = ExtractedImage::new("   ", "ghost");
        assert!(!img.has_source());
    }

    #[test]
    fn image_serialization_skips_unresolved_fields() {
        let img = ExtractedImage::new("https://example.com/a.png", "alt");
        let json = serde_json::to_string(&img).expect("serialize");
        assert!(!json.contains("insertion_point"));
        assert!(!json.contains("section_index"));

        let mut placed = img;
        placed.insertion_point = Some(1200);
        let json = serde_json::to_string(&placed).expect("serialize");
        assert!(json.contains("\"insertion_point\":1200"));
    }

    #[test]
    fn position_hint_serialization() {
        let hint = PositionHint::PercentThroughDocument(50.0);
        let json = serde_json::to_string(&hint).expect("serialize");
        let parsed: PositionHint = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, hint);
    }

    #[test]
    fn paragraph_word_count() {
        let para = Paragraph {
            index: 0,
            text: "three  short words".into(),
            is_heading: false,
            is_list: false,
            importance: 5,
            char_position: 0,
        };
        assert_eq!(para.word_count(), 3);
    }

    #[test]
    fn structure_default_title() {
        let structure = DocumentStructure::default();
        assert_eq!(structure.title, DEFAULT_DOCUMENT_TITLE);
        assert!(structure.headings.is_empty());
    }
}
