//! End-to-end article generation.
//!
//! Stages run strictly in order: extract, normalize, classify, place,
//! compose, render. Each stage consumes the previous stage's output and
//! none re-invokes an earlier one, so the composed markdown is canonical
//! by construction and is never normalized a second time.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use pressroom_extract::{extract, extract_markdown_images};
use pressroom_markdown::normalize;
use pressroom_render::{ImageUrlRewriter, StorageProxy, render};
use pressroom_shared::{
    AppConfig, ArticleId, ArticleMeta, DEFAULT_DOCUMENT_TITLE, DocumentInput, DocumentStructure,
    GeneratedArticle, HeadingRef, Paragraph, Result,
};

use crate::compose::compose;
use crate::placement::place;
use crate::sections::{Classified, classify};

const EXCERPT_MAX_CHARS: usize = 160;

// ---------------------------------------------------------------------------
// Stage progress
// ---------------------------------------------------------------------------

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Normalize,
    Classify,
    Place,
    Compose,
    Render,
}

impl Stage {
    /// Short progress label for interactive frontends.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "extracting document",
            Stage::Normalize => "normalizing markdown",
            Stage::Classify => "classifying sections",
            Stage::Place => "placing images",
            Stage::Compose => "composing article",
            Stage::Render => "rendering html",
        }
    }
}

/// Progress callbacks for frontends. All methods have no-op defaults.
pub trait StageObserver: Send + Sync {
    fn stage_started(&self, stage: Stage) {
        let _ = stage;
    }
}

/// Observer that discards all progress events.
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a publishable article from a source document.
pub async fn generate(
    input: DocumentInput,
    meta: ArticleMeta,
    config: &AppConfig,
) -> Result<GeneratedArticle> {
    generate_with_observer(input, meta, config, &NoopObserver).await
}

/// [`generate`] with stage progress reported to `observer`.
#[instrument(skip_all)]
pub async fn generate_with_observer(
    input: DocumentInput,
    meta: ArticleMeta,
    config: &AppConfig,
    observer: &dyn StageObserver,
) -> Result<GeneratedArticle> {
    observer.stage_started(Stage::Extract);
    let (content, images, extracted_structure) = match input {
        DocumentInput::Binary(buffer) => {
            let document = extract(&buffer).await?;
            (document.content, document.images, Some(document.structure))
        }
        DocumentInput::Markdown(text) => {
            let (stripped, images) = extract_markdown_images(&text);
            (stripped, images, None)
        }
    };

    observer.stage_started(Stage::Normalize);
    let markdown = normalize(&content);
    let word_count = markdown.split_whitespace().count();

    observer.stage_started(Stage::Classify);
    let classified = classify(&markdown);
    let structure = extracted_structure.unwrap_or_else(|| derive_structure(&classified));

    observer.stage_started(Stage::Place);
    let placement = place(
        images,
        &classified.paragraphs,
        &classified.sections,
        &markdown,
        &config.placement,
    );

    observer.stage_started(Stage::Compose);
    let composed = compose(&classified.paragraphs, &placement.body);

    observer.stage_started(Stage::Render);
    let proxy = StorageProxy::from_config(&config.render);
    let ArticleMeta {
        title,
        author,
        category,
        excerpt,
    } = meta;
    let title = title.unwrap_or_else(|| structure.title.clone());
    let author = author
        .or_else(|| structure.author.clone())
        .unwrap_or_else(|| config.defaults.author.clone());
    let category = category.unwrap_or_else(|| config.defaults.category.clone());
    let excerpt = excerpt.unwrap_or_else(|| derive_excerpt(&classified.paragraphs));

    let render_meta = ArticleMeta {
        title: Some(title.clone()),
        author: Some(author.clone()),
        category: Some(category.clone()),
        excerpt: (!excerpt.is_empty()).then(|| excerpt.clone()),
    };
    let rendered = render(&composed, &render_meta, word_count, &proxy, &config.render);

    let hero = placement.hero.map(|mut image| {
        image.src = proxy.rewrite(&image.src);
        image
    });
    let content_hash = format!("{:x}", Sha256::digest(composed.as_bytes()));

    let article = GeneratedArticle {
        article_id: ArticleId::new(),
        title,
        author,
        category,
        excerpt,
        html: rendered.html,
        markdown: composed,
        toc: rendered.toc,
        read_time: rendered.read_time,
        word_count,
        hero,
        content_hash,
        generated_at: Utc::now(),
    };
    info!(article_id = %article.article_id, words = word_count, "article generated");
    Ok(article)
}

// ---------------------------------------------------------------------------
// Derived metadata
// ---------------------------------------------------------------------------

/// Build a structural summary from classified paragraphs, for inputs whose
/// container carries none (pasted markdown or HTML).
pub fn derive_structure(classified: &Classified) -> DocumentStructure {
    let title = first_heading_text(&classified.paragraphs, "# ")
        .or_else(|| first_heading_text(&classified.paragraphs, "## "))
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string());

    let headings = classified
        .sections
        .iter()
        .filter_map(|section| {
            let first = section.paragraphs.first()?;
            if !first.is_heading {
                return None;
            }
            let level = first.text.chars().take_while(|&c| c == '#').count() as u8;
            if level < 2 {
                return None;
            }
            Some(HeadingRef {
                level,
                text: section.title.clone(),
                id: section.id.clone(),
            })
        })
        .collect();

    DocumentStructure {
        title,
        author: None,
        headings,
    }
}

fn first_heading_text(paragraphs: &[Paragraph], prefix: &str) -> Option<String> {
    paragraphs
        .iter()
        .find_map(|p| p.text.strip_prefix(prefix))
        .map(|text| text.trim().to_string())
}

/// First body paragraph, shortened at a word boundary when it runs long.
fn derive_excerpt(paragraphs: &[Paragraph]) -> String {
    let Some(paragraph) = paragraphs.iter().find(|p| !p.is_heading && !p.is_list) else {
        return String::new();
    };
    let text = paragraph.text.replace('\n', " ");
    if text.len() <= EXCERPT_MAX_CHARS {
        return text;
    }

    let mut cut = 0;
    for (offset, _) in text.match_indices(' ') {
        if offset > EXCERPT_MAX_CHARS {
            break;
        }
        cut = offset;
    }
    if cut == 0 {
        cut = text
            .char_indices()
            .take_while(|(offset, _)| *offset <= EXCERPT_MAX_CHARS)
            .last()
            .map(|(offset, _)| offset)
            .unwrap_or(0);
    }
    format!("{}...", text[..cut].trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
