//! Shared types, error model, and configuration for pressroom.
//!
//! This crate is the foundation depended on by all other pressroom crates.
//! It provides:
//! - [`PressroomError`] — the unified error type
//! - Domain types ([`ExtractedImage`], [`Paragraph`], [`Section`],
//!   [`DocumentStructure`], [`GeneratedArticle`])
//! - Configuration ([`AppConfig`], config loading)
//! - Slug generation ([`slugify`], [`SlugSet`])

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PlacementConfig, RenderConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{PressroomError, Result};
pub use slug::{SlugSet, slugify};
pub use types::{
    ArticleId, ArticleMeta, DEFAULT_DOCUMENT_TITLE, DEFAULT_IMAGE_ALT, DocumentInput,
    DocumentStructure, ExtractedImage, GeneratedArticle, HeadingRef, Paragraph, PositionHint,
    Section, TocEntry,
};
