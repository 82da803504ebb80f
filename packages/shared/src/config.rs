//! Application configuration for pressroom.
//!
//! User config lives at `~/.pressroom/pressroom.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PressroomError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pressroom.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pressroom";

// ---------------------------------------------------------------------------
// Config structs (matching pressroom.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Image placement tuning.
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Rendering and URL-rewriting settings.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Author used when neither caller metadata nor the document declares one.
    #[serde(default = "default_author")]
    pub author: String,

    /// Category used when the caller declares none.
    #[serde(default = "default_category")]
    pub category: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            category: default_category(),
        }
    }
}

fn default_author() -> String {
    "Editorial Team".into()
}
fn default_category() -> String {
    "General".into()
}

/// `[placement]` section. The scoring weights are the documented contract
/// of the placement heuristic; tests probe boundary behavior through them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Reserve the first valid image as hero/cover when more than one
    /// image exists, excluding it from in-body placement.
    #[serde(default = "default_true")]
    pub reserve_hero: bool,

    /// Minimum character separation between consecutive insertion points.
    #[serde(default = "default_min_chars_between_images")]
    pub min_chars_between_images: usize,

    /// Score assigned to an absolute text-position hint.
    #[serde(default = "default_text_position_score")]
    pub text_position_score: f32,

    /// Score assigned to a percent-through-document hint.
    #[serde(default = "default_percent_score")]
    pub percent_score: f32,

    /// Score assigned by the important-paragraph round-robin fallback.
    #[serde(default = "default_distribution_score")]
    pub distribution_score: f32,

    /// Score assigned by the even-spread fallback.
    #[serde(default = "default_spread_score")]
    pub spread_score: f32,

    /// Keyword-affinity score below which placement falls back to
    /// distribution.
    #[serde(default = "default_min_section_score")]
    pub min_section_score: f32,

    /// Weight per caption keyword found verbatim in a section.
    #[serde(default = "default_exact_match_weight")]
    pub exact_match_weight: f32,

    /// Weight per caption keyword partially matching a section keyword.
    #[serde(default = "default_partial_match_weight")]
    pub partial_match_weight: f32,

    /// Paragraph importance a round-robin target must exceed.
    #[serde(default = "default_important_paragraph_threshold")]
    pub important_paragraph_threshold: u8,

    /// Maximum caption keywords considered per image.
    #[serde(default = "default_max_caption_keywords")]
    pub max_caption_keywords: usize,

    /// Minimum keyword length (shorter words are discarded).
    #[serde(default = "default_min_keyword_length")]
    pub min_keyword_length: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            reserve_hero: true,
            min_chars_between_images: default_min_chars_between_images(),
            text_position_score: default_text_position_score(),
            percent_score: default_percent_score(),
            distribution_score: default_distribution_score(),
            spread_score: default_spread_score(),
            min_section_score: default_min_section_score(),
            exact_match_weight: default_exact_match_weight(),
            partial_match_weight: default_partial_match_weight(),
            important_paragraph_threshold: default_important_paragraph_threshold(),
            max_caption_keywords: default_max_caption_keywords(),
            min_keyword_length: default_min_keyword_length(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_min_chars_between_images() -> usize {
    500
}
fn default_text_position_score() -> f32 {
    100.0
}
fn default_percent_score() -> f32 {
    80.0
}
fn default_distribution_score() -> f32 {
    50.0
}
fn default_spread_score() -> f32 {
    30.0
}
fn default_min_section_score() -> f32 {
    10.0
}
fn default_exact_match_weight() -> f32 {
    5.0
}
fn default_partial_match_weight() -> f32 {
    2.0
}
fn default_important_paragraph_threshold() -> u8 {
    7
}
fn default_max_caption_keywords() -> usize {
    10
}
fn default_min_keyword_length() -> usize {
    4
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Prefix for proxied image URLs; the original URL is appended
    /// percent-encoded.
    #[serde(default = "default_proxy_prefix")]
    pub proxy_prefix: String,

    /// Prefix for generated placeholder image URLs.
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,

    /// Substrings identifying storage URLs that must be routed through the
    /// proxy.
    #[serde(default = "default_storage_url_markers")]
    pub storage_url_markers: Vec<String>,

    /// Reading speed used for the read-time estimate.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            proxy_prefix: default_proxy_prefix(),
            placeholder_prefix: default_placeholder_prefix(),
            storage_url_markers: default_storage_url_markers(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

fn default_proxy_prefix() -> String {
    "/api/image-proxy?url=".into()
}
fn default_placeholder_prefix() -> String {
    "/api/placeholder".into()
}
fn default_storage_url_markers() -> Vec<String> {
    vec!["/storage/v1/object/".into()]
}
fn default_words_per_minute() -> usize {
    200
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pressroom/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PressroomError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pressroom/pressroom.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PressroomError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PressroomError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PressroomError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PressroomError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PressroomError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("min_chars_between_images"));
        assert!(toml_str.contains("proxy_prefix"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.placement.min_chars_between_images, 500);
        assert_eq!(parsed.render.words_per_minute, 200);
        assert!(parsed.placement.reserve_hero);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[placement]
reserve_hero = false
min_chars_between_images = 800

[defaults]
author = "Docs Guild"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.placement.reserve_hero);
        assert_eq!(config.placement.min_chars_between_images, 800);
        // untouched fields fall back to defaults
        assert_eq!(config.placement.max_caption_keywords, 10);
        assert_eq!(config.defaults.author, "Docs Guild");
        assert_eq!(config.defaults.category, "General");
        assert_eq!(config.render.proxy_prefix, "/api/image-proxy?url=");
    }
}
