//! Image placement: score candidate offsets for each figure, snap them to
//! paragraph boundaries, and space them out.
//!
//! Explicit position hints always win. Without a hint, caption keywords are
//! matched against section text; weak matches fall back to round-robin over
//! important paragraphs, then to an even spread. Offsets index into the
//! canonical markdown (paragraphs joined by blank lines).

use tracing::{debug, instrument};

use pressroom_shared::{ExtractedImage, Paragraph, PlacementConfig, PositionHint, Section};

const STOP_WORDS: &[&str] = &[
    "the", "and", "a", "an", "in", "on", "at", "to", "for", "with", "by", "of", "is", "are",
    "was", "were",
];

/// Placement output: an optional hero pulled off the front, and body images
/// carrying resolved insertion points.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub hero: Option<ExtractedImage>,
    pub body: Vec<ExtractedImage>,
}

struct Candidate {
    offset: usize,
    section: Option<usize>,
    score: f32,
}

/// Assign an insertion point to every valid image.
///
/// Images without a usable source are dropped. When the document has no
/// paragraphs, body images keep `insertion_point = None` and compose gathers
/// them under a trailing heading.
#[instrument(skip_all, fields(images = images.len(), paragraphs = paragraphs.len()))]
pub fn place(
    images: Vec<ExtractedImage>,
    paragraphs: &[Paragraph],
    sections: &[Section],
    full_text: &str,
    config: &PlacementConfig,
) -> Placement {
    let mut valid: Vec<ExtractedImage> = images
        .into_iter()
        .filter(ExtractedImage::has_source)
        .collect();
    for (index, image) in valid.iter_mut().enumerate() {
        if image.caption.trim().is_empty() {
            image.caption = if image.alt_text.trim().is_empty() {
                format!("Figure {}", index + 1)
            } else {
                image.alt_text.clone()
            };
        }
    }

    let hero = (config.reserve_hero && valid.len() > 1).then(|| valid.remove(0));

    if paragraphs.is_empty() || full_text.is_empty() {
        return Placement { hero, body: valid };
    }

    let text_length = full_text.len();
    let body_count = valid.len();
    let mut boundaries: Vec<usize> = paragraphs.iter().map(|p| p.char_position).collect();
    if let Some(last) = paragraphs.last() {
        boundaries.push(last.char_position + last.text.len());
    }

    for (index, image) in valid.iter_mut().enumerate() {
        let candidate = resolve_candidate(
            image, index, body_count, paragraphs, sections, text_length, config,
        );
        let snapped = nearest_boundary(candidate.offset, &boundaries);
        debug!(
            index,
            offset = candidate.offset,
            snapped,
            score = candidate.score,
            "placed image"
        );
        image.insertion_point = Some(snapped);
        image.section_index = candidate.section;
    }

    valid.sort_by_key(|image| image.insertion_point.unwrap_or(usize::MAX));
    enforce_spacing(&mut valid, sections, &boundaries, config);

    Placement { hero, body: valid }
}

// ---------------------------------------------------------------------------
// Candidate scoring
// ---------------------------------------------------------------------------

fn resolve_candidate(
    image: &ExtractedImage,
    index: usize,
    body_count: usize,
    paragraphs: &[Paragraph],
    sections: &[Section],
    text_length: usize,
    config: &PlacementConfig,
) -> Candidate {
    match image.position {
        Some(PositionHint::TextPosition(offset)) => {
            return Candidate {
                offset: offset.min(text_length),
                section: None,
                score: config.text_position_score,
            };
        }
        Some(PositionHint::PercentThroughDocument(percent)) => {
            let offset = ((text_length as f32 * percent) / 100.0).floor() as usize;
            return Candidate {
                offset: offset.min(text_length),
                section: None,
                score: config.percent_score,
            };
        }
        None => {}
    }

    let keywords = extract_keywords(&image.caption, config);
    if !keywords.is_empty() {
        if let Some(candidate) = best_section_candidate(&keywords, sections, config) {
            return candidate;
        }
    }
    fallback_candidate(index, body_count, paragraphs, text_length, config)
}

/// Score every section against the caption keywords and return the best,
/// provided it clears the minimum score.
fn best_section_candidate(
    keywords: &[String],
    sections: &[Section],
    config: &PlacementConfig,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut best_score = 0.0f32;

    for (section_index, section) in sections.iter().enumerate() {
        let section_text = section
            .paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let section_keywords = extract_keywords(&section_text, config);

        let mut score = 0.0f32;
        for keyword in keywords {
            if section_text.contains(keyword.as_str()) {
                score += config.exact_match_weight;
            }
            for section_keyword in &section_keywords {
                if section_keyword.contains(keyword.as_str())
                    || keyword.contains(section_keyword.as_str())
                {
                    score += config.partial_match_weight;
                }
            }
        }
        // Weight by section importance so strong sections attract figures.
        let adjusted = score * (1.0 + f32::from(section.importance) / 10.0);
        if adjusted > best_score {
            // Prefer the second paragraph so the figure lands after the
            // section opener.
            let target = section.paragraphs.get(1).or_else(|| section.paragraphs.first());
            if let Some(paragraph) = target {
                best = Some(Candidate {
                    offset: paragraph.char_position,
                    section: Some(section_index),
                    score: adjusted,
                });
                best_score = adjusted;
            }
        }
    }

    best.filter(|candidate| candidate.score >= config.min_section_score)
}

/// Round-robin over important body paragraphs, or an even spread when the
/// document has none.
fn fallback_candidate(
    index: usize,
    body_count: usize,
    paragraphs: &[Paragraph],
    text_length: usize,
    config: &PlacementConfig,
) -> Candidate {
    let mut important: Vec<&Paragraph> = paragraphs
        .iter()
        .filter(|p| !p.is_heading && p.importance > config.important_paragraph_threshold)
        .collect();
    important.sort_by(|a, b| b.importance.cmp(&a.importance));

    if !important.is_empty() {
        let target = important[index % important.len()];
        return Candidate {
            offset: target.char_position,
            section: None,
            score: config.distribution_score,
        };
    }

    let spread =
        ((text_length as f32 / (body_count + 1) as f32) * (index + 1) as f32).floor() as usize;
    Candidate {
        offset: spread.min(text_length),
        section: None,
        score: config.spread_score,
    }
}

/// Lowercase the caption, strip punctuation, and keep the first significant
/// words. Duplicates are kept so repeated terms weigh more.
fn extract_keywords(text: &str, config: &PlacementConfig) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect();
    cleaned
        .split_whitespace()
        .filter(|word| word.len() >= config.min_keyword_length && !STOP_WORDS.contains(word))
        .take(config.max_caption_keywords)
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Boundary snapping and spacing
// ---------------------------------------------------------------------------

/// Snap an offset to the closest paragraph boundary, keeping the earlier
/// boundary on ties.
fn nearest_boundary(position: usize, boundaries: &[usize]) -> usize {
    let Some(&first) = boundaries.first() else {
        return position;
    };
    let mut nearest = first;
    let mut distance = first.abs_diff(position);
    for &boundary in &boundaries[1..] {
        let d = boundary.abs_diff(position);
        if d < distance {
            nearest = boundary;
            distance = d;
        }
    }
    nearest
}

/// Push images forward until consecutive insertion points sit at least the
/// configured gap apart. Images sharing a section move to the next paragraph
/// inside it (or the section end); otherwise they move to the next global
/// boundary past the gap.
fn enforce_spacing(
    images: &mut [ExtractedImage],
    sections: &[Section],
    boundaries: &[usize],
    config: &PlacementConfig,
) {
    let min_gap = config.min_chars_between_images;
    for i in 1..images.len() {
        let Some(prev_point) = images[i - 1].insertion_point else {
            continue;
        };
        let prev_section = images[i - 1].section_index;
        let Some(point) = images[i].insertion_point else {
            continue;
        };
        if point.saturating_sub(prev_point) >= min_gap {
            continue;
        }

        let same_section =
            images[i].section_index.is_some() && images[i].section_index == prev_section;
        if same_section {
            if let Some(section) = images[i].section_index.and_then(|idx| sections.get(idx)) {
                let moved = section
                    .paragraphs
                    .iter()
                    .find(|p| p.char_position > prev_point + min_gap)
                    .map(|p| p.char_position)
                    .or_else(|| {
                        section
                            .paragraphs
                            .last()
                            .map(|p| p.char_position + p.text.len())
                    })
                    .unwrap_or(point);
                images[i].insertion_point = Some(moved);
            }
        } else if let Some(&boundary) =
            boundaries.iter().find(|&&b| b >= prev_point + min_gap)
        {
            images[i].insertion_point = Some(boundary);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
