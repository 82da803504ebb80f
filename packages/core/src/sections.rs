//! Paragraph splitting and heuristic section classification.
//!
//! Canonical markdown is split into paragraphs (list runs stay whole),
//! short headingless lines are promoted to inferred level-2 headings by an
//! ordered rule table, and the result is partitioned into titled sections
//! with importance scores that drive image placement.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use pressroom_shared::{Paragraph, Section, SlugSet, slugify};

static ATX_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}\s+").expect("valid regex"));
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[*+-]|\d+\.)\s+").expect("valid regex"));
static TITLE_CASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+)+$").expect("valid regex"));
static STOP_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:and|the|or|but|for|nor|yet|so|a|an|in|on|at|by|to|from)\b")
        .expect("valid regex")
});

/// Topic vocabularies that mark a line as a section heading, checked in
/// order. The label names the section family for diagnostics.
const TOPIC_RULES: &[(&str, &str)] = &[
    (
        "Introduction",
        r"\b(?:introduction|overview|getting started|preface|foreword|preamble|abstract|summary|executive summary)\b",
    ),
    (
        "Background",
        r"\b(?:background|context|history|setting|historical perspective|prior work|previous research)\b",
    ),
    (
        "Methodology",
        r"\b(?:methodology|approach|method|process|procedure|technique|framework|experiment setup|research design)\b",
    ),
    (
        "Results",
        r"\b(?:results|findings|outcome|data|observations|measurements|analysis results|experimental results)\b",
    ),
    (
        "Discussion",
        r"\b(?:discussion|analysis|interpretation|evaluation|assessment|implication|significance|meaning)\b",
    ),
    (
        "Conclusion",
        r"\b(?:conclusion|summary|final thoughts|closing remarks|final words|wrap-up|wrap up|takeaway|key points)\b",
    ),
    (
        "Recommendations",
        r"\b(?:recommendations|suggestions|next steps|future work|future directions|implications|action items|proposed actions)\b",
    ),
    (
        "References",
        r"\b(?:references|sources|bibliography|works cited|citations|literature|further reading)\b",
    ),
    (
        "Appendix",
        r"\b(?:appendix|appendices|supplementary|additional information|additional data)\b",
    ),
    (
        "Case Study",
        r"\b(?:case study|example|application|implementation|demonstration|use case)\b",
    ),
    (
        "Benefits",
        r"\b(?:benefits|advantages|strengths|value proposition|key advantages|positive aspects)\b",
    ),
    (
        "Challenges",
        r"\b(?:challenges|limitations|constraints|drawbacks|disadvantages|issues|problems)\b",
    ),
    (
        "Solution",
        r"\b(?:solution|resolution|answer|remedy|fix|approach|proposal)\b",
    ),
    (
        "Features",
        r"\b(?:features|capabilities|functionality|specifications|characteristics|attributes)\b",
    ),
    (
        "FAQ",
        r"\b(?:faq|frequently asked questions|common questions|q&a|questions and answers)\b",
    ),
    (
        "Data Analysis",
        r"\b(?:data|statistics|metrics|numbers|figures|analytics|measurements)\b",
    ),
    (
        "Tools & Technologies",
        r"\b(?:tools|technologies|equipment|software|hardware|resources|instruments)\b",
    ),
    (
        "Implementation",
        r"\b(?:implementation|execution|deployment|installation|setup|configuration)\b",
    ),
    (
        "Impact",
        r"\b(?:impact|effect|consequence|outcome|result|influence)\b",
    ),
    (
        "Best Practices",
        r"\b(?:best practices|guidelines|recommendations|tips|advice|strategies)\b",
    ),
];

static TOPIC_RULES_COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TOPIC_RULES
        .iter()
        .map(|(family, pattern)| {
            let re = Regex::new(&format!("(?i){pattern}")).expect("valid regex");
            (*family, re)
        })
        .collect()
});

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifier output: every paragraph in document order plus the sections
/// partitioning them.
#[derive(Debug, Clone)]
pub struct Classified {
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<Section>,
}

/// Split canonical markdown into paragraphs, promote inferred headings,
/// score importance, and group into sections.
#[instrument(skip_all, fields(len = markdown.len()))]
pub fn classify(markdown: &str) -> Classified {
    let blocks = split_blocks(markdown);
    let total = blocks.len();

    let mut paragraphs = Vec::with_capacity(total);
    let mut char_position = 0usize;
    for (index, block) in blocks.into_iter().enumerate() {
        let mut text = block;
        let mut is_heading = ATX_HEADING_RE.is_match(&text);
        let is_list = !is_heading && LIST_ITEM_RE.is_match(&text);

        if !is_heading && !is_list {
            if let Some(rule) = infer_heading_rule(&text) {
                debug!(rule, text = %text, "promoted paragraph to heading");
                text = format!("## {text}");
                is_heading = true;
            }
        }

        let word_count = text.split_whitespace().count();
        let importance = importance_for(index, total, is_heading, word_count);
        let len = text.len();
        paragraphs.push(Paragraph {
            index,
            text,
            is_heading,
            is_list,
            importance,
            char_position,
        });
        char_position += len + 2;
    }

    let sections = build_sections(&paragraphs);
    Classified {
        paragraphs,
        sections,
    }
}

// ---------------------------------------------------------------------------
// Paragraph splitting
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq)]
enum BlockKind {
    Text,
    List,
}

/// Split on blank lines, keeping list runs (items plus their indented
/// continuations) and fenced code together, and breaking at text/list
/// transitions even without a blank line.
fn split_blocks(markdown: &str) -> Vec<String> {
    fn flush(blocks: &mut Vec<String>, current: &mut Vec<&str>) {
        if current.is_empty() {
            return;
        }
        let text = current.join("\n").trim().to_string();
        if !text.is_empty() {
            blocks.push(text);
        }
        current.clear();
    }

    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut kind = BlockKind::Text;
    let mut in_code_block = false;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            if in_code_block {
                current.push(line);
                in_code_block = false;
                flush(&mut blocks, &mut current);
                kind = BlockKind::Text;
            } else {
                flush(&mut blocks, &mut current);
                in_code_block = true;
                current.push(line);
            }
            continue;
        }
        if in_code_block {
            current.push(line);
            continue;
        }

        if trimmed.is_empty() {
            flush(&mut blocks, &mut current);
            kind = BlockKind::Text;
            continue;
        }

        if LIST_ITEM_RE.is_match(line) {
            if kind != BlockKind::List {
                flush(&mut blocks, &mut current);
                kind = BlockKind::List;
            }
            current.push(line);
        } else if kind == BlockKind::List {
            // Indented lines continue the list block; anything else closes it.
            if line.starts_with("  ") || line.starts_with('\t') {
                current.push(line);
            } else {
                flush(&mut blocks, &mut current);
                kind = BlockKind::Text;
                current.push(line);
            }
        } else {
            current.push(line);
        }
    }
    flush(&mut blocks, &mut current);
    blocks
}

// ---------------------------------------------------------------------------
// Heading inference
// ---------------------------------------------------------------------------

/// Ordered promotion rules for short headingless lines. Returns the name of
/// the rule that fired, or `None` when the line stays body text.
fn infer_heading_rule(text: &str) -> Option<&'static str> {
    if text.len() >= 100 || text.contains('\n') || text.starts_with('#') {
        return None;
    }
    if text.ends_with(['.', '!', '?']) {
        return None;
    }
    if !text.chars().any(|c| c.is_alphanumeric()) {
        return None;
    }

    for (family, re) in TOPIC_RULES_COMPILED.iter() {
        if re.is_match(text) {
            return Some(*family);
        }
    }
    if text.len() > 3 && text == text.to_uppercase() {
        return Some("all-caps");
    }
    if TITLE_CASE_RE.is_match(text) && !STOP_WORD_RE.is_match(text) {
        return Some("title-case");
    }
    if text.len() < 50 {
        return Some("short-line");
    }
    None
}

/// Base 5, +3 for headings, +2/+1 for long paragraphs, +1 near either end
/// of the document, capped at 10.
fn importance_for(index: usize, total: usize, is_heading: bool, word_count: usize) -> u8 {
    let mut score: u8 = 5;
    if is_heading {
        score += 3;
    }
    if word_count > 100 {
        score += 2;
    } else if word_count > 50 {
        score += 1;
    }
    let position = index as f32;
    let span = total as f32;
    if position < span * 0.2 {
        score += 1;
    }
    if position > span * 0.8 {
        score += 1;
    }
    score.min(10)
}

// ---------------------------------------------------------------------------
// Section grouping
// ---------------------------------------------------------------------------

fn build_sections(paragraphs: &[Paragraph]) -> Vec<Section> {
    let total = paragraphs.len();
    let mut slugs = SlugSet::new();
    let mut sections: Vec<Section> = Vec::new();

    // Leading paragraphs with no heading form an implicit introduction.
    let mut title = String::from("Introduction");
    let mut importance: u8 = 8;
    let mut members: Vec<Paragraph> = Vec::new();

    for paragraph in paragraphs {
        if paragraph.is_heading {
            flush_section(
                &mut sections,
                &mut slugs,
                &title,
                importance,
                std::mem::take(&mut members),
            );
            title = heading_title(&paragraph.text);
            importance = 7;
            if paragraph.text.starts_with("# ") {
                importance += 2;
            }
            if (paragraph.index as f32) < total as f32 * 0.3 {
                importance += 1;
            }
        }
        members.push(paragraph.clone());
    }
    flush_section(&mut sections, &mut slugs, &title, importance, members);
    sections
}

fn flush_section(
    sections: &mut Vec<Section>,
    slugs: &mut SlugSet,
    title: &str,
    importance: u8,
    members: Vec<Paragraph>,
) {
    if members.is_empty() {
        return;
    }
    let slug = slugify(title);
    let id = if slug.is_empty() {
        slugs.claim(&format!("section-{}", sections.len() + 1))
    } else {
        slugs.claim(&slug)
    };
    sections.push(Section {
        title: title.to_string(),
        id,
        importance,
        paragraphs: members,
    });
}

fn heading_title(text: &str) -> String {
    ATX_HEADING_RE.replace(text, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines_and_list_transitions() {
        let md = "Alpha opening words.\n\nWe shipped the following.\n* one\n* two\n\
                  Closing note follows here.\n";
        let classified = classify(md);
        let texts: Vec<&str> = classified.paragraphs.iter().map(|p| p.text.as_str()).collect();

        assert_eq!(
            texts,
            vec![
                "Alpha opening words.",
                "We shipped the following.",
                "* one\n* two",
                "Closing note follows here.",
            ]
        );
        assert!(classified.paragraphs[2].is_list);
        assert!(!classified.paragraphs[2].is_heading);
    }

    #[test]
    fn indented_continuations_stay_with_their_list() {
        let md = "* item one\n  wrapped detail\n* item two\n";
        let classified = classify(md);
        assert_eq!(classified.paragraphs.len(), 1);
        assert!(classified.paragraphs[0].is_list);
        assert!(classified.paragraphs[0].text.contains("wrapped detail"));
    }

    #[test]
    fn fenced_code_stays_one_paragraph() {
        let md = "```python\nx = 1\n\ny = 2\n```\n";
        let classified = classify(md);
        assert_eq!(classified.paragraphs.len(), 1);
        assert!(!classified.paragraphs[0].is_heading);
        assert!(classified.paragraphs[0].text.contains("y = 2"));
    }

    #[test]
    fn atx_levels_one_to_three_are_headings() {
        let classified = classify("# One\n\n### Three\n\n#### Four\n");
        assert!(classified.paragraphs[0].is_heading);
        assert!(classified.paragraphs[1].is_heading);
        // Deeper levels pass through as body text for the renderer.
        assert!(!classified.paragraphs[2].is_heading);
        assert_eq!(classified.paragraphs[2].text, "#### Four");
    }

    #[test]
    fn promotion_rules_fire_in_order() {
        assert_eq!(
            infer_heading_rule("Detailed methodology adopted across the research program"),
            Some("Methodology")
        );
        assert_eq!(infer_heading_rule("Final thoughts on it"), Some("Conclusion"));
        assert_eq!(infer_heading_rule("TEAM UPDATE"), Some("all-caps"));
        assert_eq!(
            infer_heading_rule("Northern Lights Viewing Gear Seasonal Camping Spots"),
            Some("title-case")
        );
        assert_eq!(infer_heading_rule("Shipping wins"), Some("short-line"));
    }

    #[test]
    fn promotion_gate_rejects_sentences_and_long_lines() {
        assert_eq!(infer_heading_rule("This ends with a period."), None);
        assert_eq!(infer_heading_rule("Really?"), None);
        let long = "word ".repeat(30);
        assert_eq!(infer_heading_rule(long.trim_end()), None);
        // Stop words block the title-case rule and fifty-plus chars block
        // the short-line rule.
        assert_eq!(
            infer_heading_rule("Northern Lights Viewing Guide And Seasonal Camping Spots"),
            None
        );
        assert_eq!(infer_heading_rule("---"), None);
        assert_eq!(infer_heading_rule("## Already marked"), None);
    }

    #[test]
    fn promoted_lines_become_level_two_headings() {
        let md = "Some ordinary opening sentence with enough words to stay body text \
                  here.\n\nKey Customer Wins\n\nMore body text follows after the promoted line.\n";
        let classified = classify(md);

        assert!(!classified.paragraphs[0].is_heading);
        assert!(classified.paragraphs[1].is_heading);
        assert_eq!(classified.paragraphs[1].text, "## Key Customer Wins");
    }

    #[test]
    fn list_blocks_are_never_promoted() {
        let classified = classify("* Solution overview\n");
        assert!(classified.paragraphs[0].is_list);
        assert!(!classified.paragraphs[0].is_heading);
    }

    #[test]
    fn importance_scoring_components() {
        assert_eq!(importance_for(5, 12, false, 10), 5);
        assert_eq!(importance_for(5, 12, true, 2), 8);
        assert_eq!(importance_for(0, 12, false, 10), 6);
        assert_eq!(importance_for(11, 12, false, 10), 6);
        assert_eq!(importance_for(5, 12, false, 60), 6);
        assert_eq!(importance_for(5, 12, false, 120), 7);
        // First, heading, and long all at once hits the cap.
        assert_eq!(importance_for(0, 12, true, 120), 10);
    }

    #[test]
    fn sections_partition_paragraphs_in_order() {
        let md = "Lead paragraph one.\n\nLead paragraph two.\n\n## Results\n\n\
                  Body a.\n\nBody b.\n\n## Conclusion\n\nTail.\n";
        let classified = classify(md);

        let titles: Vec<&str> = classified.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Results", "Conclusion"]);
        assert_eq!(classified.sections[0].importance, 8);
        assert_eq!(classified.sections[1].importance, 8);
        assert_eq!(classified.sections[2].importance, 7);

        let flattened: Vec<usize> = classified
            .sections
            .iter()
            .flat_map(|s| s.paragraphs.iter().map(|p| p.index))
            .collect();
        let expected: Vec<usize> = (0..classified.paragraphs.len()).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn level_one_heading_boosts_its_section() {
        let classified = classify("# Title\n\nBody.\n");
        assert_eq!(classified.sections.len(), 1);
        assert_eq!(classified.sections[0].title, "Title");
        assert_eq!(classified.sections[0].importance, 10);
    }

    #[test]
    fn duplicate_section_titles_get_suffixed_ids() {
        let classified = classify("## Results\n\na\n\n## Results\n\nb\n");
        let ids: Vec<&str> = classified.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["results", "results-2"]);
    }

    #[test]
    fn char_positions_reconstruct_the_document() {
        let md = "Intro words here now.\n\nKey Customer Wins\n\nMore body text follows.\n";
        let classified = classify(md);
        let joined = classified
            .paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        for paragraph in &classified.paragraphs {
            let start = paragraph.char_position;
            let end = start + paragraph.text.len();
            assert_eq!(&joined[start..end], paragraph.text);
        }
        let positions: Vec<usize> = classified.paragraphs.iter().map(|p| p.char_position).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let classified = classify("");
        assert!(classified.paragraphs.is_empty());
        assert!(classified.sections.is_empty());

        let classified = classify("\n\n\n");
        assert!(classified.paragraphs.is_empty());
    }
}
