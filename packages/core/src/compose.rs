//! Weave placed figures back into the paragraph stream as markdown.
//!
//! Each placed image is emitted immediately before the paragraph whose span
//! covers its insertion point. Images that never received a point are
//! gathered under a trailing heading so nothing extracted is lost.

use std::collections::VecDeque;

use tracing::instrument;

use pressroom_shared::{ExtractedImage, Paragraph};

const ADDITIONAL_FIGURES_HEADING: &str = "## Additional Figures";

/// Rebuild the article markdown with figures interleaved at their insertion
/// points. `images` must already be sorted by insertion point.
#[instrument(skip_all, fields(paragraphs = paragraphs.len(), images = images.len()))]
pub fn compose(paragraphs: &[Paragraph], images: &[ExtractedImage]) -> String {
    let mut placed: VecDeque<&ExtractedImage> = images
        .iter()
        .filter(|image| image.insertion_point.is_some())
        .collect();
    let unplaced: Vec<&ExtractedImage> = images
        .iter()
        .filter(|image| image.insertion_point.is_none())
        .collect();

    let mut out = String::new();
    let mut cursor = 0usize;
    for paragraph in paragraphs {
        let upper = paragraph.char_position + paragraph.text.len() + 2;
        while let Some(front) = placed.front() {
            match front.insertion_point {
                Some(point) if point >= cursor && point < upper => {
                    push_figure(&mut out, front);
                    placed.pop_front();
                }
                _ => break,
            }
        }
        out.push_str(&paragraph.text);
        out.push_str("\n\n");
        cursor = upper;
    }

    // Points past the last paragraph still land in the document.
    while let Some(front) = placed.pop_front() {
        push_figure(&mut out, front);
    }

    if !unplaced.is_empty() {
        out.push_str(ADDITIONAL_FIGURES_HEADING);
        out.push_str("\n\n");
        for image in unplaced {
            push_figure(&mut out, image);
        }
    }

    let mut composed = out.trim_end().to_string();
    composed.push('\n');
    composed
}

fn push_figure(out: &mut String, image: &ExtractedImage) {
    let alt = if image.alt_text.trim().is_empty() {
        image.caption.as_str()
    } else {
        image.alt_text.as_str()
    };
    out.push_str(&format!("![{alt}]({})\n\n", image.src));
    let caption = image.caption.trim();
    if !caption.is_empty() {
        out.push_str(&format!("*{caption}*\n\n"));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(index: usize, text: &str, char_position: usize) -> Paragraph {
        Paragraph {
            index,
            text: text.to_string(),
            is_heading: false,
            is_list: false,
            importance: 5,
            char_position,
        }
    }

    fn placed(src: &str, caption: &str, point: usize) -> ExtractedImage {
        let mut image = ExtractedImage::new(src, "");
        image.caption = caption.to_string();
        image.insertion_point = Some(point);
        image
    }

    #[test]
    fn figures_are_inserted_before_their_paragraph() {
        let paragraphs = vec![
            paragraph(0, "Alpha.", 0),
            paragraph(1, "Beta.", 8),
            paragraph(2, "Gamma.", 15),
        ];
        let images = vec![placed("https://i/a.png", "Chart", 8)];

        let composed = compose(&paragraphs, &images);
        assert_eq!(
            composed,
            "Alpha.\n\n![Chart](https://i/a.png)\n\n*Chart*\n\nBeta.\n\nGamma.\n"
        );
    }

    #[test]
    fn unplaced_figures_collect_under_a_trailing_heading() {
        let paragraphs = vec![paragraph(0, "Only body.", 0)];
        let mut image = ExtractedImage::new("https://i/a.png", "diagram");
        image.caption = "Pipeline diagram".to_string();

        let composed = compose(&paragraphs, &[image]);
        assert!(composed.contains("## Additional Figures"));
        assert!(composed.ends_with(
            "## Additional Figures\n\n![diagram](https://i/a.png)\n\n*Pipeline diagram*\n"
        ));
    }

    #[test]
    fn points_past_the_last_paragraph_still_append() {
        let paragraphs = vec![paragraph(0, "Body.", 0)];
        let images = vec![placed("https://i/a.png", "Tail", 4000)];

        let composed = compose(&paragraphs, &images);
        assert_eq!(composed, "Body.\n\n![Tail](https://i/a.png)\n\n*Tail*\n");
        assert!(!composed.contains("Additional Figures"));
    }

    #[test]
    fn alt_text_wins_over_caption_in_the_image_token() {
        let paragraphs = vec![paragraph(0, "Body.", 0)];
        let mut image = placed("https://i/a.png", "Quarterly revenue", 0);
        image.alt_text = "Revenue chart".to_string();

        let composed = compose(&paragraphs, &[image]);
        assert!(composed.starts_with(
            "![Revenue chart](https://i/a.png)\n\n*Quarterly revenue*\n\nBody.\n"
        ));
    }

    #[test]
    fn captionless_figures_omit_the_emphasis_line() {
        let paragraphs = vec![paragraph(0, "Body.", 0)];
        let mut image = ExtractedImage::new("https://i/a.png", "icon");
        image.caption = String::new();
        image.insertion_point = Some(0);

        let composed = compose(&paragraphs, &[image]);
        assert_eq!(composed, "![icon](https://i/a.png)\n\nBody.\n");
    }

    #[test]
    fn empty_inputs_compose_to_a_bare_newline_document() {
        assert_eq!(compose(&[], &[]), "\n");
    }
}
