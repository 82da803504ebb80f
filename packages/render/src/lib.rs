//! Article rendering: canonical markdown in, sectioned HTML plus table of
//! contents and read time out.
//!
//! The body is split into `<section class="article-section">` blocks at
//! level-2 headings. Content ahead of the first heading becomes a
//! synthesized "Introduction" section unless the document already opens
//! with one. Image paragraphs become `<figure>` blocks with a placeholder
//! fallback wired to `onerror`.

mod html;
mod proxy;
mod toc;

pub use proxy::{ImageUrlRewriter, NoProxy, StorageProxy, placeholder_url};

use pressroom_shared::{ArticleMeta, RenderConfig, SlugSet, TocEntry};
use tracing::instrument;

// ---------------------------------------------------------------------------
// Output type
// ---------------------------------------------------------------------------

/// Rendered body plus the reading aids derived alongside it.
#[derive(Debug, Clone)]
pub struct RenderedArticle {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub read_time: String,
    pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render canonical markdown to publishable HTML.
///
/// `word_count` is the caller's count over the source text; the read-time
/// estimate and the returned count both come from it.
#[instrument(skip_all, fields(words = word_count))]
pub fn render(
    markdown: &str,
    meta: &ArticleMeta,
    word_count: usize,
    rewriter: &dyn ImageUrlRewriter,
    config: &RenderConfig,
) -> RenderedArticle {
    let has_explicit_intro = toc::has_intro_heading(markdown);
    let headings = toc::collect_headings(markdown);

    let body = html::markdown_to_html(markdown);
    let body = html::strip_stray_hashes(&body);
    let body = html::rewrite_figures(&body, rewriter, config);

    let mut slugs = SlugSet::new();
    let split = html::split_sections(&body, has_explicit_intro, &mut slugs);

    // Level-2 entries take their section's id so TOC anchors always land.
    let mut entries = Vec::with_capacity(headings.len() + 1);
    if let Some(id) = split.intro.as_ref().and_then(|intro| intro.id.clone()) {
        entries.push(TocEntry::new(id, "Introduction"));
    }
    let mut section_ids = split.sections.iter().map(|section| section.id.clone());
    for heading in &headings {
        if heading.level == 2 {
            if let Some(id) = section_ids.next() {
                entries.push(TocEntry::new(id, heading.title.clone()));
            }
        } else {
            entries.push(TocEntry::new(slugs.assign(&heading.title), heading.title.clone()));
        }
    }

    RenderedArticle {
        html: assemble(header_html(meta), &split),
        toc: entries,
        read_time: read_time(word_count, config.words_per_minute),
        word_count,
    }
}

/// `ceil(words / wpm)` with a one-minute floor.
pub fn read_time(word_count: usize, words_per_minute: usize) -> String {
    let minutes = word_count.div_ceil(words_per_minute.max(1)).max(1);
    format!("{minutes} min read")
}

/// Wrap a rendered fragment in a minimal complete HTML document.
pub fn standalone_page(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<main class=\"article-page\">\n{}</main>\n\
         </body>\n</html>\n",
        html::escape_html(title),
        fragment
    )
}

fn header_html(meta: &ArticleMeta) -> Option<String> {
    let title = meta.title.as_deref()?;
    let mut out = format!(
        "<header class=\"article-header\"><h1>{}</h1>",
        html::escape_html(title)
    );
    let byline: Vec<String> = [meta.author.as_deref(), meta.category.as_deref()]
        .into_iter()
        .flatten()
        .map(html::escape_html)
        .collect();
    if !byline.is_empty() {
        out.push_str(&format!("<p class=\"article-byline\">{}</p>", byline.join(" · ")));
    }
    if let Some(excerpt) = meta.excerpt.as_deref() {
        out.push_str(&format!(
            "<p class=\"article-excerpt\">{}</p>",
            html::escape_html(excerpt)
        ));
    }
    out.push_str("</header>");
    Some(out)
}

fn assemble(header: Option<String>, split: &html::SectionSplit) -> String {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str(&header);
        out.push('\n');
    }
    if let Some(intro) = &split.intro {
        match &intro.id {
            Some(id) => {
                out.push_str(&format!(
                    "<section id=\"{id}\" class=\"article-section\">\n{}\n</section>\n",
                    intro.html
                ));
            }
            // The document supplies its own introduction heading further
            // down; leave the lead content unlabeled.
            None => {
                out.push_str(&intro.html);
                out.push('\n');
            }
        }
    }
    for section in &split.sections {
        out.push_str(&format!(
            "<section id=\"{}\" class=\"article-section\">\n{}\n</section>\n",
            section.id, section.html
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ArticleMeta {
        ArticleMeta::default()
    }

    #[test]
    fn read_time_has_a_floor_and_rounds_up() {
        assert_eq!(read_time(0, 200), "1 min read");
        assert_eq!(read_time(200, 200), "1 min read");
        assert_eq!(read_time(250, 200), "2 min read");
        assert_eq!(read_time(1000, 200), "5 min read");
    }

    #[test]
    fn sections_and_toc_share_ids() {
        let md = "## Introduction\n\nHello world.\n\n## Conclusion\n\nGoodbye.\n";
        let article = render(md, &meta(), 4, &NoProxy, &RenderConfig::default());

        assert!(article.html.contains("<section id=\"introduction\" class=\"article-section\">"));
        assert!(article.html.contains("<section id=\"conclusion\" class=\"article-section\">"));
        assert_eq!(article.toc.len(), 2);
        assert_eq!(article.toc[0].id, "introduction");
        assert_eq!(article.toc[0].title, "Introduction");
        assert_eq!(article.toc[1].id, "conclusion");
        assert_eq!(article.toc[1].title, "Conclusion");
    }

    #[test]
    fn lead_content_gets_a_synthesized_introduction() {
        let md = "Opening words here.\n\n## Details\n\nStuff.\n";
        let article = render(md, &meta(), 6, &NoProxy, &RenderConfig::default());

        assert!(article.html.contains("<section id=\"introduction\" class=\"article-section\">"));
        assert!(article.html.contains("Opening words here."));
        assert_eq!(article.toc[0].title, "Introduction");
        assert_eq!(article.toc[1].id, "details");
    }

    #[test]
    fn explicit_intro_heading_suppresses_the_synthetic_one() {
        let md = "Unlabeled lead.\n\n## Overview\n\nbody\n";
        let article = render(md, &meta(), 4, &NoProxy, &RenderConfig::default());

        // Lead passes through outside any section wrapper.
        assert!(article.html.starts_with("<p>Unlabeled lead.</p>"));
        assert_eq!(article.toc.len(), 1);
        assert_eq!(article.toc[0].id, "overview");
    }

    #[test]
    fn duplicate_section_titles_stay_unique_in_the_toc() {
        let md = "## Solution\n\na\n\n## Solution\n\nb\n";
        let article = render(md, &meta(), 2, &NoProxy, &RenderConfig::default());
        let ids: Vec<&str> = article.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["solution", "solution-2"]);
    }

    #[test]
    fn subheadings_join_the_toc_without_becoming_sections() {
        let md = "## Methods\n\nbody\n\n### Sampling\n\nmore\n";
        let article = render(md, &meta(), 4, &NoProxy, &RenderConfig::default());

        assert_eq!(article.toc.len(), 2);
        assert_eq!(article.toc[1].id, "sampling");
        assert_eq!(article.toc[1].title, "Sampling");
        assert!(!article.html.contains("<section id=\"sampling\""));
        assert!(article.html.contains("<h3>Sampling</h3>"));
    }

    #[test]
    fn header_block_renders_title_byline_and_excerpt() {
        let meta = ArticleMeta {
            title: Some("Shipping Faster".into()),
            author: Some("Ana Ruiz".into()),
            category: Some("Engineering".into()),
            excerpt: Some("How the team cut cycle time.".into()),
        };
        let article = render("## Start\n\nbody\n", &meta, 2, &NoProxy, &RenderConfig::default());

        assert!(
            article.html.starts_with("<header class=\"article-header\"><h1>Shipping Faster</h1>")
        );
        assert!(article.html.contains("<p class=\"article-byline\">Ana Ruiz · Engineering</p>"));
        assert!(
            article.html.contains("<p class=\"article-excerpt\">How the team cut cycle time.</p>")
        );
    }

    #[test]
    fn figures_render_inside_their_section() {
        let md =
            "## Results\n\n![Revenue chart](https://img.example/a.png)\n\n*Quarterly revenue*\n";
        let article = render(md, &meta(), 3, &NoProxy, &RenderConfig::default());

        assert!(article.html.contains("<figure class=\"article-figure\">"));
        assert!(article.html.contains("<figcaption>Quarterly revenue</figcaption>"));
        let section_start = article.html.find("<section id=\"results\"").unwrap();
        let figure_start = article.html.find("<figure").unwrap();
        assert!(figure_start > section_start);
    }

    #[test]
    fn word_count_flows_through_to_read_time() {
        let article = render("## A\n\nb\n", &meta(), 450, &NoProxy, &RenderConfig::default());
        assert_eq!(article.word_count, 450);
        assert_eq!(article.read_time, "3 min read");
    }

    #[test]
    fn standalone_page_wraps_and_escapes() {
        let page = standalone_page("Q&A Session", "<p>body</p>\n");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Q&amp;A Session</title>"));
        assert!(page.contains("<main class=\"article-page\">\n<p>body</p>\n</main>"));
        assert!(page.ends_with("</html>\n"));
    }
}
