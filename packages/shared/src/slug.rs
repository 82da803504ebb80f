//! URL-safe slug generation for heading and section ids.

use std::collections::HashSet;

/// Derive a URL-safe slug from heading text: lowercase, drop characters
/// outside word/whitespace/hyphen, collapse whitespace and hyphen runs to a
/// single `-`, trim leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if ch.is_alphanumeric() || ch == '_' {
            slug.push(ch);
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Allocates document-unique ids: a repeated slug gets a `-2`, `-3`, ...
/// suffix in document order.
#[derive(Debug, Default)]
pub struct SlugSet {
    used: HashSet<String>,
}

impl SlugSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text` and claim the result. Empty slugs are the caller's
    /// problem (use a positional fallback id before claiming).
    pub fn assign(&mut self, text: &str) -> String {
        self.claim(&slugify(text))
    }

    /// Claim an already-formed id, suffixing until unique within this set.
    pub fn claim(&mut self, candidate: &str) -> String {
        let mut slug = candidate.to_string();
        let mut n = 2;
        while !self.used.insert(slug.clone()) {
            slug = format!("{candidate}-{n}");
            n += 1;
        }
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("Tools & Technologies"), "tools-technologies");
        assert_eq!(slugify("  FAQ  "), "faq");
    }

    #[test]
    fn slugify_strips_punctuation_and_trims() {
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("- leading dash"), "leading-dash");
        assert_eq!(slugify("trailing dash -"), "trailing-dash");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_set_suffixes_collisions() {
        let mut slugs = SlugSet::new();
        assert_eq!(slugs.assign("Solution"), "solution");
        assert_eq!(slugs.assign("Solution"), "solution-2");
        assert_eq!(slugs.assign("Solution"), "solution-3");
        assert_eq!(slugs.assign("Conclusion"), "conclusion");
    }

    #[test]
    fn slug_set_claims_explicit_ids() {
        let mut slugs = SlugSet::new();
        assert_eq!(slugs.claim("overview"), "overview");
        assert_eq!(slugs.claim("overview"), "overview-2");
    }
}
