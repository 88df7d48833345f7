use unicode_normalization::UnicodeNormalization;

/// Slug for events whose name is missing entirely.
pub const FALLBACK_SLUG: &str = "evento-sem-nome";

/// Derive the stable, URL-safe identifier for an event name.
///
/// Pure function of the name alone: the same name yields the same slug in
/// every session and page variant, which is what lets favorites, deep links
/// and related-event lookups all join on it. Lower-cases, decomposes to NFD
/// and drops combining marks, keeps only ASCII letters, digits, spaces and
/// hyphens, then collapses each whitespace run into a single hyphen.
pub fn slugify(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    trimmed.split_whitespace().collect::<Vec<_>>().join("-")
}

// Combining diacritical marks; everything Portuguese sheet names produce
// under NFD lands in this block.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
