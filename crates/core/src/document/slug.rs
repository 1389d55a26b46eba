/// Slug derivation for documents that need a unique, URL-safe handle.

pub const MAX_SLUG_LEN: usize = 96;

/// Derive a slug from a title: lowercase, whitespace runs become `-`,
/// anything outside `[a-z0-9-]` is dropped, capped at 96 characters.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }

    // Only ASCII survives the filter, so byte truncation is char-safe.
    slug.truncate(MAX_SLUG_LEN);
    slug
}
