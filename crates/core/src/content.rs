//! Content naming and tag storage conventions.
//!
//! Tags travel over the wire as a list but are stored as a single
//! comma-joined string; slugs are derived from titles.

/// Separator used when tags are stored as a single column.
pub const TAG_SEPARATOR: &str = ",";

/// Derive a URL-friendly slug from a content title.
///
/// Convention: lowercase, every space replaced with a hyphen. No other
/// characters are touched and no uniqueness check is performed.
///
/// # Examples
///
/// ```
/// use quill_core::content::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust  Notes"), "rust--notes");
/// ```
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Join a list of tags into their stored form.
///
/// ```
/// use quill_core::content::join_tags;
///
/// assert_eq!(join_tags(&["rust".to_string(), "web".to_string()]), "rust,web");
/// ```
pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}

/// Split a stored tag string back into a list.
///
/// An empty stored string yields an empty list rather than `[""]`.
pub fn split_tags(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored.split(TAG_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(slugify("My First Post"), "my-first-post");
    }

    #[test]
    fn slug_keeps_punctuation() {
        assert_eq!(slugify("What's New?"), "what's-new?");
    }

    #[test]
    fn slug_is_not_unique() {
        assert_eq!(slugify("Same Title"), slugify("same title"));
    }

    #[test]
    fn tags_join_and_split() {
        let stored = join_tags(&["a", "b", "c"]);
        assert_eq!(stored, "a,b,c");
        assert_eq!(split_tags(&stored), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_stored_tags_yield_empty_list() {
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn split_does_not_trim() {
        assert_eq!(split_tags("a, b"), vec!["a", " b"]);
    }
}
