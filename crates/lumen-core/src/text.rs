//! Character-safe string truncation utilities.
//!
//! Rust `&str[..n]` panics when `n` falls inside a multi-byte character.
//! The formatter caps item text by character count, so these helpers walk
//! char boundaries instead of byte offsets.

/// Longest prefix of `s` containing at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Clip `s` to `max_chars` characters, appending `"..."` when it was longer.
///
/// The ellipsis counts toward the budget: a 101-character string with a
/// 100-character budget comes back as 97 characters plus `"..."`.
#[must_use]
pub fn clip_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_owned();
    }
    let body = truncate_chars(s, max_chars.saturating_sub(3));
    format!("{body}...")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(clip_with_ellipsis("hello", 10), "hello");
    }

    #[test]
    fn exact_length_is_not_clipped() {
        let s = "a".repeat(100);
        assert_eq!(clip_with_ellipsis(&s, 100), s);
    }

    #[test]
    fn long_strings_clip_to_budget() {
        let s = "a".repeat(101);
        let clipped = clip_with_ellipsis(&s, 100);
        assert_eq!(clipped.chars().count(), 100);
        assert!(clipped.ends_with("..."));
        assert_eq!(&clipped[..97], &s[..97]);
    }

    #[test]
    fn multibyte_boundaries_are_respected() {
        // Each '—' is three bytes but one character.
        let s = "——————";
        assert_eq!(truncate_chars(s, 2), "——");
        assert_eq!(clip_with_ellipsis(s, 5), "——...");
    }
}
