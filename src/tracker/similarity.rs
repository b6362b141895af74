//! Normalized edit-distance scoring over recognized text.
//!
//! Similarity is `1 - levenshtein(a, b) / max(len(a), len(b))` computed on a
//! normalized form of both strings, counting logical characters rather than
//! bytes so multi-byte scripts are scored correctly. This runs for every
//! candidate pair on every frame, so callers that hold a usable floor should
//! go through [`char_similarity_with_floor`], which skips the DP entirely
//! when the length difference alone settles the outcome.

/// Normalize text for comparison and cache keying: trim, drop control and
/// replacement characters, collapse internal whitespace runs to a single
/// space, and case-fold.
pub fn normalize(text: &str) -> String {
    // Whitespace control characters (tab, newline) must survive this pass so
    // the whitespace collapse below sees them as separators.
    let cleaned: String = text
        .chars()
        .filter(|c| (!c.is_control() || c.is_whitespace()) && *c != '\u{FFFD}')
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalized form as logical characters, ready for [`char_similarity`].
pub fn normalized_chars(text: &str) -> Vec<char> {
    normalize(text).chars().collect()
}

/// Whether a detection's text is worth tracking at all: non-empty after
/// normalization and containing at least one alphanumeric character.
/// Punctuation-only fragments are recognition noise.
pub fn is_translatable(text: &str) -> bool {
    normalize(text).chars().any(|c| c.is_alphanumeric())
}

/// Similarity in [0, 1] between two raw strings. Both are normalized first.
/// Empty-vs-empty is 1.0; empty-vs-non-empty is 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    char_similarity(&normalized_chars(a), &normalized_chars(b))
}

/// Similarity over already-normalized character sequences.
pub fn char_similarity(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Like [`char_similarity`], but returns 0.0 without running the edit-distance
/// DP when the length difference alone bounds similarity below `floor`.
pub fn char_similarity_with_floor(a: &[char], b: &[char], floor: f64) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    // Edit distance is at least the length difference.
    let diff = a.len().abs_diff(b.len());
    let upper_bound = 1.0 - diff as f64 / max_len as f64;
    if upper_bound < floor {
        return 0.0;
    }
    char_similarity(a, b)
}

/// Two-row Levenshtein distance over logical characters.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello   World "), "hello world");
        assert_eq!(normalize("Tab\there"), "tab here");
        assert_eq!(normalize("line\nbreak"), "line break");
        assert_eq!(normalize("mixed \t\n run"), "mixed run");
        assert_eq!(normalize("bad\u{FFFD}char"), "badchar");
        assert_eq!(normalize("bell\u{7}here"), "bellhere");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity("Menu", "menu"), 1.0);
        assert_eq!(similarity("メニュー", "メニュー"), 1.0);
    }

    #[test]
    fn test_empty_cases() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("   ", "\t"), 1.0);
        assert_eq!(similarity("", "text"), 0.0);
        assert_eq!(similarity("text", ""), 0.0);
    }

    #[test]
    fn test_multibyte_counts_characters() {
        // One substituted character out of four, regardless of byte width.
        let sim = similarity("メニュー", "メニaー");
        assert!((sim - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_partial_similarity() {
        // "exit" vs "exist": one insertion over max length 5.
        let sim = similarity("exit", "exist");
        assert!((sim - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_floor_early_exit() {
        let a: Vec<char> = "ab".chars().collect();
        let b: Vec<char> = "abcdefghij".chars().collect();
        // Length bound: 1 - 8/10 = 0.2, below floor.
        assert_eq!(char_similarity_with_floor(&a, &b, 0.5), 0.0);
        // With a permissive floor the true value comes through.
        assert!(char_similarity_with_floor(&a, &b, 0.1) > 0.0);
    }

    #[test]
    fn test_is_translatable() {
        assert!(is_translatable("Exit"));
        assert!(is_translatable("メニュー"));
        assert!(!is_translatable("..."));
        assert!(!is_translatable("!?"));
        assert!(!is_translatable("   "));
        assert!(!is_translatable(""));
    }
}
