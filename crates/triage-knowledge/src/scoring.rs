//! Similarity scores on a 0-100 scale.
//!
//! Both scores use normalized Damerau-Levenshtein similarity, so a
//! transposed pair of letters ("pian") costs one edit.

/// Whole-string similarity.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(a, b) * 100.0
}

/// Best similarity of `needle` against any window of `haystack` whose
/// length is within one character of the needle's.
///
/// Returns 0 when either side is empty.
pub fn partial_ratio(needle: &str, haystack: &str) -> f64 {
    let needle_len = needle.chars().count();
    let hay: Vec<char> = haystack.chars().collect();
    if needle_len == 0 || hay.is_empty() {
        return 0.0;
    }

    let max_width = (needle_len + 1).min(hay.len());
    let min_width = needle_len.saturating_sub(1).clamp(1, max_width);

    let mut best: f64 = 0.0;
    for width in min_width..=max_width {
        for window in hay.windows(width) {
            let candidate: String = window.iter().collect();
            let similarity = strsim::normalized_damerau_levenshtein(needle, &candidate);
            if similarity > best {
                best = similarity;
                if best >= 1.0 {
                    return 100.0;
                }
            }
        }
    }
    best * 100.0
}
