//! Text normalization shared by user input and vocabulary entries.

/// Lowercase, turn punctuation and underscores into spaces, and collapse
/// whitespace runs. `"Head-Ache!!"` becomes `"head ache"`.
pub fn normalize(text: &str) -> String {
    let spaced: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized form with all whitespace removed, so multi-word spellings
/// meet their single-word counterparts ("head ache" == "headache").
pub fn compact(text: &str) -> String {
    normalize(text).split_whitespace().collect()
}
