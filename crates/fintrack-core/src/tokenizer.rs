//! Free-text normalization shared by the predictor.

/// Lower-cases, trims and splits `text` on runs of whitespace.
/// Absent input yields no tokens.
pub fn tokenize(text: Option<&str>) -> Vec<String> {
    text.map(tokenize_str).unwrap_or_default()
}

pub fn tokenize_str(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
