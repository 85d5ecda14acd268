//! Text normalization applied before encoding.

use hybridsearch_config::EmbeddingConfig;

/// Normalizes text for the encoder.
///
/// Keeps ASCII word characters, whitespace and the configured code point
/// ranges, collapses whitespace runs to a single space, trims, then truncates
/// to `max_length` characters.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    max_length: usize,
    allowed_ranges: Vec<(u32, u32)>,
}

impl Preprocessor {
    pub fn new(max_length: usize, allowed_ranges: &[[u32; 2]]) -> Self {
        Self {
            max_length,
            allowed_ranges: allowed_ranges.iter().map(|[lo, hi]| (*lo, *hi)).collect(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(config.max_length, &config.allowed_ranges)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn is_allowed(&self, c: char) -> bool {
        c.is_ascii_alphanumeric()
            || c == '_'
            || c.is_whitespace()
            || self
                .allowed_ranges
                .iter()
                .any(|(lo, hi)| (*lo..=*hi).contains(&(c as u32)))
    }

    pub fn apply(&self, text: &str) -> String {
        let kept: String = text.chars().filter(|c| self.is_allowed(*c)).collect();
        let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
        let truncated: String = collapsed.chars().take(self.max_length).collect();
        truncated.trim_end().to_string()
    }
}
