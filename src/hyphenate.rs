use std::collections::HashMap;

use hyphenation::{Hyphenator as _, Language, Load, Standard};
use thiserror::Error;

/// Proposes positions where a label may be broken across lines.
pub trait HyphenationOracle: Send + Sync {
    /// Byte offsets into `word`, each strictly inside it and on a char boundary.
    fn break_points(&self, word: &str) -> Vec<usize>;
}

#[derive(Debug, Error)]
pub enum HyphenationError {
    #[error("failed to load hyphenation dictionary: {0}")]
    Load(String),
}

/// Liang-pattern hyphenation from the embedded en-US dictionary.
pub struct DictionaryHyphenator {
    dictionary: Standard,
}

impl DictionaryHyphenator {
    pub fn english() -> Result<Self, HyphenationError> {
        let dictionary = Standard::from_embedded(Language::EnglishUS)
            .map_err(|err| HyphenationError::Load(err.to_string()))?;
        Ok(Self { dictionary })
    }
}

impl HyphenationOracle for DictionaryHyphenator {
    fn break_points(&self, word: &str) -> Vec<usize> {
        sanitize(word, self.dictionary.hyphenate(word).breaks)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHyphenation;

impl HyphenationOracle for NoHyphenation {
    fn break_points(&self, _word: &str) -> Vec<usize> {
        Vec::new()
    }
}

/// Break points looked up from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixedBreaks {
    table: HashMap<String, Vec<usize>>,
}

impl FixedBreaks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, word: impl Into<String>, breaks: Vec<usize>) -> Self {
        self.table.insert(word.into(), breaks);
        self
    }
}

impl HyphenationOracle for FixedBreaks {
    fn break_points(&self, word: &str) -> Vec<usize> {
        self.table
            .get(word)
            .map(|breaks| sanitize(word, breaks.clone()))
            .unwrap_or_default()
    }
}

fn sanitize(word: &str, mut breaks: Vec<usize>) -> Vec<usize> {
    breaks.retain(|&at| at > 0 && at < word.len() && word.is_char_boundary(at));
    breaks.sort_unstable();
    breaks.dedup();
    breaks
}

/// Default cap on hyphenation points per label, 256 line splits at most.
pub const DEFAULT_MAX_BREAK_POINTS: usize = 8;

/// Uncapped break counts above this are logged, since enumeration is exponential.
const LARGE_BREAK_COUNT: usize = 12;

/// Every way of laying `label` out in lines.
///
/// The first entry is the unbroken label. It is followed by one entry per
/// non-empty subset of `breaks`, ordered by the subset's bit mask where bit `k`
/// selects the `k`-th break. Lines ending at a break get a trailing hyphen.
/// Only the first `max_break_points` breaks are considered when set.
pub fn line_splits(label: &str, breaks: &[usize], max_break_points: Option<usize>) -> Vec<Vec<String>> {
    let usable = max_break_points.unwrap_or(breaks.len()).min(breaks.len()).min(u32::BITS as usize - 1);
    let breaks = &breaks[..usable];
    if usable > LARGE_BREAK_COUNT {
        tracing::warn!(label, breaks = usable, "enumerating {} line splits", 1u64 << usable);
    }
    let mut splits = vec![vec![label.to_string()]];
    for mask in 1u32..(1u32 << breaks.len()) {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut start = 0;
        for (bit, &at) in breaks.iter().enumerate() {
            current.push_str(&label[start..at]);
            start = at;
            if mask & (1 << bit) != 0 {
                current.push('-');
                lines.push(std::mem::take(&mut current));
            }
        }
        current.push_str(&label[start..]);
        lines.push(current);
        splits.push(lines);
    }
    splits
}
