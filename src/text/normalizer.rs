// Text normalization — raw plot summary → clean token string.
//
// lowercase → strip punctuation → split on whitespace → drop stopwords →
// lemmatize → rejoin with single spaces.
//
// The stopword set and lemmatizer are process-wide read-only resources,
// built lazily on first use and shared by every normalizer.

use std::collections::HashSet;
use std::sync::LazyLock;

use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::lemmatizer::Lemmatizer;

static STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
    debug!(count = words.len(), "Loaded English stopword set");
    words
});

static LEMMATIZER: LazyLock<Lemmatizer> = LazyLock::new(Lemmatizer::new);

/// The fixed English stopword set shared by normalization and vectorization.
pub fn stopwords() -> &'static HashSet<String> {
    &STOPWORDS
}

/// A word character: Unicode alphanumeric or underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Stateless text normalizer. Cheap to construct; all data is shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize an optional text value. Missing input yields an empty string.
    pub fn normalize(&self, text: Option<&str>) -> String {
        match text {
            Some(text) => self.normalize_str(text),
            None => String::new(),
        }
    }

    /// Normalize a plot summary.
    ///
    /// `normalize_str("The Lion's Running!")` → `"lion run"`.
    pub fn normalize_str(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|&c| is_word_char(c) || c.is_whitespace())
            .collect();

        let stopwords = stopwords();
        let tokens: Vec<String> = stripped
            .split_whitespace()
            .filter(|token| !stopwords.contains(*token))
            .map(|token| LEMMATIZER.lemmatize(token))
            // A lemma can itself be a stopword ("doing" → "do"); dropping it
            // here keeps normalize(normalize(x)) == normalize(x).
            .filter(|lemma| !lemma.is_empty() && !stopwords.contains(lemma))
            .collect();

        tokens.join(" ")
    }
}
