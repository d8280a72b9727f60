// TF-IDF vectorizer over unigrams and bigrams.
//
// Fitting learns a size-capped vocabulary plus one IDF weight per term;
// transforming maps any document onto that fixed feature space. Terms the
// vocabulary has never seen contribute nothing.
//
// Weighting (smoothed IDF, L2-normalized rows):
//
//   idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//   w(t, d)   = count(t, d) * idf(t)
//   row(d)    = w(·, d) / ‖w(·, d)‖₂
//
// where n is the number of documents seen at fit time. The "+1" terms keep
// the IDF finite and strictly positive even for a term present in every
// document.

use std::collections::HashMap;

use tracing::info;

use super::sparse::{FeatureMatrix, SparseVector};
use crate::error::{ClusterError, Result};
use crate::text::normalizer::{is_word_char, stopwords};

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// TF-IDF vectorizer. Unfitted until `fit_transform` succeeds.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Keep at most this many terms (highest document frequency wins)
    pub max_features: usize,
    /// Inclusive n-gram lengths to extract, e.g. (1, 2) for words and pairs
    pub ngram_range: (usize, usize),
    fitted: Option<FittedVocabulary>,
}

#[derive(Debug, Clone)]
struct FittedVocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_range: (1, 2),
            fitted: None,
        }
    }
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            ..Self::default()
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Learned terms in feature-index order (ascending lexicographic).
    pub fn vocabulary(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|f| f.terms.as_slice())
    }

    /// IDF weight per feature index.
    pub fn idf(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.idf.as_slice())
    }

    /// Size of the fitted feature space (0 when unfitted).
    pub fn n_features(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.terms.len())
    }

    /// Feature index of a term, if it made it into the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.fitted.as_ref().and_then(|f| f.index.get(term).copied())
    }

    /// Learn the vocabulary and IDF weights from `corpus`, then return its
    /// TF-IDF matrix. Any previous fit is discarded.
    pub fn fit_transform<S: AsRef<str>>(&mut self, corpus: &[S]) -> Result<FeatureMatrix> {
        self.validate()?;
        self.fitted = None;

        let analyzed: Vec<Vec<String>> = corpus
            .iter()
            .map(|doc| analyze(doc.as_ref(), self.ngram_range))
            .collect();

        // Document frequency: each term counted at most once per document.
        let mut df: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen: Vec<&str> = terms.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            return Err(ClusterError::EmptyVocabulary);
        }

        let candidates = df.len();
        let mut ranked: Vec<(&str, usize)> = df.into_iter().collect();
        if ranked.len() > self.max_features {
            // Highest document frequency first; ties resolved alphabetically
            // so the cut is reproducible.
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            ranked.truncate(self.max_features);
        }
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n = corpus.len() as f64;
        let terms: Vec<String> = ranked.iter().map(|(t, _)| (*t).to_string()).collect();
        let idf: Vec<f64> = ranked
            .iter()
            .map(|(_, d)| ((1.0 + n) / (1.0 + *d as f64)).ln() + 1.0)
            .collect();
        let index: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        info!(
            documents = corpus.len(),
            candidates,
            vocabulary = terms.len(),
            "Fitted TF-IDF vocabulary"
        );

        let fitted = FittedVocabulary {
            terms,
            index,
            idf,
            ngram_range: self.ngram_range,
        };

        let rows = analyzed
            .iter()
            .map(|terms| fitted.weigh(terms))
            .collect::<Result<Vec<_>>>()?;
        let matrix = FeatureMatrix::from_rows(fitted.terms.len(), rows)?;

        self.fitted = Some(fitted);
        Ok(matrix)
    }

    /// Map documents onto the fitted vocabulary.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<FeatureMatrix> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(ClusterError::NotFitted("TfIdfVectorizer"))?;

        let rows = documents
            .iter()
            .map(|doc| fitted.weigh(&analyze(doc.as_ref(), fitted.ngram_range)))
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::from_rows(fitted.terms.len(), rows)
    }

    /// Transform a single document.
    pub fn transform_one(&self, document: &str) -> Result<SparseVector> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(ClusterError::NotFitted("TfIdfVectorizer"))?;
        fitted.weigh(&analyze(document, fitted.ngram_range))
    }

    fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(ClusterError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ClusterError::InvalidParameter(format!(
                "ngram_range ({lo}, {hi}) must satisfy 1 <= min <= max"
            )));
        }
        Ok(())
    }
}

impl FittedVocabulary {
    /// Count in-vocabulary terms, apply IDF, L2-normalize.
    fn weigh(&self, terms: &[String]) -> Result<SparseVector> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for term in terms {
            if let Some(&i) = self.index.get(term) {
                *counts.entry(i).or_insert(0) += 1;
            }
        }
        let entries = counts
            .into_iter()
            .map(|(i, tf)| (i, tf as f64 * self.idf[i]))
            .collect();
        let mut row = SparseVector::from_entries(self.terms.len(), entries)?;
        row.l2_normalize();
        Ok(row)
    }
}

/// Split a document into n-gram terms.
///
/// Tokens are lowercase maximal runs of word characters, at least two
/// characters long, with English stopwords removed. N-grams join adjacent
/// surviving tokens with a single space.
pub fn analyze(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let stopwords = stopwords();
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !is_word_char(c))
        .filter(|t| t.chars().count() >= 2 && !stopwords.contains(*t))
        .collect();

    let (lo, hi) = ngram_range;
    let mut terms = Vec::new();
    for n in lo..=hi {
        if n == 0 || n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_unigrams_and_bigrams() {
        let terms = analyze("Astronaut orbits planet", (1, 2));
        assert_eq!(
            terms,
            vec!["astronaut", "orbits", "planet", "astronaut orbits", "orbits planet"]
        );
    }

    #[test]
    fn test_analyze_drops_stopwords_and_single_chars() {
        let terms = analyze("the x galaxy", (1, 1));
        assert_eq!(terms, vec!["galaxy"]);
    }

    #[test]
    fn test_idf_formula() {
        let mut v = TfIdfVectorizer::new(100);
        v.ngram_range = (1, 1);
        v.fit_transform(&["galaxy rocket", "galaxy pasta"]).unwrap();
        let galaxy = v.term_index("galaxy").unwrap();
        let rocket = v.term_index("rocket").unwrap();
        let idf = v.idf().unwrap();
        // galaxy in both docs: ln(3/3) + 1
        assert!((idf[galaxy] - 1.0).abs() < 1e-12);
        // rocket in one doc: ln(3/2) + 1
        assert!((idf[rocket] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let mut v = TfIdfVectorizer::default();
        let m = v.fit_transform(&["rocket launch galaxy", "pasta sauce garlic"]).unwrap();
        for row in m.iter() {
            assert!((row.squared_norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vocabulary_cap_prefers_document_frequency_then_alphabet() {
        let mut v = TfIdfVectorizer::new(2);
        v.ngram_range = (1, 1);
        // zebra: df 2, apple: df 1, mango: df 1 → zebra kept, apple wins the tie
        v.fit_transform(&["zebra apple", "zebra mango"]).unwrap();
        assert_eq!(v.vocabulary().unwrap(), &["apple".to_string(), "zebra".to_string()]);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let v = TfIdfVectorizer::default();
        assert!(matches!(
            v.transform(&["anything"]),
            Err(ClusterError::NotFitted(_))
        ));
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let mut v = TfIdfVectorizer::default();
        v.fit_transform(&["rocket galaxy", "pasta garlic"]).unwrap();
        let row = v.transform_one("submarine torpedo").unwrap();
        assert!(row.is_zero());
    }

    #[test]
    fn test_empty_corpus_has_no_vocabulary() {
        let mut v = TfIdfVectorizer::default();
        assert!(matches!(
            v.fit_transform(&["the a", ""]),
            Err(ClusterError::EmptyVocabulary)
        ));
        assert!(!v.is_fitted());
    }
}
