// Unit tests for text normalization, lemmatization and TF-IDF.
//
// Exercises the public API only: TextNormalizer invariants, Lemmatizer
// on plot-summary vocabulary, and TfIdfVectorizer fit/transform agreement.

use plotline::text::lemmatizer::Lemmatizer;
use plotline::text::TextNormalizer;
use plotline::vectorize::TfIdfVectorizer;
use plotline::ClusterError;

// ============================================================
// TextNormalizer
// ============================================================

#[test]
fn normalize_drops_stopwords_and_lemmatizes() {
    let out = TextNormalizer::new().normalize_str("The Lion's Running!");
    let tokens: Vec<&str> = out.split(' ').collect();
    assert!(tokens.contains(&"lion"), "got {out:?}");
    assert!(tokens.contains(&"run"), "got {out:?}");
    assert!(!tokens.contains(&"the"), "got {out:?}");
}

#[test]
fn normalize_absent_input_is_empty() {
    assert_eq!(TextNormalizer::new().normalize(None), "");
    assert_eq!(TextNormalizer::new().normalize(Some("")), "");
}

#[test]
fn normalize_is_idempotent_on_plot_summaries() {
    let n = TextNormalizer::new();
    let plots = [
        "A detective investigating a string of murders discovers the killer is closer than he thought.",
        "Two estranged sisters reunite to save their family's struggling vineyard.",
        "When wolves attack the village, a young hunter vows to protect his brothers.",
        "Astronauts stranded on Mars improvise to survive until rescue arrives!",
    ];
    for plot in plots {
        let once = n.normalize_str(plot);
        assert_eq!(n.normalize_str(&once), once, "not idempotent for {plot:?}");
    }
}

#[test]
fn normalize_output_has_single_spaces() {
    let out = TextNormalizer::new().normalize_str("galaxy\n\n  rockets\t\tplanets");
    assert!(!out.contains("  "));
    assert!(!out.starts_with(' ') && !out.ends_with(' '));
}

// ============================================================
// Lemmatizer
// ============================================================

#[test]
fn lemmatizer_handles_plot_vocabulary() {
    let l = Lemmatizer::new();
    assert_eq!(l.lemmatize("wolves"), "wolf");
    assert_eq!(l.lemmatize("lions"), "lion");
    assert_eq!(l.lemmatize("running"), "run");
    assert_eq!(l.lemmatize("stories"), "story");
}

// ============================================================
// TfIdfVectorizer
// ============================================================

#[test]
fn transform_reproduces_fit_rows() {
    let corpus = [
        "astronaut orbit planet rocket",
        "chef pasta garlic sauce",
        "rocket galaxy astronaut",
    ];
    let mut v = TfIdfVectorizer::default();
    let fitted = v.fit_transform(&corpus).unwrap();
    let again = v.transform(&corpus).unwrap();
    assert_eq!(fitted, again);
}

#[test]
fn transform_before_fit_is_not_fitted() {
    let v = TfIdfVectorizer::default();
    assert!(matches!(v.transform(&["galaxy"]), Err(ClusterError::NotFitted(_))));
    assert!(matches!(v.transform_one("galaxy"), Err(ClusterError::NotFitted(_))));
}

#[test]
fn vocabulary_is_sorted_and_capped() {
    let mut v = TfIdfVectorizer::new(3);
    v.fit_transform(&["rocket galaxy orbit planet", "rocket galaxy", "rocket"])
        .unwrap();
    let vocab = v.vocabulary().unwrap();
    assert_eq!(vocab.len(), 3);
    let mut sorted = vocab.to_vec();
    sorted.sort();
    assert_eq!(vocab, sorted.as_slice());
    // rocket (df 3), galaxy and "rocket galaxy" (df 2) beat everything at df 1
    assert_eq!(vocab, ["galaxy", "rocket", "rocket galaxy"]);
}

#[test]
fn bigrams_join_adjacent_surviving_tokens() {
    let mut v = TfIdfVectorizer::default();
    v.fit_transform(&["space pirate captain"]).unwrap();
    assert!(v.term_index("space pirate").is_some());
    assert!(v.term_index("pirate captain").is_some());
    assert!(v.term_index("space captain").is_none());
}
