// Text classifier seam plus a logistic-regression implementation over a
// TF-IDF vectorizer exported to JSON.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;
use veracity_common::{ClassifierOutput, Label};

use crate::error::{ScoringError, ScoringResult};
use crate::round2;
use crate::tokenize::{ngrams, tokens, ENGLISH_STOP_WORDS};

/// Classifies already-cleaned text. Implementations are CPU-bound and are
/// called from the blocking pool.
pub trait Classifier: Send + Sync {
    fn classify(&self, cleaned: &str) -> anyhow::Result<ClassifierOutput>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StopWords {
    Named(String),
    List(Vec<String>),
}

/// On-disk model layout. `vocabulary` maps term to feature index; `idf` and
/// `coefficients` are indexed by feature.
#[derive(Debug, Deserialize)]
struct ModelFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    stop_words: Option<StopWords>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

/// Binary logistic regression; class 1 is `Fake`.
#[derive(Debug)]
pub struct LogisticModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coefficients: Vec<f64>,
    intercept: f64,
    ngram_range: (usize, usize),
    lowercase: bool,
    sublinear_tf: bool,
    stop_words: Option<HashSet<String>>,
}

impl LogisticModel {
    pub fn load(path: impl AsRef<Path>) -> ScoringResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScoringError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            features = model.idf.len(),
            "Classifier model loaded"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> ScoringResult<Self> {
        let file: ModelFile = serde_json::from_str(raw)?;

        let size = file.idf.len();
        if file.coefficients.len() != size || file.vocabulary.len() > size {
            return Err(ScoringError::ShapeMismatch {
                vocabulary: file.vocabulary.len(),
                idf: size,
                coefficients: file.coefficients.len(),
            });
        }
        if let Some(&index) = file.vocabulary.values().find(|&&i| i >= size) {
            return Err(ScoringError::IndexOutOfRange { index, size });
        }
        let (min_n, max_n) = file.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ScoringError::NgramRange(min_n, max_n));
        }

        let stop_words = file.stop_words.map(|sw| match sw {
            StopWords::Named(_) => ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            StopWords::List(words) => words.into_iter().collect(),
        });

        Ok(Self {
            vocabulary: file.vocabulary,
            idf: file.idf,
            coefficients: file.coefficients,
            intercept: file.intercept,
            ngram_range: file.ngram_range,
            lowercase: file.lowercase,
            sublinear_tf: file.sublinear_tf,
            stop_words,
        })
    }

    /// Sparse L2-normalized TF-IDF features as `(index, weight)`.
    fn features(&self, text: &str) -> Vec<(usize, f64)> {
        let mut words = tokens(text, self.lowercase);
        if let Some(stop) = &self.stop_words {
            words.retain(|w| !stop.contains(w));
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in ngrams(&words, self.ngram_range.0, self.ngram_range.1) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (index, tf * self.idf[index])
            })
            .collect();
        features.sort_by_key(|(index, _)| *index);

        let norm = features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            features.iter_mut().for_each(|(_, w)| *w /= norm);
        }
        features
    }

    /// P(Fake) for `text`.
    pub fn probability_fake(&self, text: &str) -> f64 {
        let decision = self.intercept
            + self
                .features(text)
                .iter()
                .map(|(index, w)| self.coefficients[*index] * w)
                .sum::<f64>();
        1.0 / (1.0 + (-decision).exp())
    }
}

impl Classifier for LogisticModel {
    fn classify(&self, cleaned: &str) -> anyhow::Result<ClassifierOutput> {
        let p_fake = self.probability_fake(cleaned);
        let (label, confidence) = if p_fake > 0.5 {
            (Label::Fake, p_fake * 100.0)
        } else {
            (Label::Real, (1.0 - p_fake) * 100.0)
        };
        Ok(ClassifierOutput {
            label,
            confidence: round2(confidence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "vocabulary": {"shocking": 0, "miracle": 1, "official": 2, "report": 3},
        "idf": [1.5, 2.0, 1.2, 1.1],
        "coefficients": [3.0, 4.0, -3.0, -2.5],
        "intercept": 0.1,
        "stop_words": "english"
    }"#;

    #[test]
    fn sensational_text_is_fake() {
        let model = LogisticModel::from_json(MODEL).unwrap();
        let out = model.classify("Shocking miracle cure").unwrap();
        assert_eq!(out.label, Label::Fake);
        assert!(out.confidence > 50.0 && out.confidence <= 100.0);
    }

    #[test]
    fn sourced_text_is_real() {
        let model = LogisticModel::from_json(MODEL).unwrap();
        let out = model.classify("The official report was published").unwrap();
        assert_eq!(out.label, Label::Real);
        assert!(out.confidence > 50.0);
    }

    #[test]
    fn unknown_words_fall_back_to_intercept() {
        let model = LogisticModel::from_json(MODEL).unwrap();
        let p = model.probability_fake("completely unrelated words");
        assert!((p - 1.0 / (1.0 + (-0.1f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn confidence_is_rounded() {
        let model = LogisticModel::from_json(MODEL).unwrap();
        let out = model.classify("shocking").unwrap();
        assert_eq!(out.confidence, round2(out.confidence));
    }

    #[test]
    fn bigram_vocabulary_matches() {
        let raw = r#"{
            "vocabulary": {"fake cure": 0},
            "idf": [1.0],
            "coefficients": [5.0],
            "intercept": -1.0,
            "ngram_range": [1, 2]
        }"#;
        let model = LogisticModel::from_json(raw).unwrap();
        assert_eq!(model.classify("A fake cure").unwrap().label, Label::Fake);
        assert_eq!(model.classify("A cure").unwrap().label, Label::Real);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let raw = r#"{"vocabulary": {"a": 0}, "idf": [1.0], "coefficients": [], "intercept": 0}"#;
        assert!(matches!(
            LogisticModel::from_json(raw),
            Err(ScoringError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let raw = r#"{"vocabulary": {"aa": 3}, "idf": [1.0], "coefficients": [1.0], "intercept": 0}"#;
        assert!(matches!(
            LogisticModel::from_json(raw),
            Err(ScoringError::IndexOutOfRange { index: 3, size: 1 })
        ));
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        assert!(matches!(
            LogisticModel::from_json("{not json"),
            Err(ScoringError::ModelFormat(_))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, MODEL).unwrap();
        assert!(LogisticModel::load(&path).is_ok());

        let missing = LogisticModel::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ScoringError::ModelRead { .. })));
    }
}
