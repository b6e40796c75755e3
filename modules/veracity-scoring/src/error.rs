use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to read model file {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model file: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("model shape mismatch: {idf} idf weights and {coefficients} coefficients for {vocabulary} terms")]
    ShapeMismatch {
        vocabulary: usize,
        idf: usize,
        coefficients: usize,
    },

    #[error("vocabulary index {index} out of range for {size} features")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("invalid ngram range ({0}, {1})")]
    NgramRange(usize, usize),
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
