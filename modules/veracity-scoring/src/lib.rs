pub mod analysis;
pub mod classifier;
pub mod clean;
pub mod combiner;
pub mod error;
pub mod similarity;
pub mod tokenize;

pub use analysis::analyze_content;
pub use classifier::{Classifier, LogisticModel};
pub use clean::clean_text;
pub use combiner::{combine, Weights, WEAK_EVIDENCE_THRESHOLD};
pub use error::{ScoringError, ScoringResult};
pub use similarity::similarity;

/// Round to two decimal places, the precision every reported score uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
