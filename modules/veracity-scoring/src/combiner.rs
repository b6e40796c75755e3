use veracity_common::{CombinedVerdict, Label};

use crate::round2;

/// Below this similarity the web evidence is too thin to lean on.
pub const WEAK_EVIDENCE_THRESHOLD: f64 = 20.0;

/// Scores at or above this are `Real`.
const REAL_CUTOFF: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub ml: f64,
    pub web: f64,
}

impl Weights {
    /// Used in place of the caller's weights when evidence is weak.
    pub const WEAK_EVIDENCE: Weights = Weights { ml: 0.8, web: 0.2 };
}

impl Default for Weights {
    fn default() -> Self {
        Self { ml: 0.6, web: 0.4 }
    }
}

/// Blend classifier confidence with web similarity on a 0-100 scale where
/// 100 is maximally Real.
///
/// `confidence` is the classifier's confidence in `label`; a Fake at 85 maps
/// to 15 on the Real scale. Weak web evidence (< 20) shifts weight to the
/// classifier for this call only.
pub fn combine(label: Label, confidence: f64, web_similarity: f64, weights: Weights) -> CombinedVerdict {
    let ml_score = match label {
        Label::Real => confidence,
        Label::Fake => 100.0 - confidence,
    };

    let reliable = web_similarity >= WEAK_EVIDENCE_THRESHOLD;
    let effective = if reliable { weights } else { Weights::WEAK_EVIDENCE };

    let combined = ml_score * effective.ml + web_similarity * effective.web;

    // The label is decided before rounding; 49.998 reports as 50.0 but is Fake.
    CombinedVerdict {
        combined_score: round2(combined),
        final_label: if combined >= REAL_CUTOFF {
            Label::Real
        } else {
            Label::Fake
        },
        ml_score: round2(ml_score),
        web_verification_reliable: reliable,
    }
}
