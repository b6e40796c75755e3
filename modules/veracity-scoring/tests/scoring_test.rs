//! Scoring stages chained the way the verifier uses them.

use veracity_common::{EvidenceItem, Label};
use veracity_scoring::{
    clean_text, combine, round2, similarity, Classifier, LogisticModel, Weights,
};

const MODEL: &str = r#"{
    "vocabulary": {"miracle": 0, "cure": 1, "ministry": 2, "confirmed": 3},
    "idf": [2.0, 1.5, 1.3, 1.2],
    "coefficients": [4.0, 2.0, -2.5, -3.0],
    "intercept": 0.0,
    "stop_words": "english"
}"#;

fn evidence(bodies: &[&str]) -> Vec<EvidenceItem> {
    bodies
        .iter()
        .enumerate()
        .map(|(i, b)| EvidenceItem::new(format!("Result {i}"), *b, format!("https://news.example/{i}")))
        .collect()
}

#[test]
fn sourced_claim_with_matching_coverage_is_real() {
    let model = LogisticModel::from_json(MODEL).unwrap();
    let claim = clean_text("Health ministry confirmed the vaccine rollout. More at https://gov.example");

    let output = model.classify(&claim).unwrap();
    let web = round2(similarity(
        &claim,
        &evidence(&[
            "The health ministry confirmed the vaccine rollout on Monday",
            "Vaccine rollout confirmed by ministry officials",
        ]),
    ));
    let verdict = combine(output.label, output.confidence, web, Weights::default());

    assert_eq!(output.label, Label::Real);
    assert!(web >= 20.0, "similarity {web}");
    assert!(verdict.web_verification_reliable);
    assert_eq!(verdict.final_label, Label::Real);
}

#[test]
fn fabricated_claim_without_coverage_is_fake() {
    let model = LogisticModel::from_json(MODEL).unwrap();
    let claim = clean_text("Miracle cure!!! Doctors hate this miracle cure");

    let output = model.classify(&claim).unwrap();
    let web = round2(similarity(&claim, &evidence(&["Stock markets close higher"])));
    let verdict = combine(output.label, output.confidence, web, Weights::default());

    assert_eq!(output.label, Label::Fake);
    assert_eq!(web, 0.0);
    assert!(!verdict.web_verification_reliable);
    assert_eq!(verdict.final_label, Label::Fake);
}

#[test]
fn no_evidence_means_zero_similarity() {
    assert_eq!(similarity("Any claim at all", &[]), 0.0);
}
