// TF-IDF cosine similarity between a claim and evidence snippets.
//
// The vector space is fitted jointly over {claim, evidence bodies}: smoothed
// idf `ln((1 + n) / (1 + df)) + 1`, raw term counts, L2-normalized rows.

use std::collections::{BTreeMap, BTreeSet};

use veracity_common::EvidenceItem;

use crate::tokenize::content_tokens;

/// Only the claim's opening sentences are compared against snippets.
const CLAIM_SENTENCES: usize = 3;

/// Mean cosine similarity (0-100) between `claim` and the non-empty evidence
/// bodies. Degenerate input scores 0.
pub fn similarity(claim: &str, evidence: &[EvidenceItem]) -> f64 {
    if claim.trim().is_empty() || evidence.is_empty() {
        return 0.0;
    }

    let bodies: Vec<&str> = evidence
        .iter()
        .filter(|e| e.has_body())
        .map(|e| e.body.as_str())
        .collect();
    if bodies.is_empty() {
        return 0.0;
    }

    let claim = reduce_claim(claim);
    let documents: Vec<Vec<String>> = std::iter::once(claim.as_str())
        .chain(bodies.iter().copied())
        .map(content_tokens)
        .collect();

    if documents.iter().all(Vec::is_empty) {
        return 0.0;
    }

    let vectors = tfidf(&documents);
    let Some((claim_vec, evidence_vecs)) = vectors.split_first() else {
        return 0.0;
    };

    // Sorted before summing so the mean does not depend on evidence order.
    let mut cosines: Vec<f64> = evidence_vecs.iter().map(|v| dot(claim_vec, v)).collect();
    cosines.sort_by(f64::total_cmp);

    let mean = cosines.iter().sum::<f64>() / cosines.len() as f64;
    (mean * 100.0).clamp(0.0, 100.0)
}

/// First sentences of the claim, rejoined as `"s1. s2. s3."`. Claims with no
/// sentence content pass through unchanged.
pub fn reduce_claim(claim: &str) -> String {
    let sentences: Vec<&str> = claim
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(CLAIM_SENTENCES)
        .collect();

    if sentences.is_empty() {
        claim.to_string()
    } else {
        format!("{}.", sentences.join(". "))
    }
}

type SparseVec = BTreeMap<String, f64>;

fn tfidf(documents: &[Vec<String>]) -> Vec<SparseVec> {
    let n = documents.len() as f64;

    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        let unique: BTreeSet<&str> = doc.iter().map(String::as_str).collect();
        for term in unique {
            *df.entry(term).or_default() += 1;
        }
    }

    documents
        .iter()
        .map(|doc| {
            let mut row: SparseVec = BTreeMap::new();
            for term in doc {
                *row.entry(term.clone()).or_default() += 1.0;
            }
            for (term, weight) in row.iter_mut() {
                let df = df[term.as_str()] as f64;
                *weight *= ((1.0 + n) / (1.0 + df)).ln() + 1.0;
            }
            normalize(&mut row);
            row
        })
        .collect()
}

fn normalize(row: &mut SparseVec) {
    let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.values_mut().for_each(|w| *w /= norm);
    }
}

fn dot(a: &SparseVec, b: &SparseVec) -> f64 {
    a.iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(body: &str) -> EvidenceItem {
        EvidenceItem::new("title", body, "https://news.example/a")
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(similarity("Floods hit Assam", &[]), 0.0);
        assert_eq!(similarity("", &[item("Floods hit Assam")]), 0.0);
        assert_eq!(similarity("   ", &[item("Floods hit Assam")]), 0.0);
        assert_eq!(similarity("Floods hit Assam", &[item(""), item("  ")]), 0.0);
    }

    #[test]
    fn stop_word_only_documents_score_zero() {
        assert_eq!(similarity("it is what it is", &[item("and so on")]), 0.0);
    }

    #[test]
    fn identical_text_scores_near_hundred() {
        let text = "Heavy monsoon rain floods villages in Assam";
        let score = similarity(text, &[item(text)]);
        assert!((score - 100.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn unrelated_text_scores_zero() {
        let score = similarity(
            "Central bank raises interest rates",
            &[item("Cricket team wins championship final")],
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn related_text_scores_between() {
        let score = similarity(
            "Heavy monsoon rain floods villages in Assam",
            &[item("Assam villages struggle after floods"), item("Stock markets rally")],
        );
        assert!(score > 0.0 && score < 100.0, "got {score}");
    }

    #[test]
    fn empty_bodies_are_skipped_not_averaged() {
        let claim = "Heavy monsoon rain floods villages in Assam";
        let with_blank = similarity(claim, &[item(claim), item("")]);
        let without = similarity(claim, &[item(claim)]);
        assert_eq!(with_blank, without);
    }

    #[test]
    fn order_independent_and_deterministic() {
        let claim = "Government confirms new metro line opening next month";
        let a = item("Metro line opening confirmed by officials");
        let b = item("New line to open next month, government says");
        let c = item("Weather remains dry across the region");

        let forward = similarity(claim, &[a.clone(), b.clone(), c.clone()]);
        let reversed = similarity(claim, &[c.clone(), b.clone(), a.clone()]);
        let again = similarity(claim, &[a, b, c]);

        assert_eq!(forward, reversed);
        assert_eq!(forward, again);
        assert!(forward >= 0.0);
    }

    #[test]
    fn claim_is_reduced_to_three_sentences() {
        assert_eq!(
            reduce_claim("One! Two? Three. Four. Five"),
            "One. Two. Three."
        );
        assert_eq!(reduce_claim("No terminator"), "No terminator.");
        assert_eq!(reduce_claim("..."), "...");
    }
}
