// Verification pipeline: classifier and web evidence run side by side, then
// the combiner settles the verdict.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::{info, warn};
use veracity_archive::{ArticleExtractor, EvidenceFetcher, DEFAULT_MAX_RESULTS};
use veracity_common::{ExtractionResult, HybridPrediction, SourceLink, UrlPrediction};
use veracity_scoring::{analyze_content, clean_text, combine, round2, similarity, Classifier, Weights};

/// Article text returned to clients is cut to this many characters.
pub const NEWS_TEXT_PREVIEW_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("No {0} provided")]
    EmptyInput(&'static str),

    /// Extraction exhausted every strategy; carries the extractor's message.
    #[error("{0}")]
    Extraction(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl VerifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            VerifyError::EmptyInput(_) => StatusCode::BAD_REQUEST,
            VerifyError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            VerifyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Verification failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub struct Verifier {
    classifier: Arc<dyn Classifier>,
    evidence: EvidenceFetcher,
    extractor: ArticleExtractor,
    max_results: usize,
    weights: Weights,
}

impl Verifier {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        evidence: EvidenceFetcher,
        extractor: ArticleExtractor,
    ) -> Self {
        Self {
            classifier,
            evidence,
            extractor,
            max_results: DEFAULT_MAX_RESULTS,
            weights: Weights::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Classify `text` and corroborate it against the web.
    pub async fn predict_hybrid(&self, text: &str) -> Result<HybridPrediction, VerifyError> {
        if text.trim().is_empty() {
            return Err(VerifyError::EmptyInput("text"));
        }
        let cleaned = clean_text(text);

        let classifier = self.classifier.clone();
        let input = cleaned.clone();
        let (classified, report) = tokio::join!(
            tokio::task::spawn_blocking(move || classifier.classify(&input)),
            self.evidence.fetch_evidence(&cleaned, self.max_results),
        );
        let output = classified.map_err(anyhow::Error::from)??;

        let ml_confidence = round2(output.confidence);
        let web_similarity = round2(similarity(&cleaned, &report.articles));
        let verdict = combine(output.label, ml_confidence, web_similarity, self.weights);

        info!(
            ml_label = %output.label,
            ml_confidence,
            web_similarity,
            evidence = report.articles.len(),
            final_label = %verdict.final_label,
            combined_score = verdict.combined_score,
            "Hybrid prediction complete"
        );

        Ok(HybridPrediction {
            ml_label: output.label,
            ml_confidence,
            web_similarity,
            web_verification_status: report.status,
            final_label: verdict.final_label,
            combined_score: verdict.combined_score,
            sources: report.articles.iter().map(SourceLink::from).collect(),
        })
    }

    pub async fn verify_url(&self, url: &str) -> Result<ExtractionResult, VerifyError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(VerifyError::EmptyInput("URL"));
        }
        Ok(self.extractor.extract(url).await)
    }

    /// Extract the article at `url` and verify its text.
    pub async fn predict_url(&self, url: &str) -> Result<UrlPrediction, VerifyError> {
        let article = self.verify_url(url).await?;
        let text = article.text.trim();
        if text.is_empty() {
            let message = article.error.unwrap_or_else(|| {
                "Unable to extract content from URL. Site may have bot protection.".to_string()
            });
            return Err(VerifyError::Extraction(message));
        }

        let prediction = self.predict_hybrid(text).await?;

        Ok(UrlPrediction {
            prediction,
            headline: article.title,
            news_text: text.chars().take(NEWS_TEXT_PREVIEW_CHARS).collect(),
            analysis: analyze_content(text),
        })
    }
}
