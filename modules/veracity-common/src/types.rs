use serde::{Deserialize, Serialize};

// --- Verdict labels ---

/// Binary verdict. Serialized as `"Real"` / `"Fake"` to match API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Real,
    Fake,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Real => write!(f, "Real"),
            Label::Fake => write!(f, "Fake"),
        }
    }
}

// --- Evidence ---

/// A single web search hit used to corroborate a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub body: String,
    pub link: String,
}

impl EvidenceItem {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            link: link.into(),
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebStatus {
    Success,
    Unavailable,
}

/// Outcome of an evidence lookup. Provider failures surface as
/// `Unavailable` with no articles, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceReport {
    pub status: WebStatus,
    pub articles: Vec<EvidenceItem>,
}

impl EvidenceReport {
    pub fn success(articles: Vec<EvidenceItem>) -> Self {
        Self {
            status: WebStatus::Success,
            articles,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: WebStatus::Unavailable,
            articles: Vec::new(),
        }
    }
}

// --- Extraction ---

/// Which link of the extraction chain produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Readability,
    Html,
    Proxy,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Readability => "readability",
            Strategy::Html => "html",
            Strategy::Proxy => "proxy",
        }
    }
}

/// Best-effort article content pulled from a URL.
///
/// Non-empty `text` means success no matter which strategy produced it.
/// Empty `text` with `error` set means the whole chain failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
}

impl ExtractionResult {
    pub fn extracted(title: impl Into<String>, text: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            error: None,
            strategy: Some(strategy),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            error: Some(error.into()),
            strategy: None,
        }
    }

    pub fn is_success(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

// --- Scoring ---

/// Classifier prediction. `confidence` (0-100) is the confidence in
/// `label`, not the probability of `Real`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub label: Label,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedVerdict {
    /// 100 = maximally Real, 0 = maximally Fake.
    pub combined_score: f64,
    pub final_label: Label,
    /// Classifier output normalized onto the Real scale.
    pub ml_score: f64,
    pub web_verification_reliable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    pub link: String,
}

impl From<&EvidenceItem> for SourceLink {
    fn from(item: &EvidenceItem) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
        }
    }
}

/// Full output of a text verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridPrediction {
    pub ml_label: Label,
    pub ml_confidence: f64,
    pub web_similarity: f64,
    pub web_verification_status: WebStatus,
    pub final_label: Label,
    pub combined_score: f64,
    pub sources: Vec<SourceLink>,
}

// --- Content analysis ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub suspicious_keywords: Vec<String>,
    pub trust_keywords: Vec<String>,
    pub sentiment: Sentiment,
    pub red_flags: Vec<String>,
}

/// Verification of a URL-origin claim: the text prediction plus what was
/// extracted from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlPrediction {
    #[serde(flatten)]
    pub prediction: HybridPrediction,
    pub headline: String,
    pub news_text: String,
    pub analysis: ContentAnalysis,
}
