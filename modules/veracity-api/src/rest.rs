use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use veracity_common::{ContentAnalysis, HybridPrediction, UrlPrediction};
use veracity_scoring::analyze_content;

use crate::pipeline::VerifyError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    #[serde(default)]
    news: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
pub struct TextPrediction {
    #[serde(flatten)]
    prediction: HybridPrediction,
    analysis: ContentAnalysis,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Hybrid Fake News Detection API is running" }))
}

pub async fn api_analyze_text(
    Json(body): Json<NewsRequest>,
) -> Result<Json<ContentAnalysis>, VerifyError> {
    let news = body.news.trim();
    if news.is_empty() {
        return Err(VerifyError::EmptyInput("text"));
    }
    Ok(Json(analyze_content(news)))
}

pub async fn api_predict_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewsRequest>,
) -> Result<Json<TextPrediction>, VerifyError> {
    let news = body.news.trim();
    let prediction = state.verifier.predict_hybrid(news).await?;
    Ok(Json(TextPrediction {
        prediction,
        analysis: analyze_content(news),
    }))
}

pub async fn api_predict_url(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<UrlPrediction>, VerifyError> {
    let prediction = state.verifier.predict_url(&body.url).await?;
    Ok(Json(prediction))
}
