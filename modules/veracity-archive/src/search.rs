use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::info;
use url::Url;
use veracity_common::EvidenceItem;

/// Placeholder for results the engine returned without a title.
pub const NO_TITLE: &str = "No title";

/// Text web search. Implementations return at most `max_results` items in
/// engine rank order.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<EvidenceItem>>;
}

// --- DuckDuckGo (HTML endpoint, no key) ---

const DDG_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result").expect("valid selector"));
static RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid selector"));
static RESULT_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").expect("valid selector"));

pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
    endpoint: String,
    region: String,
}

impl DuckDuckGoSearcher {
    pub fn new(region: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36")
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: DDG_ENDPOINT.to_string(),
            region: region.to_string(),
        }
    }

    /// Point at a different HTML endpoint (mirrors, local fixtures).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl WebSearcher for DuckDuckGoSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<EvidenceItem>> {
        info!(query, max_results, region = %self.region, "DuckDuckGo search");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("kl", self.region.as_str())])
            .send()
            .await
            .context("DuckDuckGo request failed")?
            .error_for_status()
            .context("DuckDuckGo returned an error status")?;

        let html = resp
            .text()
            .await
            .context("Failed to read DuckDuckGo response")?;

        let results = parse_ddg_results(&html, max_results);
        info!(query, count = results.len(), "DuckDuckGo search complete");
        Ok(results)
    }
}

/// Parse the DuckDuckGo HTML results page.
pub fn parse_ddg_results(html: &str, max_results: usize) -> Vec<EvidenceItem> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT)
        .filter_map(|result| {
            let anchor = result.select(&RESULT_LINK).next()?;
            let href = anchor.value().attr("href")?;
            let link = decode_ddg_link(href)?;

            let title = collapse(&anchor.text().collect::<String>());
            let body = result
                .select(&RESULT_SNIPPET)
                .next()
                .map(|s| collapse(&s.text().collect::<String>()))
                .unwrap_or_default();

            Some(EvidenceItem::new(
                if title.is_empty() { NO_TITLE.to_string() } else { title },
                body,
                link,
            ))
        })
        .take(max_results)
        .collect()
}

/// Result links go through a `/l/?uddg=<target>` redirect; unwrap it.
/// Ads and anything else without a usable http(s) target are skipped.
fn decode_ddg_link(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;

    let target = match url.query_pairs().find(|(k, _)| k == "uddg") {
        Some((_, v)) => Url::parse(&v).ok()?,
        None => url,
    };

    if target.host_str() == Some("duckduckgo.com") {
        return None;
    }
    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// --- Serper (Google Search) ---

pub struct SerperSearcher {
    api_key: String,
    client: reqwest::Client,
    region: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl SerperSearcher {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            region: None,
        }
    }

    /// Accepts a DuckDuckGo-style `cc-lang` region (`in-en`) and maps it to
    /// Serper's `gl`/`hl` pair.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<EvidenceItem>> {
        info!(query, max_results, "Serper search");

        let mut body = serde_json::json!({
            "q": query,
            "num": max_results,
        });
        if let Some((gl, hl)) = self.region.as_deref().and_then(|r| r.split_once('-')) {
            body["gl"] = serde_json::Value::from(gl);
            body["hl"] = serde_json::Value::from(hl);
        }

        let resp = self
            .client
            .post("https://google.serper.dev/search")
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?
            .error_for_status()
            .context("Serper API returned an error status")?;

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let results: Vec<EvidenceItem> = data
            .organic
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .take(max_results)
            .map(|r| {
                let title = if r.title.trim().is_empty() {
                    NO_TITLE.to_string()
                } else {
                    r.title
                };
                EvidenceItem::new(title, r.snippet, r.link)
            })
            .collect();

        info!(query, count = results.len(), "Serper search complete");
        Ok(results)
    }
}
