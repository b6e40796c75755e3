// Article extraction: an ordered chain of strategies behind the SSRF guard.
//
// 1. Readability over the fetched HTML (feature `readability`)
// 2. Generic og:title / <p> heuristics over the same HTML
// 3. Read-it-later proxy
//
// The first non-empty text wins. Failures inside a strategy never escape;
// only exhaustion of the chain produces a caller-visible error message.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use tracing::{info, warn};
use veracity_common::{BoundedCache, ExtractionResult, Strategy};

use crate::error::{FetchError, FetchResult};
use crate::html;
use crate::proxy::{self, ReaderProxy};
use crate::security::{GuardedResolver, UrlValidator};

/// Statuses meaning the origin refuses automated clients. The proxy would hit
/// the same wall, so these end the chain.
pub const BLOCKING_STATUSES: [u16; 5] = [401, 403, 404, 503, 520];

pub const EXHAUSTED_MESSAGE: &str = "This website has strong anti-bot protection and blocked \
extraction. Please copy and paste the article text manually.";

const MAX_REDIRECTS: usize = 10;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

pub fn blocked_message(status: u16) -> String {
    format!(
        "The website blocked automated access (Status {status}). \
         Please paste the article text directly instead."
    )
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers
}

pub struct ArticleExtractor {
    client: reqwest::Client,
    validator: Arc<UrlValidator>,
    fetch_timeout: Duration,
    #[cfg_attr(not(feature = "readability"), allow(dead_code))]
    use_readability: bool,
    proxy: Option<ReaderProxy>,
    cache: Option<BoundedCache<String, ExtractionResult>>,
}

impl ArticleExtractor {
    /// Build an extractor with browser-like headers. Every redirect hop is
    /// checked against `validator`, and every connection resolves through it,
    /// so neither an IP literal nor a hostname can lead the client into
    /// internal address space.
    pub fn new(validator: UrlValidator) -> Result<Self> {
        let validator = Arc::new(validator);
        let hop_validator = validator.clone();

        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .dns_resolver(Arc::new(GuardedResolver::new(validator.clone())))
            // A system proxy would resolve hosts on our behalf.
            .no_proxy()
            .redirect(reqwest::redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.error("too many redirects")
                } else if let Err(e) = hop_validator.validate_parsed(attempt.url()) {
                    attempt.error(e)
                } else {
                    attempt.follow()
                }
            }))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            validator,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            use_readability: true,
            proxy: None,
            cache: None,
        })
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Toggle the Readability pass. Has no effect when the crate is built
    /// without the `readability` feature.
    pub fn with_readability(mut self, enabled: bool) -> Self {
        self.use_readability = enabled;
        self
    }

    pub fn with_reader_proxy(mut self, base_url: &str, timeout: Duration) -> Self {
        self.proxy = Some(ReaderProxy::new(self.client.clone(), base_url, timeout));
        self
    }

    pub fn with_cache(mut self, cache: BoundedCache<String, ExtractionResult>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn validator(&self) -> &UrlValidator {
        &self.validator
    }

    /// Extract `(title, text)` from `url`. Never fails; a result with empty
    /// text carries a human-readable `error`.
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let url = url.trim();

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&url.to_string()).await {
                info!(url, "Extraction cache hit");
                return hit;
            }
        }

        // A refused URL looks exactly like a failed extraction to the caller.
        if !self.validator.is_allowed(url).await {
            return ExtractionResult::failed(EXHAUSTED_MESSAGE);
        }

        let result = self.run_chain(url).await;

        if result.is_success() {
            if let Some(cache) = &self.cache {
                cache.insert(url.to_string(), result.clone()).await;
            }
        }
        result
    }

    async fn run_chain(&self, url: &str) -> ExtractionResult {
        let mut title_hint: Option<String> = None;

        match self.fetch_page(url).await {
            Ok(page) => {
                if let Some(result) = self.readability_pass(url, &page) {
                    return result;
                }

                let parsed = html::extract_article(&page);
                if !parsed.text.is_empty() {
                    info!(
                        url,
                        strategy = Strategy::Html.as_str(),
                        chars = parsed.text.len(),
                        "Extracted article"
                    );
                    return ExtractionResult::extracted(
                        parsed.title.unwrap_or_default(),
                        parsed.text,
                        Strategy::Html,
                    );
                }
                info!(url, strategy = Strategy::Html.as_str(), "No paragraph content found");
                title_hint = parsed.title;
            }
            Err(FetchError::Status(code)) if BLOCKING_STATUSES.contains(&code) => {
                warn!(url, status = code, "Origin blocked automated access");
                return ExtractionResult::failed(blocked_message(code));
            }
            Err(e) => {
                warn!(url, error = %e, "Direct fetch failed");
            }
        }

        if let Some(proxy) = &self.proxy {
            if let Some(body) = proxy.fetch(url).await {
                let title = title_hint
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| proxy::first_line(&body));
                info!(url, strategy = Strategy::Proxy.as_str(), chars = body.len(), "Extracted article");
                return ExtractionResult::extracted(title, body, Strategy::Proxy);
            }
        }

        warn!(url, "All extraction strategies failed");
        ExtractionResult::failed(EXHAUSTED_MESSAGE)
    }

    #[cfg(feature = "readability")]
    fn readability_pass(&self, url: &str, page: &str) -> Option<ExtractionResult> {
        if !self.use_readability {
            return None;
        }
        let text = crate::readability::html_to_text(page.as_bytes(), Some(url));
        if text.is_empty() {
            info!(
                url,
                strategy = Strategy::Readability.as_str(),
                "Empty content after Readability extraction"
            );
            return None;
        }
        let title = html::extract_title(&scraper::Html::parse_document(page)).unwrap_or_default();
        info!(url, strategy = Strategy::Readability.as_str(), chars = text.len(), "Extracted article");
        Some(ExtractionResult::extracted(title, text, Strategy::Readability))
    }

    #[cfg(not(feature = "readability"))]
    fn readability_pass(&self, _url: &str, _page: &str) -> Option<ExtractionResult> {
        None
    }

    /// GET the page HTML. Non-success statuses become `FetchError::Status`.
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| timeout_or_http(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        self.validator.validate_parsed(response.url())?;

        response.text().await.map_err(|e| timeout_or_http(url, e))
    }
}

fn timeout_or_http(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http(e)
    }
}
