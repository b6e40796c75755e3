use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use veracity_common::{BoundedCache, EvidenceReport, WebStatus};

use crate::search::WebSearcher;

pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Corroborating-evidence lookup. Provider errors and timeouts degrade to
/// `WebStatus::Unavailable`; nothing escapes to the caller.
pub struct EvidenceFetcher {
    searcher: Arc<dyn WebSearcher>,
    timeout: Duration,
    cache: Option<BoundedCache<(String, usize), EvidenceReport>>,
}

impl EvidenceFetcher {
    pub fn new(searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            searcher,
            timeout: Duration::from_secs(15),
            cache: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: BoundedCache<(String, usize), EvidenceReport>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn fetch_evidence(&self, query: &str, max_results: usize) -> EvidenceReport {
        let key = (query.to_string(), max_results);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                info!(max_results, "Evidence cache hit");
                return hit;
            }
        }

        let report = match tokio::time::timeout(
            self.timeout,
            self.searcher.search(query, max_results),
        )
        .await
        {
            Ok(Ok(mut articles)) => {
                articles.truncate(max_results);
                info!(count = articles.len(), "Evidence search complete");
                EvidenceReport::success(articles)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Web search failed");
                EvidenceReport::unavailable()
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Web search timed out");
                EvidenceReport::unavailable()
            }
        };

        if report.status == WebStatus::Success {
            if let Some(cache) = &self.cache {
                cache.insert(key, report.clone()).await;
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;
    use veracity_common::EvidenceItem;

    use super::*;

    struct MockSearcher {
        calls: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockSearcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                delay: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl WebSearcher for MockSearcher {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<EvidenceItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                anyhow::bail!("rate limited");
            }
            // Deliberately over-delivers to exercise truncation.
            Ok((0..max_results + 2)
                .map(|i| {
                    EvidenceItem::new(
                        format!("{query} {i}"),
                        "snippet",
                        format!("https://news.example/{i}"),
                    )
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn success_is_capped_at_max_results() {
        let fetcher = EvidenceFetcher::new(Arc::new(MockSearcher::new()));
        let report = fetcher.fetch_evidence("flood", 3).await;
        assert_eq!(report.status, WebStatus::Success);
        assert_eq!(report.articles.len(), 3);
        assert_eq!(report.articles[0].title, "flood 0");
    }

    #[tokio::test]
    async fn provider_error_is_unavailable() {
        let fetcher = EvidenceFetcher::new(Arc::new(MockSearcher::failing()));
        let report = fetcher.fetch_evidence("flood", 3).await;
        assert_eq!(report.status, WebStatus::Unavailable);
        assert!(report.articles.is_empty());
    }

    #[tokio::test]
    async fn timeout_is_unavailable() {
        let fetcher = EvidenceFetcher::new(Arc::new(MockSearcher::slow(Duration::from_secs(5))))
            .with_timeout(Duration::from_millis(20));
        let report = fetcher.fetch_evidence("flood", 3).await;
        assert_eq!(report, EvidenceReport::unavailable());
    }

    #[tokio::test]
    async fn cache_is_keyed_by_query_and_count() {
        let searcher = Arc::new(MockSearcher::new());
        let fetcher = EvidenceFetcher::new(searcher.clone()).with_cache(BoundedCache::new(10));

        fetcher.fetch_evidence("flood", 3).await;
        fetcher.fetch_evidence("flood", 3).await;
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 1);

        let wider = fetcher.fetch_evidence("flood", 5).await;
        assert_eq!(wider.articles.len(), 5);
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let searcher = Arc::new(MockSearcher::failing());
        let fetcher = EvidenceFetcher::new(searcher.clone()).with_cache(BoundedCache::new(10));

        fetcher.fetch_evidence("flood", 3).await;
        fetcher.fetch_evidence("flood", 3).await;
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 2);
    }
}
