use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use veracity_api::{router, AppState, Verifier};
use veracity_archive::{
    ArticleExtractor, DuckDuckGoSearcher, EvidenceFetcher, SerperSearcher, UrlValidator,
    WebSearcher,
};
use veracity_common::{BoundedCache, Config};
use veracity_scoring::{Classifier, LogisticModel};

fn cache<K, V>(config: &Config) -> BoundedCache<K, V>
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    let cache = BoundedCache::new(config.cache_capacity);
    match config.cache_ttl {
        Some(ttl) => cache.with_ttl(ttl),
        None => cache,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("veracity=info".parse()?))
        .init();

    let config = Config::from_env()?;
    config.log_redacted();

    let classifier: Arc<dyn Classifier> = Arc::new(
        LogisticModel::load(&config.model_path)
            .with_context(|| format!("loading model from {}", config.model_path.display()))?,
    );

    let searcher: Arc<dyn WebSearcher> = match &config.serper_api_key {
        Some(key) => {
            info!("Using Serper for web evidence");
            Arc::new(SerperSearcher::new(key).with_region(&config.search_region))
        }
        None => {
            info!(region = %config.search_region, "Using DuckDuckGo for web evidence");
            Arc::new(DuckDuckGoSearcher::new(&config.search_region))
        }
    };
    let evidence = EvidenceFetcher::new(searcher)
        .with_timeout(config.search_timeout)
        .with_cache(cache(&config));

    let mut extractor = ArticleExtractor::new(UrlValidator::new())?
        .with_fetch_timeout(config.fetch_timeout)
        .with_cache(cache(&config));
    if config.use_reader_proxy {
        extractor = extractor.with_reader_proxy(&config.reader_proxy_url, config.proxy_timeout);
    }

    let verifier = Verifier::new(classifier, evidence, extractor)
        .with_max_results(config.evidence_max_results);
    let state = Arc::new(AppState { verifier });

    let app = router(state, config.origin_allowlist());

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Veracity API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
