use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    // Classifier
    pub model_path: PathBuf,

    // Search
    pub serper_api_key: Option<String>,
    pub search_region: String,
    pub evidence_max_results: usize,
    pub search_timeout: Duration,

    // Extraction
    pub fetch_timeout: Duration,
    pub proxy_timeout: Duration,
    pub use_reader_proxy: bool,
    pub reader_proxy_url: String,

    // Caches
    pub cache_capacity: usize,
    pub cache_ttl: Option<Duration>,

    // Web server
    pub api_host: String,
    pub api_port: u16,
    pub allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            model_path: PathBuf::from(
                env::var("MODEL_PATH").unwrap_or_else(|_| "model/classifier.json".to_string()),
            ),
            serper_api_key: env::var("SERPER_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            search_region: env::var("SEARCH_REGION").unwrap_or_else(|_| "in-en".to_string()),
            evidence_max_results: parse_env("EVIDENCE_MAX_RESULTS", 3)?,
            search_timeout: Duration::from_secs(parse_env("SEARCH_TIMEOUT_SECS", 15)?),
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 10)?),
            proxy_timeout: Duration::from_secs(parse_env("PROXY_TIMEOUT_SECS", 8)?),
            use_reader_proxy: flag_enabled(env::var("USE_READER_PROXY").ok().as_deref()),
            reader_proxy_url: env::var("READER_PROXY_URL")
                .unwrap_or_else(|_| "https://r.jina.ai/".to_string()),
            cache_capacity: parse_env("CACHE_CAPACITY", 100)?,
            cache_ttl: match env::var("CACHE_TTL_SECS") {
                Ok(v) => Some(Duration::from_secs(
                    v.parse().context("CACHE_TTL_SECS must be a number")?,
                )),
                Err(_) => None,
            },
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parse_env("API_PORT", 5000)?,
            allowed_origins: env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        })
    }

    /// Explicit origins for CORS, or `None` when any origin is allowed.
    pub fn origin_allowlist(&self) -> Option<Vec<String>> {
        if self.allowed_origins.trim() == "*" {
            return None;
        }
        Some(
            self.allowed_origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  MODEL_PATH: {}", self.model_path.display());
        tracing::info!("  SERPER_API_KEY: {}", preview_opt(&self.serper_api_key));
        tracing::info!("  SEARCH_REGION: {}", self.search_region);
        tracing::info!("  USE_READER_PROXY: {}", self.use_reader_proxy);
        tracing::info!("  READER_PROXY_URL: {}", self.reader_proxy_url);
        tracing::info!("  CACHE_CAPACITY: {}", self.cache_capacity);
        tracing::info!("  ALLOWED_ORIGINS: {}", self.allowed_origins);
    }
}

/// First few characters of a secret plus its length, for startup logs.
fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => {
            let head: String = v.chars().take(5).collect();
            format!("{head}...({} chars)", v.chars().count())
        }
        _ => "<not set>".to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/classifier.json"),
            serper_api_key: None,
            search_region: "in-en".to_string(),
            evidence_max_results: 3,
            search_timeout: Duration::from_secs(15),
            fetch_timeout: Duration::from_secs(10),
            proxy_timeout: Duration::from_secs(8),
            use_reader_proxy: true,
            reader_proxy_url: "https://r.jina.ai/".to_string(),
            cache_capacity: 100,
            cache_ttl: None,
            api_host: "0.0.0.0".to_string(),
            api_port: 5000,
            allowed_origins: "*".to_string(),
        }
    }
}

/// Feature flags default to on; only an explicit `0`/`false` disables them.
pub fn flag_enabled(raw: Option<&str>) -> bool {
    !matches!(raw.map(str::trim), Some("0" | "false" | "False" | "FALSE"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {v:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_preview_handles_multibyte_keys() {
        assert_eq!(preview_opt(&Some("clé-ünïcode".to_string())), "clé-ü...(11 chars)");
        assert_eq!(preview_opt(&Some("abc".to_string())), "abc...(3 chars)");
        assert_eq!(preview_opt(&Some(String::new())), "<not set>");
        assert_eq!(preview_opt(&None), "<not set>");
    }

    #[test]
    fn flags_default_on() {
        assert!(flag_enabled(None));
        assert!(flag_enabled(Some("1")));
        assert!(flag_enabled(Some("yes")));
    }

    #[test]
    fn flags_disabled_explicitly() {
        assert!(!flag_enabled(Some("0")));
        assert!(!flag_enabled(Some("false")));
        assert!(!flag_enabled(Some("False")));
    }

    #[test]
    fn wildcard_origin_means_no_allowlist() {
        let config = Config::default();
        assert!(config.origin_allowlist().is_none());
    }

    #[test]
    fn origin_list_is_split_and_trimmed() {
        let config = Config {
            allowed_origins: "https://a.example, https://b.example,,".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.origin_allowlist(),
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }
}
