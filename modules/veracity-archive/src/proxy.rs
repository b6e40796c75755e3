// Read-it-later proxy fallback. The proxy fetches and renders the page on
// its side and answers with plain text.

use std::time::Duration;

use tracing::{info, warn};

/// Bodies at or under this many characters are placeholders, not articles.
const MIN_BODY_CHARS: usize = 100;

/// Marker the proxy emits when it refuses a target.
const PROXY_ERROR_MARKER: &str = "SecurityCompromiseError";

pub struct ReaderProxy {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ReaderProxy {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Rewrite `url` onto the proxy: scheme stripped, re-prefixed with `http://`.
    pub fn proxy_url(&self, url: &str) -> String {
        let rest = strip_scheme(url.trim());
        format!("{}http://{}", self.base_url, rest)
    }

    /// Fetch `url` through the proxy. Returns the accepted body, or `None` on
    /// any failure (transport, timeout, status, degenerate body).
    pub async fn fetch(&self, url: &str) -> Option<String> {
        let target = self.proxy_url(url);
        info!(url, proxy = %target, "Fetching via reader proxy");

        let response = match self.client.get(&target).timeout(self.timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "Reader proxy request failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(url, error = %e, "Reader proxy body unreadable");
                return None;
            }
        };

        let accepted = accept_body(status, &body);
        if accepted.is_none() {
            warn!(url, status, bytes = body.len(), "Reader proxy response rejected");
        }
        accepted
    }
}

/// Accept only a 200 with a non-trivial body free of the proxy error marker.
pub fn accept_body(status: u16, body: &str) -> Option<String> {
    if status != 200 {
        return None;
    }
    let body = body.trim();
    if body.chars().count() <= MIN_BODY_CHARS || body.contains(PROXY_ERROR_MARKER) {
        return None;
    }
    Some(body.to_string())
}

/// First non-empty line of a proxy body, used as a title of last resort.
pub fn first_line(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if let Some(prefix) = url.get(..scheme.len()) {
            if prefix.eq_ignore_ascii_case(scheme) {
                return &url[scheme.len()..];
            }
        }
    }
    url
}
