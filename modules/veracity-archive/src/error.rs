//! Typed errors for fetching and SSRF validation.

use thiserror::Error;

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked by name (e.g., localhost)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// Address in a blocked range (private, loopback, link-local, ...)
    #[error("blocked IP range: {0}")]
    BlockedAddress(String),

    #[error("URL has no host")]
    NoHost,

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

/// Errors from a single fetch. Never escape the extraction chain.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Origin answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
