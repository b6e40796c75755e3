//! URL validation for SSRF protection.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use ipnet::IpNet;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

/// Address ranges that must never be fetched: private-use, loopback,
/// link-local, multicast, reserved, unspecified and documentation space.
/// Public IPv6 unicast is 2000::/3; everything outside it is listed.
static BLOCKED_RANGES: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    [
        // IPv4
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10", // carrier-grade NAT
        "127.0.0.0/8",
        "169.254.0.0/16", // link-local / cloud metadata
        "172.16.0.0/12",
        "192.0.0.0/24",
        "192.0.2.0/24",
        "192.88.99.0/24",
        "192.168.0.0/16",
        "198.18.0.0/15",
        "198.51.100.0/24",
        "203.0.113.0/24",
        "224.0.0.0/4", // multicast
        "240.0.0.0/4", // reserved + broadcast
        // IPv6
        "::/8",
        "100::/8",
        "200::/7",
        "400::/6",
        "800::/5",
        "1000::/4",
        "2001::/23",
        "2001:db8::/32",
        "2002::/16",
        "4000::/3",
        "6000::/3",
        "8000::/3",
        "a000::/3",
        "c000::/3",
        "e000::/4",
        "f000::/5",
        "f800::/6",
        "fc00::/7",  // unique local
        "fe00::/9",
        "fe80::/10", // link-local
        "fec0::/10",
        "ff00::/8",  // multicast
    ]
    .into_iter()
    .map(|cidr| cidr.parse().expect("valid CIDR"))
    .collect()
});

/// True if `ip` may not be contacted. IPv4-mapped IPv6 addresses are judged
/// by their IPv4 form.
pub fn is_disallowed_ip(ip: IpAddr) -> bool {
    let ip = match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    };
    ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_multicast()
        || BLOCKED_RANGES.iter().any(|net| net.contains(&ip))
}

// --- DNS resolution ---

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to every address it maps to.
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the system's `getaddrinfo` via tokio.
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.map(|a| a.ip()).collect())
    }
}

/// Fixed host table. Unknown hosts fail to resolve.
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    table: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.table.insert(host.into().to_lowercase(), addrs);
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, host: &str, _port: u16) -> std::io::Result<Vec<IpAddr>> {
        self.table.get(&host.to_lowercase()).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("unknown host {host}"))
        })
    }
}

// --- Validator ---

/// URL validator for SSRF protection.
///
/// Rejects:
/// - non-HTTP(S) schemes (file://, ftp://, gopher://)
/// - URLs without a host
/// - internal host names (localhost, cloud metadata endpoints)
/// - hosts that resolve to *any* internal address, so a name with one public
///   and one private record is still refused
#[derive(Clone)]
pub struct UrlValidator {
    allowed_schemes: HashSet<String>,
    blocked_hosts: HashSet<String>,
    extra_blocked: Vec<IpNet>,
    allowed_hosts: HashSet<String>,
    resolver: Arc<dyn HostResolver>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UrlValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlValidator")
            .field("allowed_schemes", &self.allowed_schemes)
            .field("blocked_hosts", &self.blocked_hosts)
            .field("extra_blocked", &self.extra_blocked)
            .field("allowed_hosts", &self.allowed_hosts)
            .finish_non_exhaustive()
    }
}

impl UrlValidator {
    /// Validator with default rules and the system resolver.
    pub fn new() -> Self {
        Self {
            allowed_schemes: ["http", "https"].into_iter().map(String::from).collect(),
            blocked_hosts: [
                "localhost",
                "localhost.localdomain",
                "metadata.google.internal",
                "metadata.gke.internal",
                "instance-data",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extra_blocked: Vec::new(),
            allowed_hosts: HashSet::new(),
            resolver: Arc::new(SystemResolver),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Add an allowed host (bypasses every other check).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.insert(host.into().to_lowercase());
        self
    }

    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into().to_lowercase());
        self
    }

    pub fn block_cidr(mut self, cidr: IpNet) -> Self {
        self.extra_blocked.push(cidr);
        self
    }

    fn blocks_ip(&self, ip: IpAddr) -> bool {
        is_disallowed_ip(ip) || self.extra_blocked.iter().any(|net| net.contains(&ip))
    }

    /// Literal checks only: scheme, host presence, blocked names, IP-literal
    /// hosts. No DNS lookup, so it is usable inside redirect policies.
    pub fn validate(&self, url: &str) -> SecurityResult<Url> {
        let parsed = Url::parse(url)?;
        self.validate_parsed(&parsed)?;
        Ok(parsed)
    }

    pub fn validate_parsed(&self, parsed: &Url) -> SecurityResult<()> {
        if !self.allowed_schemes.contains(parsed.scheme()) {
            return Err(SecurityError::DisallowedScheme(parsed.scheme().to_string()));
        }

        let host = parsed.host().ok_or(SecurityError::NoHost)?;
        let host_name = host_key(&host);
        if host_name.is_empty() {
            return Err(SecurityError::NoHost);
        }

        if self.allowed_hosts.contains(&host_name) {
            return Ok(());
        }

        if self.blocked_hosts.contains(&host_name) {
            return Err(SecurityError::BlockedHost(host_name));
        }

        let literal = match host {
            Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
            Host::Ipv6(v6) => Some(IpAddr::V6(v6)),
            Host::Domain(_) => None,
        };
        if let Some(ip) = literal {
            if self.blocks_ip(ip) {
                return Err(SecurityError::BlockedAddress(ip.to_string()));
            }
        }

        Ok(())
    }

    /// Full validation: literal checks, then resolve the host and require
    /// every resolved address to be public.
    pub async fn validate_with_dns(&self, url: &str) -> SecurityResult<Url> {
        let parsed = self.validate(url)?;
        let host = parsed.host().ok_or(SecurityError::NoHost)?;

        let domain = match host {
            Host::Domain(d) => d.to_string(),
            // IP literals were fully checked above.
            Host::Ipv4(_) | Host::Ipv6(_) => return Ok(parsed),
        };

        if self.allowed_hosts.contains(&domain.to_lowercase()) {
            return Ok(parsed);
        }

        let port = parsed.port_or_known_default().unwrap_or(80);
        self.resolve_checked(&domain, port).await?;
        Ok(parsed)
    }

    /// Resolve `host` and return its addresses only if every one of them may
    /// be contacted. Allowed hosts skip the range checks.
    pub async fn resolve_checked(&self, host: &str, port: u16) -> SecurityResult<Vec<IpAddr>> {
        let key = host.trim_end_matches('.').to_lowercase();
        let allowed = self.allowed_hosts.contains(&key);
        if !allowed && self.blocked_hosts.contains(&key) {
            return Err(SecurityError::BlockedHost(key));
        }

        let addrs = self
            .resolver
            .resolve(host, port)
            .await
            .map_err(|e| SecurityError::DnsResolution(e.to_string()))?;

        if addrs.is_empty() {
            return Err(SecurityError::DnsResolution(format!(
                "{host} resolved to no addresses"
            )));
        }
        if allowed {
            return Ok(addrs);
        }

        if let Some(ip) = addrs.iter().copied().find(|ip| self.blocks_ip(*ip)) {
            return Err(SecurityError::BlockedAddress(format!(
                "DNS for {host} resolved to blocked IP {ip}"
            )));
        }

        Ok(addrs)
    }

    /// Fail-closed yes/no answer used to gate fetches.
    pub async fn is_allowed(&self, url: &str) -> bool {
        match self.validate_with_dns(url).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(url, error = %e, "URL rejected by SSRF guard");
                false
            }
        }
    }
}

// --- Connect-time guard ---

/// DNS resolver for reqwest that applies the validator's address rules on
/// every connection, including redirect targets.
pub struct GuardedResolver {
    validator: Arc<UrlValidator>,
}

impl GuardedResolver {
    pub fn new(validator: Arc<UrlValidator>) -> Self {
        Self { validator }
    }
}

impl reqwest::dns::Resolve for GuardedResolver {
    fn resolve(&self, name: reqwest::dns::Name) -> reqwest::dns::Resolving {
        let validator = self.validator.clone();
        Box::pin(async move {
            let addrs = validator
                .resolve_checked(name.as_str(), 0)
                .await
                .map_err(|e| {
                    tracing::warn!(host = name.as_str(), error = %e, "Connection refused by SSRF guard");
                    Box::new(e) as Box<dyn std::error::Error + Send + Sync>
                })?;
            // The connector fills in the port from the request URI.
            let addrs: reqwest::dns::Addrs =
                Box::new(addrs.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}

fn host_key(host: &Host<&str>) -> String {
    match host {
        Host::Domain(d) => d.trim_end_matches('.').to_lowercase(),
        Host::Ipv4(v4) => v4.to_string(),
        Host::Ipv6(v6) => v6.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(host: &str, addrs: &[&str]) -> Arc<dyn HostResolver> {
        Arc::new(StaticResolver::new().with_host(
            host,
            addrs.iter().map(|a| a.parse().unwrap()).collect(),
        ))
    }

    #[tokio::test]
    async fn rejects_loopback_and_metadata_literals() {
        let validator = UrlValidator::new();
        assert!(!validator.is_allowed("http://127.0.0.1/").await);
        assert!(!validator.is_allowed("http://169.254.169.254/").await);
        assert!(!validator.is_allowed("http://[::1]/").await);
        assert!(!validator.is_allowed("http://0.0.0.0/").await);
    }

    #[test]
    fn rejects_private_ranges() {
        let validator = UrlValidator::new();
        assert!(validator.validate("http://10.0.0.1/").is_err());
        assert!(validator.validate("http://172.16.0.1/").is_err());
        assert!(validator.validate("http://192.168.1.1/").is_err());
        assert!(validator.validate("http://[fd00::1]/").is_err());
        assert!(validator.validate("http://[fe80::1]/").is_err());
    }

    #[test]
    fn rejects_mapped_ipv4_loopback() {
        assert!(is_disallowed_ip("::ffff:127.0.0.1".parse().unwrap()));
        assert!(is_disallowed_ip("::ffff:10.1.2.3".parse().unwrap()));
        assert!(!is_disallowed_ip("::ffff:93.184.216.34".parse().unwrap()));
    }

    #[test]
    fn rejects_multicast_reserved_and_broadcast() {
        assert!(is_disallowed_ip("224.0.0.1".parse().unwrap()));
        assert!(is_disallowed_ip("240.0.0.1".parse().unwrap()));
        assert!(is_disallowed_ip("255.255.255.255".parse().unwrap()));
        assert!(is_disallowed_ip("ff02::1".parse().unwrap()));
        assert!(is_disallowed_ip("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn public_addresses_pass() {
        assert!(!is_disallowed_ip("93.184.216.34".parse().unwrap()));
        assert!(!is_disallowed_ip("8.8.8.8".parse().unwrap()));
        assert!(!is_disallowed_ip("2606:4700:4700::1111".parse().unwrap()));
    }

    #[test]
    fn rejects_non_http_schemes_and_missing_hosts() {
        let validator = UrlValidator::new();
        assert!(matches!(
            validator.validate("file:///etc/passwd"),
            Err(SecurityError::DisallowedScheme(_))
        ));
        assert!(validator.validate("ftp://example.com/").is_err());
        assert!(validator.validate("not a url").is_err());
        assert!(validator.validate("http://").is_err());
    }

    #[test]
    fn rejects_internal_names() {
        let validator = UrlValidator::new();
        assert!(validator.validate("http://localhost:8080/").is_err());
        assert!(validator.validate("http://LOCALHOST./").is_err());
        assert!(validator.validate("http://metadata.google.internal/").is_err());
    }

    #[tokio::test]
    async fn accepts_public_https_host() {
        let validator = UrlValidator::new()
            .with_resolver(resolver_with("news.example.com", &["93.184.216.34"]));
        assert!(validator.is_allowed("https://news.example.com/story").await);
    }

    #[tokio::test]
    async fn rejects_host_resolving_to_metadata() {
        let validator = UrlValidator::new()
            .with_resolver(resolver_with("sneaky.example.com", &["169.254.169.254"]));
        assert!(!validator.is_allowed("https://sneaky.example.com/").await);
    }

    #[tokio::test]
    async fn rejects_host_with_any_internal_record() {
        let validator = UrlValidator::new().with_resolver(resolver_with(
            "rebind.example.com",
            &["93.184.216.34", "10.0.0.5"],
        ));
        assert!(!validator.is_allowed("https://rebind.example.com/").await);
    }

    #[tokio::test]
    async fn rejects_unresolvable_and_empty_hosts() {
        let validator = UrlValidator::new()
            .with_resolver(resolver_with("empty.example.com", &[]));
        assert!(!validator.is_allowed("https://empty.example.com/").await);
        assert!(!validator.is_allowed("https://missing.example.com/").await);
    }

    #[tokio::test]
    async fn allowed_hosts_bypass() {
        let validator = UrlValidator::new().allow_host("127.0.0.1");
        assert!(validator.is_allowed("http://127.0.0.1:3000/").await);
    }

    #[tokio::test]
    async fn resolve_checked_refuses_internal_records() {
        let validator = UrlValidator::new()
            .with_resolver(resolver_with("intranet.example", &["10.1.2.3"]));
        assert!(matches!(
            validator.resolve_checked("intranet.example", 443).await,
            Err(SecurityError::BlockedAddress(_))
        ));
        assert!(matches!(
            validator.resolve_checked("localhost", 80).await,
            Err(SecurityError::BlockedHost(_))
        ));
    }

    #[tokio::test]
    async fn resolve_checked_returns_public_records() {
        let validator = UrlValidator::new()
            .with_resolver(resolver_with("news.example.com", &["93.184.216.34"]));
        let addrs = validator.resolve_checked("News.Example.com", 443).await.unwrap();
        assert_eq!(addrs, vec!["93.184.216.34".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn allowed_host_resolves_without_range_checks() {
        let validator = UrlValidator::new()
            .allow_host("fixture.test")
            .with_resolver(resolver_with("fixture.test", &["127.0.0.1"]));
        let addrs = validator.resolve_checked("fixture.test", 80).await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn extra_cidr_blocks() {
        let validator = UrlValidator::new().block_cidr("93.184.216.0/24".parse().unwrap());
        assert!(validator.validate("http://93.184.216.34/").is_err());
    }
}
