//! Target Resolver - host token to a single address
//!
//! Literal IPv4/IPv6 addresses pass through untouched. Anything else goes to
//! a `NameLookup`; the system lookup runs inside `spawn_blocking` so the
//! async runtime is never stalled by `getaddrinfo`.

use portlens_common::{PortlensError, PortlensResult};
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;
use tracing::debug;

/// Name resolution backend.
pub trait NameLookup: Send + Sync {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

impl NameLookup for SystemLookup {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        Ok((host, 0).to_socket_addrs()?.map(|a| a.ip()).collect())
    }
}

#[derive(Clone)]
pub struct TargetResolver {
    lookup: Arc<dyn NameLookup>,
}

impl TargetResolver {
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(SystemLookup))
    }

    pub fn with_lookup(lookup: Arc<dyn NameLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve a host token into one address.
    ///
    /// IPv4 results are preferred over IPv6. Any lookup failure, including an
    /// empty answer, is `ResolutionFailed`.
    pub async fn resolve(&self, target: &str) -> PortlensResult<IpAddr> {
        let host = target.trim();
        if host.is_empty() {
            return Err(PortlensError::Config("no target specified".to_string()));
        }

        if let Some(ip) = parse_literal(host) {
            debug!("{} is a literal address", host);
            return Ok(ip);
        }

        let lookup = self.lookup.clone();
        let name = host.to_string();
        let addrs = tokio::task::spawn_blocking(move || lookup.lookup(&name))
            .await
            .map_err(|e| PortlensError::Worker(format!("DNS lookup task failed: {}", e)))?
            .map_err(|e| {
                debug!("lookup of {} failed: {}", host, e);
                PortlensError::ResolutionFailed(host.to_string())
            })?;

        let chosen = addrs
            .iter()
            .copied()
            .find(IpAddr::is_ipv4)
            .or_else(|| addrs.first().copied())
            .ok_or_else(|| PortlensError::ResolutionFailed(host.to_string()))?;

        debug!("{} resolved to {} ({} candidates)", host, chosen, addrs.len());
        Ok(chosen)
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a literal address, accepting bracketed IPv6 (`[::1]`).
fn parse_literal(host: &str) -> Option<IpAddr> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Lookup that counts calls and answers from a fixed table.
    struct CountingLookup {
        calls: AtomicUsize,
        answer: Option<Vec<IpAddr>>,
    }

    impl CountingLookup {
        fn new(answer: Option<Vec<IpAddr>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                answer,
            })
        }
    }

    impl NameLookup for CountingLookup {
        fn lookup(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
        }
    }

    #[tokio::test]
    async fn literal_ipv4_skips_lookup() {
        let lookup = CountingLookup::new(None);
        let resolver = TargetResolver::with_lookup(lookup.clone());
        let ip = resolver.resolve("8.8.8.8").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn literal_ipv6_skips_lookup() {
        let lookup = CountingLookup::new(None);
        let resolver = TargetResolver::with_lookup(lookup.clone());
        assert_eq!(
            resolver.resolve("::1").await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
        assert_eq!(
            resolver.resolve("[::1]").await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn name_prefers_ipv4() {
        let lookup = CountingLookup::new(Some(vec![
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
        ]));
        let resolver = TargetResolver::with_lookup(lookup.clone());
        let ip = resolver.resolve("db.internal").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ipv6_only_name_falls_back() {
        let lookup = CountingLookup::new(Some(vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]));
        let resolver = TargetResolver::with_lookup(lookup);
        assert_eq!(
            resolver.resolve("v6only.internal").await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn failed_lookup_is_fatal_error() {
        let lookup = CountingLookup::new(None);
        let resolver = TargetResolver::with_lookup(lookup.clone());
        let err = resolver.resolve("nowhere.invalid").await.unwrap_err();
        assert!(matches!(err, PortlensError::ResolutionFailed(ref h) if h == "nowhere.invalid"));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_answer_is_fatal_error() {
        let lookup = CountingLookup::new(Some(Vec::new()));
        let resolver = TargetResolver::with_lookup(lookup);
        let err = resolver.resolve("empty.internal").await.unwrap_err();
        assert!(matches!(err, PortlensError::ResolutionFailed(_)));
    }

    #[tokio::test]
    async fn system_lookup_resolves_localhost() {
        let resolver = TargetResolver::new();
        let ip = resolver.resolve("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }
}
