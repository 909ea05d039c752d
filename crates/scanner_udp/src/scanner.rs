//! UDP prober implementation

use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

use portlens_common::{Observation, PortState, Prober, ScanConfig, ScanStrategy, NO_RESPONSE};
use portlens_fingerprint::classify_service;

/// Bytes of a UDP reply kept as banner.
pub const MAX_UDP_BANNER_BYTES: usize = 100;

const RECV_BUFFER: usize = 1024;

/// Sends an empty datagram and waits for any reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpProber;

impl UdpProber {
    pub fn new() -> Self {
        Self
    }

    async fn exchange(&self, config: &ScanConfig, addr: SocketAddr) -> io::Result<Option<Vec<u8>>> {
        // Unconnected on purpose: ICMP unreachable must not surface as an error.
        let bind_addr: SocketAddr = match addr.ip() {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.send_to(&[], addr).await?;

        let mut buf = vec![0u8; RECV_BUFFER];
        match timeout(config.timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((n, from))) => {
                debug!("{} replied with {} bytes from {}", addr, n, from);
                buf.truncate(n);
                Ok(Some(buf))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl Prober for UdpProber {
    async fn probe(&self, config: &ScanConfig, port: u16) -> Option<Observation> {
        let addr = SocketAddr::new(config.address, port);
        let service = classify_service(port);

        match self.exchange(config, addr).await {
            Ok(Some(payload)) => {
                let kept = &payload[..payload.len().min(MAX_UDP_BANNER_BYTES)];
                Some(
                    Observation::new(port, PortState::Open, service, ScanStrategy::Udp)
                        .with_banner(String::from_utf8_lossy(kept)),
                )
            }
            Ok(None) => Some(
                Observation::new(port, PortState::OpenOrFiltered, service, ScanStrategy::Udp)
                    .with_banner(NO_RESPONSE),
            ),
            Err(e) => {
                debug!("{} udp probe failed: {}", addr, e);
                None
            }
        }
    }

    fn strategy(&self) -> ScanStrategy {
        ScanStrategy::Udp
    }

    fn name(&self) -> &str {
        "UDP Prober"
    }
}
