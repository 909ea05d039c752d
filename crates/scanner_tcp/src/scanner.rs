// crates/scanner_tcp/src/scanner.rs
//! TCP connect prober implementation

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::banner::BannerGrabber;
use portlens_common::{Observation, PortState, Prober, ScanConfig, ScanStrategy};
use portlens_fingerprint::classify_service;

/// Full-handshake prober. Needs no privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectProber;

impl ConnectProber {
    pub fn new() -> Self {
        Self
    }

    /// Try to establish a TCP connection within `config.timeout`.
    async fn try_connect(&self, config: &ScanConfig, addr: SocketAddr) -> Option<TcpStream> {
        match timeout(config.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Some(stream),
            Ok(Err(e)) => {
                debug!("{} connect failed: {}", addr, e);
                None
            }
            Err(_) => {
                debug!("{} connect timed out", addr);
                None
            }
        }
    }
}

#[async_trait]
impl Prober for ConnectProber {
    async fn probe(&self, config: &ScanConfig, port: u16) -> Option<Observation> {
        let addr = SocketAddr::new(config.address, port);
        let start = Instant::now();

        let mut stream = self.try_connect(config, addr).await?;
        debug!("{} open after {:?}", addr, start.elapsed());

        let banner = BannerGrabber::new(config.timeout)
            .grab(&mut stream, port, &config.target)
            .await;
        drop(stream);

        Some(
            Observation::new(port, PortState::Open, classify_service(port), ScanStrategy::Connect)
                .with_banner(banner),
        )
    }

    fn strategy(&self) -> ScanStrategy {
        ScanStrategy::Connect
    }

    fn name(&self) -> &str {
        "TCP Connect Prober"
    }
}
