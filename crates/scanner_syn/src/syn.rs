//! Half-open SYN prober
//!
//! Each probe sends one hand-built SYN through its own raw socket and
//! watches that socket for the matching reply. The kernel never sees a
//! handshake of ours, so it answers a SYN-ACK with RST on our behalf.

use crate::error::SynError;
use crate::packet::{build_syn_packet, parse_tcp_reply, SynProbe};
use crate::raw::{source_address_for, RawSocket};
use async_trait::async_trait;
use portlens_common::{
    Observation, PortState, PortlensError, PortlensResult, Prober, ScanConfig, ScanStrategy,
};
use portlens_fingerprint::classify_service;
use rand::Rng;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const RECV_BUFFER: usize = 65536;

pub struct SynProber {
    /// Set once the first per-probe socket failure has been reported.
    socket_warned: Arc<AtomicBool>,
}

impl SynProber {
    /// Check raw-socket capability and build the prober.
    ///
    /// This is the only place a missing privilege becomes an error.
    pub fn new() -> Result<Self, SynError> {
        drop(RawSocket::open()?);
        Ok(Self {
            socket_warned: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_raw_available() -> bool {
        RawSocket::open().is_ok()
    }

    fn target_v4(config: &ScanConfig) -> Result<Ipv4Addr, SynError> {
        match config.address {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(v6) => Err(SynError::InvalidTarget(format!(
                "SYN scan supports IPv4 targets only, got {}",
                v6
            ))),
        }
    }

    /// Blocking body of one probe. Returns the reply flags when answered.
    fn exchange(probe: SynProbe, wait: Duration, warned: &AtomicBool) -> Option<u8> {
        let socket = match RawSocket::open() {
            Ok(s) => s,
            Err(e) => {
                if !warned.swap(true, Ordering::Relaxed) {
                    warn!("SYN probe could not open raw socket: {}", e);
                }
                return None;
            }
        };

        let packet = build_syn_packet(&probe, rand::random::<u16>());
        if let Err(e) = socket.send_to(&packet, probe.dst) {
            debug!("{}:{} raw send failed: {}", probe.dst, probe.dst_port, e);
            return None;
        }

        let deadline = Instant::now() + wait;
        let mut buf = vec![0u8; RECV_BUFFER];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            let n = match socket.recv(&mut buf, remaining) {
                Ok(n) => n,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return None;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("{}:{} raw recv failed: {}", probe.dst, probe.dst_port, e);
                    return None;
                }
            };

            match parse_tcp_reply(&buf[..n]) {
                Some(reply) if probe.is_answered_by(&reply) => return Some(reply.flags),
                _ => continue,
            }
        }
    }
}

/// Flags that mean the port accepted our SYN.
#[inline(always)]
pub fn is_open_reply(flags: u8) -> bool {
    flags & 0x12 == 0x12
}

#[async_trait]
impl Prober for SynProber {
    async fn probe(&self, config: &ScanConfig, port: u16) -> Option<Observation> {
        let dst = Self::target_v4(config).ok()?;
        let src = match source_address_for(dst) {
            Ok(src) => src,
            Err(e) => {
                debug!("{}:{} no source address: {}", dst, port, e);
                return None;
            }
        };

        let probe = {
            let mut rng = rand::thread_rng();
            SynProbe {
                src,
                dst,
                src_port: rng.gen_range(1024..=65535),
                dst_port: port,
                seq: rng.gen(),
            }
        };

        let wait = config.timeout;
        let warned = self.socket_warned.clone();
        let flags = tokio::task::spawn_blocking(move || Self::exchange(probe, wait, &warned))
            .await
            .ok()
            .flatten()?;

        debug!("{}:{} replied with flags {:#04x}", dst, port, flags);
        is_open_reply(flags).then(|| {
            Observation::new(port, PortState::Open, classify_service(port), ScanStrategy::Syn)
        })
    }

    fn prepare(&self, config: &ScanConfig) -> PortlensResult<()> {
        let dst = Self::target_v4(config)?;
        source_address_for(dst).map_err(PortlensError::from)?;
        Ok(())
    }

    fn strategy(&self) -> ScanStrategy {
        ScanStrategy::Syn
    }

    fn name(&self) -> &str {
        "SYN Prober"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::tcp_flags;
    use portlens_common::{PortSpec, ScanRequest};
    use std::net::Ipv6Addr;

    fn config_for(address: IpAddr) -> ScanConfig {
        let req = ScanRequest::new(address.to_string(), "80")
            .with_strategy(ScanStrategy::Syn)
            .with_timeout(Duration::from_millis(300));
        ScanConfig::new(&req, address, PortSpec::parse("80").unwrap())
    }

    #[test]
    fn test_open_reply_flags() {
        assert!(is_open_reply(tcp_flags::SYN | tcp_flags::ACK));
        assert!(is_open_reply(tcp_flags::SYN | tcp_flags::ACK | tcp_flags::PSH));
        assert!(!is_open_reply(tcp_flags::RST | tcp_flags::ACK));
        assert!(!is_open_reply(tcp_flags::SYN));
        assert!(!is_open_reply(tcp_flags::ACK));
    }

    #[test]
    fn capability_check_is_distinct() {
        match SynProber::new() {
            Ok(p) => assert!(p.requires_root()),
            Err(e) => {
                assert!(matches!(e, SynError::NotPermitted));
                assert!(matches!(
                    PortlensError::from(e),
                    PortlensError::PermissionDenied(_)
                ));
            }
        }
    }

    #[test]
    fn ipv6_target_rejected() {
        let cfg = config_for(IpAddr::V6(Ipv6Addr::LOCALHOST));
        let err = SynProber::target_v4(&cfg).unwrap_err();
        assert!(matches!(
            PortlensError::from(err),
            PortlensError::Unsupported(_)
        ));
    }

    #[test]
    fn exchange_without_socket_warns_once() {
        if SynProber::is_raw_available() {
            return;
        }
        let warned = AtomicBool::new(false);
        let probe = SynProbe {
            src: Ipv4Addr::LOCALHOST,
            dst: Ipv4Addr::LOCALHOST,
            src_port: 50000,
            dst_port: 80,
            seq: 1,
        };
        assert!(SynProber::exchange(probe, Duration::from_millis(10), &warned).is_none());
        assert!(warned.load(Ordering::Relaxed));
        assert!(SynProber::exchange(probe, Duration::from_millis(10), &warned).is_none());
    }

    #[tokio::test]
    async fn ipv6_probe_yields_nothing() {
        // target_v4 runs before any socket is touched
        if let Ok(prober) = SynProber::new() {
            let cfg = config_for(IpAddr::V6(Ipv6Addr::LOCALHOST));
            assert!(prober.probe(&cfg, 80).await.is_none());
            assert!(prober.prepare(&cfg).is_err());
        }
    }
}
