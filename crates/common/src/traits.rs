//! Core traits for portlens components

use crate::error::PortlensResult;
use crate::types::{Observation, ScanConfig, ScanResult, ScanStrategy};
use async_trait::async_trait;
use std::path::PathBuf;

/// A probing strategy: one port in, at most one observation out.
///
/// Implementations must bound every wait by `config.timeout` and swallow
/// transport errors, returning `None` instead.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port of `config.address`.
    async fn probe(&self, config: &ScanConfig, port: u16) -> Option<Observation>;

    /// Check the resolved configuration once, before any port is probed.
    fn prepare(&self, _config: &ScanConfig) -> PortlensResult<()> {
        Ok(())
    }

    /// Strategy this prober implements.
    fn strategy(&self) -> ScanStrategy;

    /// Prober name/identifier
    fn name(&self) -> &str;

    /// Whether this prober requires root/CAP_NET_RAW
    fn requires_root(&self) -> bool {
        self.strategy().requires_root()
    }
}

/// Receives observations as they arrive, while the scan is still running.
pub trait ScanObserver: Send + Sync {
    fn on_observation(&self, observation: &Observation);
}

/// Persists a finished scan.
pub trait ResultSink {
    /// Write the result and return where it went.
    fn write(&self, result: &ScanResult) -> PortlensResult<PathBuf>;

    /// Format name, e.g. "json".
    fn format(&self) -> &'static str;
}
