//! Core data types for the portlens scan engine
//!
//! - `ScanRequest` carries raw operator input
//! - `ScanConfig` is the resolved, immutable view shared by every worker
//! - `Observation` is one positive finding for one port
//! - `ScanResult` is the aggregate handed to result sinks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PortlensError;
use crate::ports::PortSpec;

/// Banner text used when a connected service sent nothing readable.
pub const NO_BANNER: &str = "No banner";

/// Banner text used when a UDP probe got no reply.
pub const NO_RESPONSE: &str = "No response";

/// Probing strategy, chosen once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    #[default]
    Connect,
    Syn,
    Udp,
}

impl ScanStrategy {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ScanStrategy::Connect => "connect",
            ScanStrategy::Syn => "syn",
            ScanStrategy::Udp => "udp",
        }
    }

    /// Transport label used in `port/proto` columns.
    #[inline]
    #[must_use]
    pub const fn transport(&self) -> &'static str {
        match self {
            ScanStrategy::Connect | ScanStrategy::Syn => "tcp",
            ScanStrategy::Udp => "udp",
        }
    }

    /// Whether the strategy needs raw-socket privilege.
    #[inline]
    #[must_use]
    pub const fn requires_root(&self) -> bool {
        matches!(self, ScanStrategy::Syn)
    }
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ScanStrategy {
    type Err = PortlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "connect" | "tcp" => Ok(ScanStrategy::Connect),
            "syn" => Ok(ScanStrategy::Syn),
            "udp" => Ok(ScanStrategy::Udp),
            other => Err(PortlensError::Config(format!("unknown scan type '{}'", other))),
        }
    }
}

/// Reachability of a port that produced an observation.
///
/// Closed and filtered ports never produce one, so they have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    Open,
    OpenOrFiltered,
}

impl PortState {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PortState::Open => "open",
            PortState::OpenOrFiltered => "open|filtered",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PortState {
    type Err = PortlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(PortState::Open),
            "open|filtered" | "open_or_filtered" => Ok(PortState::OpenOrFiltered),
            other => Err(PortlensError::Config(format!("unknown port state '{}'", other))),
        }
    }
}

/// Positive result of probing one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub port: u16,
    pub state: PortState,
    pub service: String,
    pub banner: String,
    pub strategy: ScanStrategy,
}

impl Observation {
    #[inline]
    #[must_use]
    pub fn new<S: Into<String>>(
        port: u16,
        state: PortState,
        service: S,
        strategy: ScanStrategy,
    ) -> Self {
        Self {
            port,
            state,
            service: service.into(),
            banner: String::new(),
            strategy,
        }
    }

    /// Builder: attach banner text.
    #[inline]
    #[must_use]
    pub fn with_banner<S: Into<String>>(mut self, banner: S) -> Self {
        self.banner = banner.into();
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, PortState::Open)
    }
}

/// Raw scan parameters as supplied by the operator.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub target: String,
    pub ports: String,
    pub threads: usize,
    pub timeout: Duration,
    pub strategy: ScanStrategy,
    /// Probes per second across all workers; `None` means unlimited.
    pub rate_limit: Option<u32>,
}

impl ScanRequest {
    pub const DEFAULT_THREADS: usize = 100;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

    #[must_use]
    pub fn new<T: Into<String>, P: Into<String>>(target: T, ports: P) -> Self {
        Self {
            target: target.into(),
            ports: ports.into(),
            threads: Self::DEFAULT_THREADS,
            timeout: Self::DEFAULT_TIMEOUT,
            strategy: ScanStrategy::default(),
            rate_limit: None,
        }
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Option<u32>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Reject settings no scan could run with.
    pub fn validate(&self) -> Result<(), PortlensError> {
        if self.target.trim().is_empty() {
            return Err(PortlensError::Config("no target specified".to_string()));
        }
        if self.threads == 0 {
            return Err(PortlensError::Config("thread count must be at least 1".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(PortlensError::Config("timeout must be greater than zero".to_string()));
        }
        if self.rate_limit == Some(0) {
            return Err(PortlensError::Config("rate limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Resolved scan parameters, built once and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target as the operator wrote it.
    pub target: String,
    pub address: IpAddr,
    pub ports: PortSpec,
    pub threads: usize,
    pub timeout: Duration,
    pub strategy: ScanStrategy,
}

impl ScanConfig {
    #[must_use]
    pub fn new(request: &ScanRequest, address: IpAddr, ports: PortSpec) -> Self {
        Self {
            target: request.target.trim().to_string(),
            address,
            ports,
            threads: request.threads,
            timeout: request.timeout,
            strategy: request.strategy,
        }
    }

    /// Number of workers actually worth spawning.
    #[inline]
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.threads.min(self.ports.len()).max(1)
    }
}

/// Aggregate outcome of one scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub target: String,
    pub address: IpAddr,
    pub strategy: ScanStrategy,
    /// Observations in completion order.
    pub observations: Vec<Observation>,
    pub duration: Duration,
    pub port_count: usize,
    /// Ports whose probe finished (equals `port_count` for a complete scan).
    pub probed: usize,
}

impl ScanResult {
    #[inline]
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    #[inline]
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_open()).count()
    }

    /// Observations ordered by port, for reporting.
    #[must_use]
    pub fn sorted_by_port(&self) -> Vec<&Observation> {
        let mut sorted: Vec<&Observation> = self.observations.iter().collect();
        sorted.sort_by_key(|o| o.port);
        sorted
    }
}

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Resolving,
    Scanning { pending: usize },
    Done,
    Aborted,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Idle => f.write_str("idle"),
            ScanPhase::Resolving => f.write_str("resolving"),
            ScanPhase::Scanning { pending } => write!(f, "scanning ({} pending)", pending),
            ScanPhase::Done => f.write_str("done"),
            ScanPhase::Aborted => f.write_str("aborted"),
        }
    }
}
