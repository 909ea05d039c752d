//! portlens common - shared types and traits
//!
//! Core types, traits, and port parsing used across the portlens
//! workspace.

pub mod error;
pub mod ports;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{PortlensError, PortlensResult};
pub use ports::PortSpec;
pub use traits::{Prober, ResultSink, ScanObserver};
pub use types::{
    Observation, PortState, ScanConfig, ScanPhase, ScanRequest, ScanResult, ScanStrategy,
    NO_BANNER, NO_RESPONSE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
