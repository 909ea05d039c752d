//! Half-open SYN scanning
//!
//! Requires raw-socket privilege (root or CAP_NET_RAW). The capability is
//! checked once by `SynProber::new`; probes never surface privilege errors.
//!
//! IPv4 targets only.

pub mod error;
pub mod packet;
mod raw;
pub mod syn;

pub use error::SynError;
pub use packet::tcp_flags;
pub use syn::{is_open_reply, SynProber};

/// Verify raw socket permissions and build the SYN prober.
///
/// Call once at startup, before the scan is configured.
pub fn init() -> Result<SynProber, SynError> {
    SynProber::new()
}
