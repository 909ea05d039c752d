//! UDP scanning
//!
//! Connectionless probing: a reply proves the port open, silence leaves it
//! `open|filtered`.

mod scanner;

pub use scanner::{UdpProber, MAX_UDP_BANNER_BYTES};
