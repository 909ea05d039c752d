//! Fingerprint - service identification
//!
//! Static port-to-service table used to label every observation.

mod services;

pub use services::{classify_service, is_well_known, UNKNOWN_SERVICE};
