//! TCP connect scanning: full-handshake prober plus banner capture.

mod banner;
mod scanner;

pub use banner::{decode_banner, stimulus_for, BannerGrabber, MAX_BANNER_BYTES};
pub use scanner::ConnectProber;
