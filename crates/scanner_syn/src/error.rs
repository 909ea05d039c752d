use portlens_common::PortlensError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynError {
    #[error("raw sockets not permitted (need root/CAP_NET_RAW)")]
    NotPermitted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no route to {0}")]
    NoRoute(String),

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl From<SynError> for PortlensError {
    fn from(e: SynError) -> Self {
        match e {
            SynError::NotPermitted => PortlensError::PermissionDenied(
                "SYN scan requires root/administrator privileges (CAP_NET_RAW)".to_string(),
            ),
            SynError::Io(io) => PortlensError::Io(io),
            SynError::NoRoute(target) => {
                PortlensError::Config(format!("no local route towards {}", target))
            }
            SynError::InvalidTarget(msg) => PortlensError::Unsupported(msg),
        }
    }
}
