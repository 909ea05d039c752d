//! Raw IPv4/TCP socket wrapper
//!
//! One socket both sends hand-built SYNs (IP_HDRINCL) and receives copies
//! of every inbound TCP segment, IP header included.

use crate::error::SynError;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, ErrorKind, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

pub struct RawSocket {
    inner: Socket,
}

impl RawSocket {
    /// Open the socket. Fails with `NotPermitted` without CAP_NET_RAW.
    pub fn open() -> Result<Self, SynError> {
        let inner = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::TCP)).map_err(|e| {
            match e.kind() {
                ErrorKind::PermissionDenied => SynError::NotPermitted,
                _ => SynError::Io(e),
            }
        })?;
        inner.set_header_included(true)?;
        Ok(Self { inner })
    }

    pub fn send_to(&self, packet: &[u8], dst: Ipv4Addr) -> io::Result<()> {
        let addr = SockAddr::from(SocketAddr::new(IpAddr::V4(dst), 0));
        let sent = self.inner.send_to(packet, &addr)?;
        if sent != packet.len() {
            return Err(io::Error::new(ErrorKind::WriteZero, "short raw send"));
        }
        Ok(())
    }

    /// Receive one packet, waiting at most `wait`.
    ///
    /// Expiry surfaces as `WouldBlock` or `TimedOut` depending on platform.
    pub fn recv(&self, buf: &mut [u8], wait: Duration) -> io::Result<usize> {
        self.inner.set_read_timeout(Some(wait.max(Duration::from_millis(1))))?;
        (&self.inner).read(buf)
    }
}

/// Local address the kernel would use to reach `dst`.
///
/// Connecting a UDP socket selects a route without sending anything.
pub fn source_address_for(dst: Ipv4Addr) -> Result<Ipv4Addr, SynError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket
        .connect((dst, 9))
        .map_err(|_| SynError::NoRoute(dst.to_string()))?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(src) if !src.is_unspecified() => Ok(src),
        _ => Err(SynError::NoRoute(dst.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_source_address() {
        let src = source_address_for(Ipv4Addr::LOCALHOST).unwrap();
        assert!(src.is_loopback());
    }

    #[test]
    fn open_reports_missing_privilege_distinctly() {
        match RawSocket::open() {
            Ok(_) => {}
            Err(SynError::NotPermitted) => {}
            Err(e) => panic!("unexpected raw socket error: {}", e),
        }
    }
}
