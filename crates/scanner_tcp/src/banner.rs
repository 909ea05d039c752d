//! Banner grabbing functionality

use anyhow::{bail, Result};
use portlens_common::NO_BANNER;
use std::borrow::Cow;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, instrument};

/// Upper bound on bytes read for a banner.
pub const MAX_BANNER_BYTES: usize = 1024;

const HTTP_GET: &[u8] = b"GET / HTTP/1.1\r\nHost: {host}\r\n\r\n";
const SSH_HELLO: &[u8] = b"SSH-2.0-OpenSSH_8.2p1\r\n";
const FTP_USER: &[u8] = b"USER anonymous\r\n";
const SMTP_EHLO: &[u8] = b"EHLO {host}\r\n";
/// Standard query, recursion desired, one question: example.com IN A.
const DNS_QUERY: &[u8] =
    b"\x00\x01\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\x07example\x03com\x00\x00\x01\x00\x01";

/// Stimulus to send before reading, if the port has one.
///
/// `{host}` in a template is replaced by `host`.
#[must_use]
pub fn stimulus_for(port: u16, host: &str) -> Option<Cow<'static, [u8]>> {
    let template = match port {
        80 | 443 => HTTP_GET,
        22 => SSH_HELLO,
        21 => FTP_USER,
        25 => SMTP_EHLO,
        53 => DNS_QUERY,
        _ => return None,
    };
    Some(substitute_host(template, host))
}

fn substitute_host(template: &'static [u8], host: &str) -> Cow<'static, [u8]> {
    const MARKER: &[u8] = b"{host}";
    match template.windows(MARKER.len()).position(|w| w == MARKER) {
        Some(at) => {
            let mut out = Vec::with_capacity(template.len() + host.len());
            out.extend_from_slice(&template[..at]);
            out.extend_from_slice(host.as_bytes());
            out.extend_from_slice(&template[at + MARKER.len()..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(template),
    }
}

/// Turn raw banner bytes into display text.
///
/// Invalid UTF-8 is replaced, surrounding whitespace trimmed.
#[must_use]
pub fn decode_banner(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

pub struct BannerGrabber {
    timeout: Duration,
}

impl BannerGrabber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Grab a banner from a connected stream.
    ///
    /// Always yields text: the banner, or `NO_BANNER` when nothing usable
    /// came back.
    #[instrument(skip(self, stream))]
    pub async fn grab<S>(&self, stream: &mut S, port: u16, host: &str) -> String
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.try_grab(stream, port, host).await {
            Ok(banner) if !banner.is_empty() => banner,
            Ok(_) => {
                debug!("Empty banner");
                NO_BANNER.to_string()
            }
            Err(e) => {
                debug!("No banner: {}", e);
                NO_BANNER.to_string()
            }
        }
    }

    async fn try_grab<S>(&self, stream: &mut S, port: u16, host: &str) -> Result<String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Some(payload) = stimulus_for(port, host) {
            match timeout(self.timeout, stream.write_all(&payload)).await {
                Ok(Ok(())) => debug!("Sent {} byte stimulus", payload.len()),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => bail!("stimulus write timed out"),
            }
        }

        let mut buf = vec![0u8; MAX_BANNER_BYTES];
        match timeout(self.timeout, stream.read(&mut buf)).await {
            Ok(Ok(0)) => bail!("connection closed without data"),
            Ok(Ok(n)) => {
                debug!("Banner grab: {} bytes", n);
                Ok(decode_banner(&buf[..n]))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => bail!("banner read timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_banner_grabber_creation() {
        let grabber = BannerGrabber::new(Duration::from_secs(2));
        assert_eq!(grabber.timeout, Duration::from_secs(2));
    }

    #[test]
    fn stimulus_templates() {
        assert_eq!(
            stimulus_for(80, "example.org").unwrap().into_owned(),
            b"GET / HTTP/1.1\r\nHost: example.org\r\n\r\n"
        );
        assert_eq!(
            stimulus_for(25, "10.0.0.1").unwrap().into_owned(),
            b"EHLO 10.0.0.1\r\n"
        );
        assert_eq!(stimulus_for(21, "x").unwrap().into_owned(), b"USER anonymous\r\n");
        assert!(stimulus_for(22, "x").unwrap().starts_with(b"SSH-2.0-"));
        assert_eq!(stimulus_for(53, "x").unwrap().len(), DNS_QUERY.len());
        assert!(stimulus_for(3306, "x").is_none());
    }

    #[test]
    fn decoding_is_lossy_and_trimmed() {
        assert_eq!(decode_banner(b"  220 ready\r\n"), "220 ready");
        assert_eq!(decode_banner(b"ok\xff\xfe"), "ok\u{fffd}\u{fffd}");
        assert_eq!(decode_banner(b"\r\n"), "");
    }

    #[tokio::test]
    async fn grabs_passive_banner() {
        let (mut client, mut server) = duplex(4096);
        server.write_all(b"SSH-2.0-test\r\n").await.unwrap();

        let grabber = BannerGrabber::new(Duration::from_millis(500));
        let banner = grabber.grab(&mut client, 2222, "localhost").await;
        assert_eq!(banner, "SSH-2.0-test");
    }

    #[tokio::test]
    async fn sends_stimulus_then_reads() {
        let (mut client, mut server) = duplex(4096);
        let server_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 256];
            let n = server.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            server.write_all(b"HTTP/1.1 200 OK\r\n\r\n").await.unwrap();
            request
        });

        let grabber = BannerGrabber::new(Duration::from_millis(500));
        let banner = grabber.grab(&mut client, 80, "example.org").await;
        assert_eq!(banner, "HTTP/1.1 200 OK");

        let request = server_task.await.unwrap();
        assert!(request.contains("Host: example.org"));
    }

    #[tokio::test]
    async fn silent_peer_yields_sentinel() {
        let (mut client, _server) = duplex(4096);
        let grabber = BannerGrabber::new(Duration::from_millis(50));
        assert_eq!(grabber.grab(&mut client, 9999, "localhost").await, NO_BANNER);
    }

    #[tokio::test]
    async fn closed_peer_yields_sentinel() {
        let (mut client, server) = duplex(4096);
        drop(server);
        let grabber = BannerGrabber::new(Duration::from_millis(200));
        assert_eq!(grabber.grab(&mut client, 9999, "localhost").await, NO_BANNER);
    }

    #[tokio::test]
    async fn read_is_bounded() {
        let (mut client, mut server) = duplex(8192);
        server.write_all(&[b'a'; 4000]).await.unwrap();
        let grabber = BannerGrabber::new(Duration::from_millis(200));
        let banner = grabber.grab(&mut client, 9999, "localhost").await;
        assert!(banner.len() <= MAX_BANNER_BYTES);
    }
}
