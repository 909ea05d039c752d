//! SYN packet building and reply parsing
//!
//! Layout written by `build_syn_packet`: 20-byte IPv4 header (no options)
//! followed by a 20-byte TCP header (no options, no payload).

use std::net::Ipv4Addr;

/// TCP flag constants
pub mod tcp_flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;

    pub const SYN_ACK: u8 = SYN | ACK;
}

pub const IPV4_HEADER_LEN: usize = 20;
pub const TCP_HEADER_LEN: usize = 20;
pub const SYN_PACKET_LEN: usize = IPV4_HEADER_LEN + TCP_HEADER_LEN;

const PROTO_TCP: u8 = 6;
const TTL: u8 = 64;
const WINDOW: u16 = 8192;

/// Addressing and sequencing of one outgoing SYN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynProbe {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
}

impl SynProbe {
    /// Whether `reply` answers this probe.
    ///
    /// An answer comes from the probed endpoint back to our source port and,
    /// when it acknowledges anything, acknowledges our SYN.
    #[must_use]
    pub fn is_answered_by(&self, reply: &TcpReply) -> bool {
        reply.src == self.dst
            && reply.src_port == self.dst_port
            && reply.dst_port == self.src_port
            && (reply.flags & tcp_flags::ACK == 0 || reply.ack == self.seq.wrapping_add(1))
    }
}

/// Build an IPv4 + TCP SYN packet with valid checksums.
#[must_use]
pub fn build_syn_packet(probe: &SynProbe, ip_id: u16) -> [u8; SYN_PACKET_LEN] {
    let mut buf = [0u8; SYN_PACKET_LEN];

    // IPv4 header
    buf[0] = 0x45; // Version 4, IHL 5
    buf[1] = 0x00; // DSCP/ECN
    buf[2..4].copy_from_slice(&(SYN_PACKET_LEN as u16).to_be_bytes());
    buf[4..6].copy_from_slice(&ip_id.to_be_bytes());
    buf[6..8].copy_from_slice(&0x4000u16.to_be_bytes()); // DF
    buf[8] = TTL;
    buf[9] = PROTO_TCP;
    buf[12..16].copy_from_slice(&probe.src.octets());
    buf[16..20].copy_from_slice(&probe.dst.octets());
    let ip_checksum = checksum(&buf[..IPV4_HEADER_LEN]);
    buf[10..12].copy_from_slice(&ip_checksum.to_be_bytes());

    // TCP header
    let tcp = &mut buf[IPV4_HEADER_LEN..];
    tcp[0..2].copy_from_slice(&probe.src_port.to_be_bytes());
    tcp[2..4].copy_from_slice(&probe.dst_port.to_be_bytes());
    tcp[4..8].copy_from_slice(&probe.seq.to_be_bytes());
    // ACK number stays 0
    tcp[12] = 0x50; // Data offset: 5 words
    tcp[13] = tcp_flags::SYN;
    tcp[14..16].copy_from_slice(&WINDOW.to_be_bytes());
    let tcp_checksum = tcp_checksum_v4(&probe.src, &probe.dst, tcp);
    tcp[16..18].copy_from_slice(&tcp_checksum.to_be_bytes());

    buf
}

/// TCP header fields of an incoming IPv4 packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpReply {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: u8,
}

impl TcpReply {
    /// SYN and ACK both set: the port accepted the handshake.
    #[inline]
    #[must_use]
    pub const fn is_syn_ack(&self) -> bool {
        self.flags & tcp_flags::SYN_ACK == tcp_flags::SYN_ACK
    }
}

/// Parse a raw IPv4 packet carrying TCP. Anything else yields `None`.
#[must_use]
pub fn parse_tcp_reply(buf: &[u8]) -> Option<TcpReply> {
    if buf.len() < IPV4_HEADER_LEN || buf[0] >> 4 != 4 || buf[9] != PROTO_TCP {
        return None;
    }

    let ihl = (buf[0] & 0x0f) as usize * 4;
    if ihl < IPV4_HEADER_LEN || buf.len() < ihl + TCP_HEADER_LEN {
        return None;
    }

    let tcp = &buf[ihl..];
    Some(TcpReply {
        src: Ipv4Addr::new(buf[12], buf[13], buf[14], buf[15]),
        dst: Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]),
        src_port: u16::from_be_bytes([tcp[0], tcp[1]]),
        dst_port: u16::from_be_bytes([tcp[2], tcp[3]]),
        seq: u32::from_be_bytes([tcp[4], tcp[5], tcp[6], tcp[7]]),
        ack: u32::from_be_bytes([tcp[8], tcp[9], tcp[10], tcp[11]]),
        flags: tcp[13],
    })
}

/// One's-complement sum folded to 16 bits, not yet inverted.
fn ones_complement_sum(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        sum += u16::from_be_bytes([pair[0], pair[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum
}

/// Internet checksum (RFC 1071).
#[inline]
fn checksum(data: &[u8]) -> u16 {
    !(ones_complement_sum(0, data) as u16)
}

/// TCP checksum with IPv4 pseudo-header
fn tcp_checksum_v4(src: &Ipv4Addr, dst: &Ipv4Addr, segment: &[u8]) -> u16 {
    let mut pseudo = [0u8; 12];
    pseudo[0..4].copy_from_slice(&src.octets());
    pseudo[4..8].copy_from_slice(&dst.octets());
    pseudo[9] = PROTO_TCP;
    pseudo[10..12].copy_from_slice(&(segment.len() as u16).to_be_bytes());

    let sum = ones_complement_sum(0, &pseudo);
    !(ones_complement_sum(sum, segment) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> SynProbe {
        SynProbe {
            src: Ipv4Addr::new(192, 168, 1, 10),
            dst: Ipv4Addr::new(192, 168, 1, 20),
            src_port: 40000,
            dst_port: 443,
            seq: 0xDEAD_BEEF,
        }
    }

    /// Turn our SYN into the SYN-ACK the target would send back.
    fn reply_to(probe: &SynProbe, flags: u8) -> [u8; SYN_PACKET_LEN] {
        let mirrored = SynProbe {
            src: probe.dst,
            dst: probe.src,
            src_port: probe.dst_port,
            dst_port: probe.src_port,
            seq: 12345,
        };
        let mut pkt = build_syn_packet(&mirrored, 7);
        pkt[IPV4_HEADER_LEN + 8..IPV4_HEADER_LEN + 12]
            .copy_from_slice(&probe.seq.wrapping_add(1).to_be_bytes());
        pkt[IPV4_HEADER_LEN + 13] = flags;
        pkt
    }

    #[test]
    fn builds_valid_ipv4_syn() {
        let p = probe();
        let pkt = build_syn_packet(&p, 0x1337);

        assert_eq!(pkt[0] >> 4, 4);
        assert_eq!(pkt[9], 6);
        assert_eq!(u16::from_be_bytes([pkt[2], pkt[3]]), 40);
        assert_eq!(pkt[IPV4_HEADER_LEN + 13], tcp_flags::SYN);
        assert_eq!(&pkt[12..16], &p.src.octets());
        assert_eq!(&pkt[16..20], &p.dst.octets());

        // A correct checksum makes the header sum to zero.
        assert_eq!(checksum(&pkt[..IPV4_HEADER_LEN]), 0);
        assert_eq!(tcp_checksum_v4(&p.src, &p.dst, &pkt[IPV4_HEADER_LEN..]), 0);
    }

    #[test]
    fn parses_own_packet() {
        let p = probe();
        let pkt = build_syn_packet(&p, 1);
        let parsed = parse_tcp_reply(&pkt).unwrap();
        assert_eq!(parsed.src, p.src);
        assert_eq!(parsed.dst, p.dst);
        assert_eq!(parsed.src_port, 40000);
        assert_eq!(parsed.dst_port, 443);
        assert_eq!(parsed.seq, 0xDEAD_BEEF);
        assert_eq!(parsed.flags, tcp_flags::SYN);
        assert!(!parsed.is_syn_ack());
    }

    #[test]
    fn matches_syn_ack_reply() {
        let p = probe();
        let reply = parse_tcp_reply(&reply_to(&p, tcp_flags::SYN_ACK)).unwrap();
        assert!(p.is_answered_by(&reply));
        assert!(reply.is_syn_ack());

        let rst = parse_tcp_reply(&reply_to(&p, tcp_flags::RST | tcp_flags::ACK)).unwrap();
        assert!(p.is_answered_by(&rst));
        assert!(!rst.is_syn_ack());
    }

    #[test]
    fn ignores_unrelated_traffic() {
        let p = probe();
        let mut other = p;
        other.src_port = 40001;
        let reply = parse_tcp_reply(&reply_to(&other, tcp_flags::SYN_ACK)).unwrap();
        assert!(!p.is_answered_by(&reply));

        let mut wrong_ack = reply_to(&p, tcp_flags::SYN_ACK);
        wrong_ack[IPV4_HEADER_LEN + 8..IPV4_HEADER_LEN + 12].copy_from_slice(&1u32.to_be_bytes());
        assert!(!p.is_answered_by(&parse_tcp_reply(&wrong_ack).unwrap()));
    }

    #[test]
    fn rejects_short_or_foreign_packets() {
        assert!(parse_tcp_reply(&[0u8; 10]).is_none());
        let mut udp = build_syn_packet(&probe(), 1);
        udp[9] = 17;
        assert!(parse_tcp_reply(&udp).is_none());
        let mut v6 = build_syn_packet(&probe(), 1);
        v6[0] = 0x60;
        assert!(parse_tcp_reply(&v6).is_none());
    }

    #[test]
    fn odd_length_checksum() {
        // 0x0102 + 0x0300 = 0x0402 -> !0x0402
        assert_eq!(checksum(&[0x01, 0x02, 0x03]), !0x0402u16);
    }
}
