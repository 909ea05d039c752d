//! Port-number based service identification

/// Label for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Map a port to the service usually listening there.
///
/// Total and pure: every port gets exactly one label.
#[inline]
#[must_use]
pub const fn classify_service(port: u16) -> &'static str {
    match port {
        21 => "FTP",
        22 => "SSH",
        23 => "Telnet",
        25 => "SMTP",
        53 => "DNS",
        80 => "HTTP",
        110 => "POP3",
        143 => "IMAP",
        443 => "HTTPS",
        993 => "IMAPS",
        995 => "POP3S",
        3306 => "MySQL",
        3389 => "RDP",
        5432 => "PostgreSQL",
        5900 => "VNC",
        6379 => "Redis",
        8080 => "HTTP-Proxy",
        8443 => "HTTPS-Alt",
        _ => UNKNOWN_SERVICE,
    }
}

/// Whether the port has an entry in the service table.
#[inline]
#[must_use]
pub fn is_well_known(port: u16) -> bool {
    classify_service(port) != UNKNOWN_SERVICE
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(u16, &str); 18] = [
        (21, "FTP"),
        (22, "SSH"),
        (23, "Telnet"),
        (25, "SMTP"),
        (53, "DNS"),
        (80, "HTTP"),
        (110, "POP3"),
        (143, "IMAP"),
        (443, "HTTPS"),
        (993, "IMAPS"),
        (995, "POP3S"),
        (3306, "MySQL"),
        (3389, "RDP"),
        (5432, "PostgreSQL"),
        (5900, "VNC"),
        (6379, "Redis"),
        (8080, "HTTP-Proxy"),
        (8443, "HTTPS-Alt"),
    ];

    #[test]
    fn well_known_ports() {
        for (port, label) in TABLE {
            assert_eq!(classify_service(port), label, "port {}", port);
            assert!(is_well_known(port));
        }
    }

    #[test]
    fn every_other_port_is_unknown() {
        let known: Vec<u16> = TABLE.iter().map(|(p, _)| *p).collect();
        let unknown = (0..=u16::MAX)
            .filter(|p| !known.contains(p))
            .filter(|&p| classify_service(p) == UNKNOWN_SERVICE)
            .count();
        assert_eq!(unknown, 65536 - TABLE.len());
        assert!(!is_well_known(12345));
    }
}
