//! Port specification parsing
//!
//! Accepts comma-separated tokens such as `22`, `80-90` or `1-3,5,7-9` and
//! produces a sorted, duplicate-free port list.

use crate::error::{PortlensError, PortlensResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Canonical port sequence: ascending, unique, every entry in 1..=65535.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSpec {
    ports: Vec<u16>,
}

impl PortSpec {
    /// Parse a textual specification into a canonical port set.
    pub fn parse(spec: &str) -> PortlensResult<Self> {
        let mut ports = BTreeSet::new();

        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_port(start, token)?;
                    let end = parse_port(end, token)?;
                    if start > end {
                        return Err(PortlensError::InvalidPortSpec(format!(
                            "range '{}' has start greater than end",
                            token
                        )));
                    }
                    ports.extend(start..=end);
                }
                None => {
                    ports.insert(parse_port(token, token)?);
                }
            }
        }

        if ports.is_empty() {
            return Err(PortlensError::InvalidPortSpec("no ports specified".to_string()));
        }

        Ok(Self {
            ports: ports.into_iter().collect(),
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

impl FromStr for PortSpec {
    type Err = PortlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ports.first(), self.ports.last()) {
            (Some(first), Some(last)) if first == last => write!(f, "{}", first),
            (Some(first), Some(last)) => {
                write!(f, "{} ports ({}-{})", self.ports.len(), first, last)
            }
            _ => f.write_str("no ports"),
        }
    }
}

/// Parse one port value; `token` is the enclosing token for error messages.
fn parse_port(value: &str, token: &str) -> PortlensResult<u16> {
    let value = value.trim();
    // Parse wider than u16 so 65536 reports as out of range rather than garbage.
    let n: u32 = value.parse().map_err(|_| {
        PortlensError::InvalidPortSpec(format!("'{}' is not a valid port or range", token))
    })?;

    if n == 0 || n > u32::from(u16::MAX) {
        return Err(PortlensError::InvalidPortSpec(format!(
            "port {} is outside 1-65535",
            n
        )));
    }

    Ok(n as u16)
}
