use crate::RangeError;
use std::fmt;
use std::net::Ipv4Addr;

/// Parse a dotted-quad IPv4 address, ignoring surrounding whitespace
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr, RangeError> {
    input
        .trim()
        .parse()
        .map_err(|_| RangeError::InvalidAddress(input.to_string()))
}

/// Address with its dots replaced by hyphens (10.0.0.5 -> 10-0-0-5)
pub fn hyphenated(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{}-{}-{}-{}", a, b, c, d)
}

/// The first three octets of an IPv4 network (e.g. "192.168.1")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkPrefix([u8; 3]);

impl NetworkPrefix {
    pub fn new(octets: [u8; 3]) -> Self {
        Self(octets)
    }

    /// Parse a prefix of exactly three decimal octets
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let invalid = || RangeError::InvalidAddress(input.to_string());

        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut octets = [0u8; 3];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            octets[i] = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self(octets))
    }

    pub fn octets(&self) -> [u8; 3] {
        self.0
    }

    /// Full address for the given last octet
    pub fn with_host(&self, last: u8) -> Ipv4Addr {
        Ipv4Addr::new(self.0[0], self.0[1], self.0[2], last)
    }
}

impl fmt::Display for NetworkPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0[0], self.0[1], self.0[2])
    }
}
