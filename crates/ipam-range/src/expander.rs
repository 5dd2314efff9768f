use crate::{address, NetworkPrefix, RangeError};
use std::net::Ipv4Addr;

/// How device names are derived from an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingMode {
    /// `prefix-a-b-c-d`, used for full four-octet ranges
    Dotted,
    /// `prefix-d`, used for last-octet ranges inside a fixed /24 prefix
    LastOctet,
}

/// Derive the device name for an address
pub fn device_name(prefix: &str, ip: Ipv4Addr, mode: NamingMode) -> String {
    match mode {
        NamingMode::Dotted => format!("{}-{}", prefix, address::hyphenated(ip)),
        NamingMode::LastOctet => format!("{}-{}", prefix, ip.octets()[3]),
    }
}

/// A validated, inclusive range of IPv4 addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    start: u32,
    end: u32,
    naming: NamingMode,
}

impl RangeSpec {
    /// Build a range from two addresses; `start` must not be above `end`
    pub fn new(start: Ipv4Addr, end: Ipv4Addr, naming: NamingMode) -> Result<Self, RangeError> {
        if u32::from(start) > u32::from(end) {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self {
            start: start.into(),
            end: end.into(),
            naming,
        })
    }

    /// Full four-octet form, e.g. ("10.0.0.5", "10.0.1.20")
    pub fn from_addresses(start: &str, end: &str) -> Result<Self, RangeError> {
        let start = address::parse_ipv4(start)?;
        let end = address::parse_ipv4(end)?;
        Self::new(start, end, NamingMode::Dotted)
    }

    /// Last-octet form inside a fixed network prefix, e.g. ("10.0.0", 5, 20)
    pub fn from_octets(prefix: &str, start: u8, end: u8) -> Result<Self, RangeError> {
        let prefix = NetworkPrefix::parse(prefix)?;
        Self::new(prefix.with_host(start), prefix.with_host(end), NamingMode::LastOctet)
    }

    pub fn start(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start)
    }

    pub fn end(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end)
    }

    pub fn end_u32(&self) -> u32 {
        self.end
    }

    pub fn naming(&self) -> NamingMode {
        self.naming
    }

    /// Number of addresses in the range (`end - start + 1`)
    pub fn total(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    /// Reject the range when it holds more than `limit` addresses
    pub fn ensure_within(&self, limit: u64) -> Result<(), RangeError> {
        let requested = self.total();
        if requested > limit {
            return Err(RangeError::RangeTooLarge { limit, requested });
        }
        Ok(())
    }

    pub fn expander(&self, name_prefix: impl Into<String>) -> RangeExpander {
        RangeExpander::new(*self, name_prefix)
    }
}

/// One address produced by a [`RangeExpander`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ip_address: Ipv4Addr,
    pub device_name: String,
}

/// Lazily enumerates a [`RangeSpec`] in ascending order.
///
/// The cursor is kept as a `u64` so a range ending at 255.255.255.255
/// terminates cleanly. Enumeration can be paused between chunks and
/// restarted from the beginning with [`RangeExpander::reset`].
#[derive(Debug, Clone)]
pub struct RangeExpander {
    spec: RangeSpec,
    name_prefix: String,
    cursor: u64,
}

impl RangeExpander {
    pub fn new(spec: RangeSpec, name_prefix: impl Into<String>) -> Self {
        Self {
            spec,
            name_prefix: name_prefix.into(),
            cursor: u64::from(spec.start),
        }
    }

    /// Number of candidates already produced
    pub fn position(&self) -> u64 {
        self.cursor - u64::from(self.spec.start)
    }

    pub fn remaining(&self) -> u64 {
        (u64::from(self.spec.end) + 1).saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Rewind to the first address of the range
    pub fn reset(&mut self) {
        self.cursor = u64::from(self.spec.start);
    }

    /// Take up to `size` candidates, advancing the cursor
    pub fn next_chunk(&mut self, size: usize) -> Vec<Candidate> {
        let take = self.remaining().min(size as u64) as usize;
        let mut chunk = Vec::with_capacity(take);
        chunk.extend(self.by_ref().take(take));
        chunk
    }

    /// First `count` candidates of the range, without moving the cursor
    pub fn preview(&self, count: usize) -> Vec<Candidate> {
        let mut copy = self.clone();
        copy.reset();
        copy.take(count).collect()
    }

    fn candidate(&self, value: u32) -> Candidate {
        let ip_address = Ipv4Addr::from(value);
        Candidate {
            ip_address,
            device_name: device_name(&self.name_prefix, ip_address, self.spec.naming),
        }
    }
}

impl Iterator for RangeExpander {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor > u64::from(self.spec.end) {
            return None;
        }
        let value = self.cursor as u32;
        self.cursor += 1;
        Some(self.candidate(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
