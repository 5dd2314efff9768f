use std::fmt;
use std::net::Ipv4Addr;

/// Errors raised while validating a range before expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Input is not a dotted-quad IPv4 address (or a three-octet prefix)
    InvalidAddress(String),
    /// Start address is greater than the end address
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },
    /// Number of addresses in the range exceeds the allowed ceiling
    RangeTooLarge { limit: u64, requested: u64 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(input) => write!(f, "Invalid IP address: '{}'", input),
            Self::InvalidRange { start, end } => write!(
                f,
                "Start IP must be less than or equal to End IP ({} > {})",
                start, end
            ),
            Self::RangeTooLarge { limit, requested } => write!(
                f,
                "Range too large. Maximum {} IPs per operation. Total requested: {}",
                limit, requested
            ),
        }
    }
}

impl std::error::Error for RangeError {}
