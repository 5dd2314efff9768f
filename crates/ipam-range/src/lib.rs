//! IPv4 range expansion for bulk address allocation
//!
//! This library turns a start/end address pair (or a /24 network prefix with
//! a first and last octet) into a lazy sequence of candidate addresses, each
//! paired with a derived device name. It performs no I/O and can be used by
//! any inventory backend or client.

pub mod address;
pub mod error;
pub mod expander;

pub use address::{hyphenated, parse_ipv4, NetworkPrefix};
pub use error::RangeError;
pub use expander::{device_name, Candidate, NamingMode, RangeExpander, RangeSpec};
