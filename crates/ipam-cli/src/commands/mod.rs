pub mod branch;
pub mod bulk;
pub mod device_type;
pub mod ip;
pub mod subnet;
