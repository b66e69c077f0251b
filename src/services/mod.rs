//! HTTP services
pub mod records;
