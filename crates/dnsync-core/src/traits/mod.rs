//! Core traits for dnsync
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Discover the current public address
//! - [`DnsProvider`]: List zones and records, update record content

pub mod dns_provider;
pub mod ip_resolver;

pub use dns_provider::{DnsProvider, DnsRecord, RecordType, Zone};
pub use ip_resolver::{IpResolver, PublicAddress};
