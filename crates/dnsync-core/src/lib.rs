// # dnsync-core
//
// Core library for keeping DNS A records pointed at the caller's public IP.
//
// ## Architecture Overview
//
// - **IpResolver**: Trait for discovering the current public address
// - **DnsProvider**: Trait for listing zones/records and updating record content
// - **SyncEngine**: Resolves the address once, then reconciles each domain in turn
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic lives here; remote calls live in plugin crates
// 2. **Run-once**: One sequential pass per invocation, nothing persisted between runs
// 3. **Contained failures**: One domain's failure never stops the others
// 4. **Fail closed**: No record is touched without a confirmed public address

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{Credentials, IpResolverConfig, ProviderConfig, SyncConfig};
pub use engine::{ReconcileOutcome, RunReport, SyncEngine};
pub use error::{Error, Result};
pub use traits::{DnsProvider, DnsRecord, IpResolver, PublicAddress, RecordType, Zone};
