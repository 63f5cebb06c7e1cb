//! Test doubles and common utilities for contract tests
//!
//! This module provides in-memory stand-ins for the resolver and provider
//! that record every call the engine makes.

#![allow(dead_code)]

use dnsync_core::error::{Error, Result};
use dnsync_core::traits::{DnsProvider, DnsRecord, IpResolver, PublicAddress, RecordType, Zone};
use dnsync_core::{Credentials, ProviderConfig, SyncConfig};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IP resolver that always returns the same address
pub struct StaticIpResolver {
    address: String,
    resolve_call_count: Arc<AtomicUsize>,
}

impl StaticIpResolver {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a resolver that shares its call counter with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            address: other.address.clone(),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for StaticIpResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        PublicAddress::from_body(&self.address)
            .ok_or_else(|| Error::ip_lookup("Empty response body"))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// An IP resolver whose lookup always fails, like an endpoint that times out
pub struct FailingIpResolver;

#[async_trait::async_trait]
impl IpResolver for FailingIpResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        Err(Error::ip_lookup("Request failed: operation timed out"))
    }

    fn source_name(&self) -> &str {
        "failing"
    }
}

/// An in-memory DnsProvider that tracks calls
///
/// Updates are applied to the in-memory records so that final state can be
/// inspected after a run.
pub struct MockDnsProvider {
    /// Zones keyed by name
    zones: Arc<Mutex<HashMap<String, Zone>>>,
    /// Records keyed by zone id, in listing order
    records: Arc<Mutex<HashMap<String, Vec<DnsRecord>>>>,
    /// Zone names whose lookup fails with a provider error
    broken_zones: Arc<Mutex<HashSet<String>>>,
    /// Call counter for list_zones()
    list_zones_call_count: Arc<AtomicUsize>,
    /// Zone ids passed to list_records(), in call order
    listed_zone_ids: Arc<Mutex<Vec<String>>>,
    /// Records passed to update_record(), in call order
    updates: Arc<Mutex<Vec<DnsRecord>>>,
    /// Record updates without applying them
    dry_run: bool,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            zones: Arc::new(Mutex::new(HashMap::new())),
            records: Arc::new(Mutex::new(HashMap::new())),
            broken_zones: Arc::new(Mutex::new(HashSet::new())),
            list_zones_call_count: Arc::new(AtomicUsize::new(0)),
            listed_zone_ids: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            dry_run: false,
        }
    }

    /// Create a new MockDnsProvider that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            zones: Arc::clone(&other.zones),
            records: Arc::clone(&other.records),
            broken_zones: Arc::clone(&other.broken_zones),
            list_zones_call_count: Arc::clone(&other.list_zones_call_count),
            listed_zone_ids: Arc::clone(&other.listed_zone_ids),
            updates: Arc::clone(&other.updates),
            dry_run: other.dry_run,
        }
    }

    /// Accept updates without changing the stored records
    pub fn in_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Add a zone with no records
    pub fn with_zone(self, name: &str) -> Self {
        let zone = Zone {
            id: zone_id(name),
            name: name.to_string(),
        };
        self.records.lock().unwrap().entry(zone.id.clone()).or_default();
        self.zones.lock().unwrap().insert(name.to_string(), zone);
        self
    }

    /// Add a zone holding one A record named after the zone
    pub fn with_a_record(self, zone: &str, content: &str) -> Self {
        self.with_named_a_record(zone, zone, content)
    }

    /// Add an A record to a zone, creating the zone if needed
    pub fn with_named_a_record(self, zone: &str, name: &str, content: &str) -> Self {
        let provider = if self.zones.lock().unwrap().contains_key(zone) {
            self
        } else {
            self.with_zone(zone)
        };

        {
            let mut records = provider.records.lock().unwrap();
            let list = records.entry(zone_id(zone)).or_default();
            let id = format!("{}-rec-{}", zone_id(zone), list.len() + 1);
            list.push(DnsRecord {
                id,
                zone_id: zone_id(zone),
                name: name.to_string(),
                record_type: RecordType::A,
                content: content.to_string(),
                ttl: Some(1),
                proxied: Some(false),
            });
        }

        provider
    }

    /// Make zone lookups for `name` fail with a provider error
    pub fn with_broken_zone(self, name: &str) -> Self {
        self.broken_zones.lock().unwrap().insert(name.to_string());
        self
    }

    /// Get the number of times list_zones() was called
    pub fn list_zones_call_count(&self) -> usize {
        self.list_zones_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times list_records() was called
    pub fn list_records_call_count(&self) -> usize {
        self.listed_zone_ids.lock().unwrap().len()
    }

    /// Zone ids passed to list_records()
    pub fn listed_zone_ids(&self) -> Vec<String> {
        self.listed_zone_ids.lock().unwrap().clone()
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Records passed to update_record()
    pub fn updates(&self) -> Vec<DnsRecord> {
        self.updates.lock().unwrap().clone()
    }

    /// Current A records of a zone, in listing order
    pub fn records_of(&self, zone: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&zone_id(zone))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>> {
        self.list_zones_call_count.fetch_add(1, Ordering::SeqCst);

        if self.broken_zones.lock().unwrap().contains(name) {
            return Err(Error::provider("mock", "Zone listing failed: 500"));
        }

        Ok(self
            .zones
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .into_iter()
            .collect())
    }

    async fn list_records(&self, zone_id: &str, record_type: RecordType) -> Result<Vec<DnsRecord>> {
        self.listed_zone_ids.lock().unwrap().push(zone_id.to_string());

        Ok(self
            .records
            .lock()
            .unwrap()
            .get(zone_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.record_type == record_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_record(&self, record: &DnsRecord) -> Result<DnsRecord> {
        self.updates.lock().unwrap().push(record.clone());
        if self.dry_run {
            return Ok(record.clone());
        }

        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(&record.zone_id)
            .and_then(|list| list.iter_mut().find(|r| r.id == record.id))
            .ok_or_else(|| Error::record_not_found(record.id.clone()))?;
        *stored = record.clone();

        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Captures formatted log output for assertions
///
/// Installed as the thread default subscriber for as long as the guard
/// returned by [`LogCapture::install`] lives.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Everything logged so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).to_string()
    }

    /// Logged lines at `level` (e.g. "ERROR") that mention `needle`
    pub fn lines_with(&self, level: &str, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(level) && line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Zone id the mock assigns to a zone name
pub fn zone_id(name: &str) -> String {
    format!("zone-{}", name)
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(domains: &[&str]) -> SyncConfig {
    SyncConfig::new(
        ProviderConfig::Cloudflare {
            credentials: Credentials::ApiKey {
                email: "ops@example.com".to_string(),
                key: "test-key".to_string(),
            },
            dry_run: false,
        },
        domains.iter().map(|d| d.to_string()).collect(),
    )
}
