//! Core sync engine
//!
//! The SyncEngine is responsible for:
//! - Resolving the public address once per run
//! - Locating the zone that owns each configured domain
//! - Comparing the zone's first A record with the public address
//! - Updating the record only when it has drifted
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │─── PublicAddress ───┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ SyncEngine   │
//!                            └──────────────┘
//!                                     │  for each domain
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ DnsProvider  │
//!                            │ zones → A    │
//!                            │ records → PUT│
//!                            └──────────────┘
//! ```
//!
//! ## Per-domain flow
//!
//! `Start → ZoneResolved → RecordFetched → {Updated | UpToDate | Failed}`
//!
//! Every state is visited at most once; nothing is retried within a run.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, IpResolver, PublicAddress, RecordType, Zone};
use tracing::{debug, error, info};

/// Result of reconciling one domain
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The record had drifted and was rewritten
    Updated {
        /// Content before the update
        previous: String,
        /// Content after the update
        current: String,
    },

    /// The record already pointed at the public address
    UpToDate,

    /// Reconciliation stopped early; nothing further was attempted
    Failed {
        /// Why it stopped
        error: Error,
    },
}

impl ReconcileOutcome {
    /// Whether this outcome is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, ReconcileOutcome::Failed { .. })
    }
}

/// Summary of one run
#[derive(Debug, Default)]
pub struct RunReport {
    /// The address every record was compared against
    pub address: Option<PublicAddress>,

    /// One entry per configured domain, in processing order
    pub outcomes: Vec<(String, ReconcileOutcome)>,
}

impl RunReport {
    /// Number of records rewritten
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ReconcileOutcome::Updated { .. }))
            .count()
    }

    /// Number of records that needed no change
    pub fn up_to_date(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ReconcileOutcome::UpToDate))
            .count()
    }

    /// Number of domains that could not be reconciled
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failed()).count()
    }

    /// Whether any domain failed
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Outcome for a domain, if it was processed
    pub fn outcome(&self, domain: &str) -> Option<&ReconcileOutcome> {
        self.outcomes
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, o)| o)
    }
}

/// Core sync engine
///
/// Owns the resolver and provider handles for a single, sequential run over
/// the configured domains. There is no shared mutable state between domains;
/// the public address is resolved once and only read afterwards.
pub struct SyncEngine {
    /// Public IP resolver
    ip_resolver: Box<dyn IpResolver>,

    /// DNS provider for listing and updating records
    provider: Box<dyn DnsProvider>,

    /// Domains to reconcile, in order
    domains: Vec<String>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// The configuration is validated before the engine is built. Domain names
    /// are trimmed and lose any trailing root dot, since zones are listed
    /// without it.
    pub fn new(
        ip_resolver: Box<dyn IpResolver>,
        provider: Box<dyn DnsProvider>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_resolver,
            provider,
            domains: config
                .domains
                .into_iter()
                .map(|d| d.trim().trim_end_matches('.').to_string())
                .collect(),
        })
    }

    /// Domains this engine reconciles
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Run one full pass
    ///
    /// Resolves the public address, then reconciles every domain in order.
    /// A failed address lookup aborts the run before any provider call is
    /// made. Per-domain failures are contained in the report.
    pub async fn run(&self) -> Result<RunReport> {
        let address = match self.ip_resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                error!(
                    "Could not determine public IP via {}, aborting run: {}",
                    self.ip_resolver.source_name(),
                    e
                );
                return Err(e);
            }
        };
        info!("Public IP: {}", address);

        let mut report = RunReport {
            address: Some(address.clone()),
            outcomes: Vec::with_capacity(self.domains.len()),
        };

        for domain in &self.domains {
            let outcome = self.reconcile(domain, &address).await;
            report.outcomes.push((domain.clone(), outcome));
        }

        info!(
            "Run finished: {} updated, {} up to date, {} failed",
            report.updated(),
            report.up_to_date(),
            report.failed()
        );

        Ok(report)
    }

    /// Reconcile one domain's first A record with `target`
    ///
    /// Never returns an error: any failure is logged with the domain name and
    /// reported as [`ReconcileOutcome::Failed`].
    pub async fn reconcile(&self, domain: &str, target: &PublicAddress) -> ReconcileOutcome {
        match self.try_reconcile(domain, target).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error updating DNS records for {}: {}", domain, e);
                ReconcileOutcome::Failed { error: e }
            }
        }
    }

    async fn try_reconcile(&self, domain: &str, target: &PublicAddress) -> Result<ReconcileOutcome> {
        let zone = self.locate_zone(domain).await?;

        let record = self.first_record(&zone).await?.ok_or_else(|| {
            Error::record_not_found(format!(
                "zone {} has no {} record",
                zone.name,
                RecordType::A
            ))
        })?;

        if target.as_str() == record.content {
            info!("DNS record for {} is already up to date", domain);
            return Ok(ReconcileOutcome::UpToDate);
        }

        info!(
            "Updating DNS record for {} ({}) to {}",
            domain, record.content, target
        );

        let desired = record.with_content(target.as_str());
        let stored = self
            .provider
            .update_record(&desired)
            .await
            .map_err(|e| self.provider_error(e))?;

        if self.provider.is_dry_run() {
            info!("DNS record for {} would be updated (dry-run)", domain);
        } else {
            info!("DNS record for {} updated!", domain);
        }

        Ok(ReconcileOutcome::Updated {
            previous: record.content,
            current: stored.content,
        })
    }

    /// Find the zone that owns `domain`
    ///
    /// Takes the first zone of the provider's listing; an empty listing is
    /// [`Error::ZoneNotFound`]. Failures are logged before being returned.
    pub async fn locate_zone(&self, domain: &str) -> Result<Zone> {
        let zones = match self.provider.list_zones(domain).await {
            Ok(zones) => zones,
            Err(e) => {
                let e = self.provider_error(e);
                error!("Error listing zones for {}: {}", domain, e);
                return Err(e);
            }
        };

        match zones.into_iter().next() {
            Some(zone) => {
                debug!("Zone for {}: {} ({})", domain, zone.name, zone.id);
                Ok(zone)
            }
            None => {
                let e = Error::zone_not_found(domain);
                error!("Error listing zones for {}: {}", domain, e);
                Err(e)
            }
        }
    }

    /// The first A record the provider lists for `zone`, if any
    ///
    /// Only one A record per zone is managed; any others are left untouched.
    async fn first_record(&self, zone: &Zone) -> Result<Option<DnsRecord>> {
        let records = self
            .provider
            .list_records(&zone.id, RecordType::A)
            .await
            .map_err(|e| self.provider_error(e))?;

        if records.len() > 1 {
            debug!(
                "Zone {} has {} A records, only the first is managed",
                zone.name,
                records.len()
            );
        }

        Ok(records.into_iter().next())
    }

    /// Tag untyped failures with the provider name
    fn provider_error(&self, e: Error) -> Error {
        match e {
            Error::Other(message) => Error::provider(self.provider.provider_name(), message),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes() {
        let report = RunReport {
            address: PublicAddress::from_body("203.0.113.7"),
            outcomes: vec![
                (
                    "example.com".to_string(),
                    ReconcileOutcome::Updated {
                        previous: "203.0.113.1".to_string(),
                        current: "203.0.113.7".to_string(),
                    },
                ),
                ("example.org".to_string(), ReconcileOutcome::UpToDate),
                (
                    "nosuchzone.test".to_string(),
                    ReconcileOutcome::Failed {
                        error: Error::zone_not_found("nosuchzone.test"),
                    },
                ),
            ],
        };

        assert_eq!(report.updated(), 1);
        assert_eq!(report.up_to_date(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.has_failures());
        assert!(matches!(
            report.outcome("example.org"),
            Some(ReconcileOutcome::UpToDate)
        ));
        assert!(report.outcome("missing.example").is_none());
    }

    #[test]
    fn empty_report_has_no_failures() {
        let report = RunReport::default();
        assert!(!report.has_failures());
        assert_eq!(report.updated(), 0);
    }
}
