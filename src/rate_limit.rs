use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

use crate::metrics::QUOTA_RECORDS;

// Rate limit entry - tracks requests per identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    pub remaining: u32,
    /// Set only when the request was denied.
    pub reset_time: Option<DateTime<Utc>>,
}

/// In-memory fixed-window quota table, keyed by client identifier.
///
/// Records are never persisted; a restart forgets every window.
pub struct QuotaLedger {
    records: DashMap<String, QuotaRecord>,
    limit: u32,
    window: TimeDelta,
}

impl QuotaLedger {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            records: DashMap::new(),
            limit,
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn check_and_admit(&self, identifier: &str) -> Admission {
        self.check_and_admit_at(identifier, Utc::now())
    }

    /// Sweeps expired records, then admits or denies `identifier` as of `now`.
    ///
    /// The decision and the increment happen while the entry's shard lock is
    /// held, so concurrent callers for the same identifier never both take the
    /// last slot.
    pub fn check_and_admit_at(&self, identifier: &str, now: DateTime<Utc>) -> Admission {
        self.sweep_at(now);

        let mut entry = self
            .records
            .entry(identifier.to_string())
            .or_insert(QuotaRecord {
                count: 0,
                window_start: now,
            });

        // window expired..? reset it
        if self.is_expired(&entry, now) {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count < self.limit {
            entry.count += 1;
            return Admission {
                allowed: true,
                remaining: self.limit - entry.count,
                reset_time: None,
            };
        }

        Admission {
            allowed: false,
            remaining: 0,
            reset_time: Some(self.reset_time(&entry)),
        }
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    // Drops every record whose window has run out, returns how many went
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !self.is_expired(record, now));
        before.saturating_sub(self.records.len())
    }

    pub fn record(&self, identifier: &str) -> Option<QuotaRecord> {
        self.records.get(identifier).map(|r| *r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn is_expired(&self, record: &QuotaRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.window_start) > self.window
    }

    fn reset_time(&self, record: &QuotaRecord) -> DateTime<Utc> {
        record
            .window_start
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

// Background sweep - complements the per-request sweep for idle processes
pub async fn quota_sweeper(ledger: Arc<QuotaLedger>, every: Duration) {
    // tokio intervals must be non-zero
    let every = every.max(Duration::from_secs(1));
    let mut interval = interval(every);

    info!(interval = ?every, "Quota sweeper started");

    loop {
        interval.tick().await;

        let removed = ledger.sweep();
        QUOTA_RECORDS.set(ledger.len() as f64);

        if removed > 0 {
            debug!(removed, remaining = ledger.len(), "Swept expired quota records");
        }
    }
}
