//! Per-identity token quota enforcement.
//!
//! The ledger gates expensive LLM calls: `admit` checks the budget before any
//! work happens, `commit` charges the actual cost afterwards. Two concurrent
//! requests from one identity can both pass `admit` before either commits;
//! the quota is advisory, not a hard resource limit, so no cross-request
//! locking is attempted.

pub mod identity;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::quota::store::{UsageRecord, UsageStore};

/// Time source for window-reset logic, injected so tests are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Returned when an identity has exhausted its budget. Carries the counts
/// the 429 response surfaces to the client.
#[derive(Debug, Clone, Copy)]
pub struct QuotaExceeded {
    pub quota: u64,
    pub used: u64,
}

/// Proof of admission for one request. Threaded explicitly from the quota
/// check to the commit step instead of being stashed on the request.
#[derive(Debug, Clone)]
pub struct UsageHandle {
    identity: String,
    used: u64,
}

impl UsageHandle {
    /// Usage total observed at admission time.
    pub fn used(&self) -> u64 {
        self.used
    }
}

#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    quota: u64,
    /// `None` means a lifetime quota with no reset.
    window: Option<Duration>,
}

impl UsageLedger {
    pub fn new(
        store: Arc<dyn UsageStore>,
        clock: Arc<dyn Clock>,
        quota: u64,
        window: Option<Duration>,
    ) -> Self {
        Self {
            store,
            clock,
            quota,
            window,
        }
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Admits a request if the identity still has budget. Resets the record
    /// first when the configured window has elapsed since `last_reset`.
    /// Rejection consumes nothing.
    pub async fn admit(&self, identity: &str) -> Result<UsageHandle, QuotaExceeded> {
        let now = self.clock.now();

        let mut record = match self.store.get(identity).await {
            Some(record) => record,
            None => {
                let record = UsageRecord::new(now);
                self.store.put(identity, record.clone()).await;
                record
            }
        };

        if let Some(window) = self.window {
            if now - record.last_reset > window {
                record.used = 0;
                record.last_reset = now;
                self.store.put(identity, record.clone()).await;
            }
        }

        if record.used >= self.quota {
            return Err(QuotaExceeded {
                quota: self.quota,
                used: record.used,
            });
        }

        Ok(UsageHandle {
            identity: identity.to_string(),
            used: record.used,
        })
    }

    /// Charges `amount` against the admitted identity and returns the new
    /// total. Called only after the upstream call actually consumed tokens.
    pub async fn commit(&self, handle: &UsageHandle, amount: u64) -> u64 {
        self.store
            .increment(&handle.identity, amount, self.clock.now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::store::MemoryStore;
    use super::*;

    /// Manually advanced clock for window-reset tests.
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_at(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn daily_ledger(quota: u64, clock: Arc<ManualClock>) -> UsageLedger {
        UsageLedger::new(
            Arc::new(MemoryStore::default()),
            clock,
            quota,
            Some(Duration::hours(24)),
        )
    }

    #[tokio::test]
    async fn first_request_from_identity_is_admitted() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, clock);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(handle.used(), 0);
    }

    #[tokio::test]
    async fn commit_then_admit_reflects_exact_usage() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, clock);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(ledger.commit(&handle, 37).await, 37);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(handle.used(), 37);
    }

    #[tokio::test]
    async fn exhausted_identity_is_rejected_without_consuming() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, clock);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 100).await;

        for _ in 0..3 {
            let reject = ledger.admit("198.51.100.1").await.unwrap_err();
            assert_eq!(reject.quota, 100);
            assert_eq!(reject.used, 100);
        }
    }

    #[tokio::test]
    async fn last_unit_of_quota_is_usable() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, clock);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 99).await;

        // used = quota - 1: still admitted, and one more unit exhausts it.
        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(ledger.commit(&handle, 1).await, 100);
        assert!(ledger.admit("198.51.100.1").await.is_err());
    }

    #[tokio::test]
    async fn window_elapse_resets_usage() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, Arc::clone(&clock));

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 100).await;
        assert!(ledger.admit("198.51.100.1").await.is_err());

        clock.advance(Duration::hours(25));
        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(handle.used(), 0);
    }

    #[tokio::test]
    async fn usage_within_window_is_not_reset() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, Arc::clone(&clock));

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 60).await;

        clock.advance(Duration::hours(23));
        let handle = ledger.admit("198.51.100.1").await.unwrap();
        assert_eq!(handle.used(), 60);
    }

    #[tokio::test]
    async fn lifetime_ledger_never_resets() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = UsageLedger::new(
            Arc::new(MemoryStore::default()),
            Arc::clone(&clock) as Arc<dyn Clock>,
            100,
            None,
        );

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 100).await;

        clock.advance(Duration::days(365));
        assert!(ledger.admit("198.51.100.1").await.is_err());
    }

    #[tokio::test]
    async fn identities_are_independent() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let ledger = daily_ledger(100, clock);

        let handle = ledger.admit("198.51.100.1").await.unwrap();
        ledger.commit(&handle, 100).await;

        assert!(ledger.admit("198.51.100.1").await.is_err());
        assert!(ledger.admit("198.51.100.2").await.is_ok());
    }
}
