//! Usage bookkeeping store.
//!
//! The store is injected behind a trait so tests can substitute a fake and
//! so the in-memory map can later be swapped for a persistent backend
//! without touching the ledger or handlers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Per-identity consumption record. The only state in the service that
/// outlives a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub used: u64,
    pub last_reset: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl UsageRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            used: 0,
            last_reset: now,
            last_used: now,
        }
    }
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn get(&self, identity: &str) -> Option<UsageRecord>;

    async fn put(&self, identity: &str, record: UsageRecord);

    /// Adds `amount` to the record, stamping `last_used`. Creates the record
    /// if it does not exist. Returns the new total.
    async fn increment(&self, identity: &str, amount: u64, now: DateTime<Utc>) -> u64;
}

/// Process-wide in-memory store keyed by client identity.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, UsageRecord>>,
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn get(&self, identity: &str) -> Option<UsageRecord> {
        self.records.read().await.get(identity).cloned()
    }

    async fn put(&self, identity: &str, record: UsageRecord) {
        self.records
            .write()
            .await
            .insert(identity.to_string(), record);
    }

    async fn increment(&self, identity: &str, amount: u64, now: DateTime<Utc>) -> u64 {
        let mut records = self.records.write().await;
        let record = records
            .entry(identity.to_string())
            .or_insert_with(|| UsageRecord::new(now));
        record.used += amount;
        record.last_used = now;
        record.used
    }
}
