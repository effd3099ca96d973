//! In-memory stores for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::store::{DeleteOutcome, HistoryStore, RateStore, StoreFuture};
use crate::{CalculationRecord, CurrencyCode, RateSnapshot, RecordId, UtcDateTime};

/// Thread-safe in-memory calculation history.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<CalculationRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append<'a>(
        &'a self,
        expression: &'a str,
        result: &'a str,
        timestamp: UtcDateTime,
    ) -> StoreFuture<'a, RecordId> {
        Box::pin(async move {
            let id = RecordId::generate();
            self.records.write().await.push(CalculationRecord {
                id,
                expression: expression.to_owned(),
                result: result.to_owned(),
                timestamp,
            });
            Ok(id)
        })
    }

    fn list(&self, limit: usize) -> StoreFuture<'_, Vec<CalculationRecord>> {
        Box::pin(async move {
            let records = self.records.read().await;
            // Later appends win ties, matching insertion order.
            let mut newest_first: Vec<CalculationRecord> = records.iter().rev().cloned().collect();
            newest_first.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
            newest_first.truncate(limit);
            Ok(newest_first)
        })
    }

    fn delete(&self, id: RecordId) -> StoreFuture<'_, DeleteOutcome> {
        Box::pin(async move {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|record| record.id != id);
            if records.len() < before {
                Ok(DeleteOutcome::Found)
            } else {
                Ok(DeleteOutcome::NotFound)
            }
        })
    }
}

/// Thread-safe in-memory rate snapshots keyed by base currency.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateStore {
    snapshots: Arc<RwLock<HashMap<CurrencyCode, RateSnapshot>>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bases with a stored snapshot.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

impl RateStore for InMemoryRateStore {
    fn find<'a>(&'a self, base: &'a CurrencyCode) -> StoreFuture<'a, Option<RateSnapshot>> {
        Box::pin(async move { Ok(self.snapshots.read().await.get(base).cloned()) })
    }

    fn upsert<'a>(
        &'a self,
        base: &'a CurrencyCode,
        snapshot: &'a RateSnapshot,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.snapshots
                .write()
                .await
                .insert(base.clone(), snapshot.clone());
            Ok(())
        })
    }
}
