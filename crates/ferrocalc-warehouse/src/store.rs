//! Async store contracts over the blocking `DuckDB` API.

use ferrocalc_core::{
    CalculationRecord, CurrencyCode, DeleteOutcome, HistoryStore, RateSnapshot, RateStore,
    RecordId, StoreError, StoreFuture, UtcDateTime,
};

use crate::{Warehouse, WarehouseError};

async fn run_blocking<T, F>(operation: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WarehouseError> + Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|error| StoreError::internal(format!("warehouse task failed: {error}")))?
        .map_err(StoreError::from)
}

impl HistoryStore for Warehouse {
    fn append<'a>(
        &'a self,
        expression: &'a str,
        result: &'a str,
        timestamp: UtcDateTime,
    ) -> StoreFuture<'a, RecordId> {
        let warehouse = self.clone();
        let expression = expression.to_owned();
        let result = result.to_owned();
        Box::pin(async move {
            run_blocking(move || warehouse.append_calculation(&expression, &result, timestamp)).await
        })
    }

    fn list(&self, limit: usize) -> StoreFuture<'_, Vec<CalculationRecord>> {
        let warehouse = self.clone();
        Box::pin(async move { run_blocking(move || warehouse.list_calculations(limit)).await })
    }

    fn delete(&self, id: RecordId) -> StoreFuture<'_, DeleteOutcome> {
        let warehouse = self.clone();
        Box::pin(async move { run_blocking(move || warehouse.delete_calculation(id)).await })
    }
}

impl RateStore for Warehouse {
    fn find<'a>(&'a self, base: &'a CurrencyCode) -> StoreFuture<'a, Option<RateSnapshot>> {
        let warehouse = self.clone();
        let base = base.clone();
        Box::pin(async move { run_blocking(move || warehouse.find_rates(&base)).await })
    }

    fn upsert<'a>(
        &'a self,
        base: &'a CurrencyCode,
        snapshot: &'a RateSnapshot,
    ) -> StoreFuture<'a, ()> {
        let warehouse = self.clone();
        let base = base.clone();
        let snapshot = snapshot.clone();
        Box::pin(async move { run_blocking(move || warehouse.upsert_rates(&base, &snapshot)).await })
    }
}
