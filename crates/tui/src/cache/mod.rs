//! Local cache of the server-owned expense data.
//!
//! [`ExpenseCache`] is the single place the rest of the app reads expense
//! records from. It never predicts what the service will store: every
//! successful mutation is followed by a full reload of the list and both
//! summaries, so server-assigned fields (ids, timestamps) are always the
//! server's own values. A failed mutation leaves every cached value exactly
//! as it was.
//!
//! The cache is owned by the single-threaded event loop and fetched through
//! `&mut self`, so at most one fetch per query is in flight and results
//! apply strictly in completion order.

use api_types::expense::{Expense, ExpenseCreate, ExpenseUpdate};
use api_types::summary::{CategorySummary, MonthlySummary};

use crate::client::{ApiError, Client};

/// One cached server query: the last-known value plus fetch bookkeeping.
///
/// While a fetch is in flight the previous value stays readable and
/// `is_loading` reports true; a failed fetch records the error without
/// touching the value.
#[derive(Debug)]
pub struct CachedQuery<T> {
    data: Option<T>,
    loading: bool,
    stale: bool,
    error: Option<ApiError>,
}

impl<T> Default for CachedQuery<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            stale: false,
            error: None,
        }
    }
}

impl<T> CachedQuery<T> {
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a mutation has happened since this value was fetched.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    fn begin(&mut self) {
        self.loading = true;
    }

    /// Applies a completed fetch. On success the value replaces the cached
    /// one and the stale mark clears; on failure the value and the stale
    /// mark are untouched and the error is recorded as well as returned.
    fn finish(&mut self, result: Result<T, ApiError>) -> Result<(), ApiError> {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.stale = false;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// The expense list and the two server summaries, each cached under its own
/// key and invalidated together.
#[derive(Debug, Default)]
pub struct ExpenseCache {
    list: CachedQuery<Vec<Expense>>,
    by_category: CachedQuery<Vec<CategorySummary>>,
    by_month: CachedQuery<Vec<MonthlySummary>>,
}

impl ExpenseCache {
    /// The last-known record list, `None` before the first successful fetch.
    pub fn expenses(&self) -> Option<&[Expense]> {
        self.list.data().map(Vec::as_slice)
    }

    pub fn list(&self) -> &CachedQuery<Vec<Expense>> {
        &self.list
    }

    pub fn by_category(&self) -> &CachedQuery<Vec<CategorySummary>> {
        &self.by_category
    }

    pub fn by_month(&self) -> &CachedQuery<Vec<MonthlySummary>> {
        &self.by_month
    }

    /// Marks every cached query stale. Readers keep seeing the previous
    /// values until the next fetch replaces them.
    pub fn invalidate(&mut self) {
        self.list.stale = true;
        self.by_category.stale = true;
        self.by_month.stale = true;
    }

    /// Reloads the record list.
    pub async fn fetch_all(&mut self, client: &Client) -> Result<(), ApiError> {
        self.list.begin();
        let result = client.list().await;
        self.list.finish(result)
    }

    pub async fn fetch_category_summary(&mut self, client: &Client) -> Result<(), ApiError> {
        self.by_category.begin();
        let result = client.category_summary().await;
        self.by_category.finish(result)
    }

    pub async fn fetch_monthly_summary(&mut self, client: &Client) -> Result<(), ApiError> {
        self.by_month.begin();
        let result = client.monthly_summary().await;
        self.by_month.finish(result)
    }

    /// Invalidates and reloads everything. The summaries are derived from
    /// the same records as the list, so they are never refreshed separately.
    ///
    /// All three queries are attempted even when one fails; the first error
    /// is returned and each query keeps its own error flag.
    pub async fn refresh(&mut self, client: &Client) -> Result<(), ApiError> {
        self.invalidate();
        let list = self.fetch_all(client).await;
        let by_category = self.fetch_category_summary(client).await;
        let by_month = self.fetch_monthly_summary(client).await;
        list.and(by_category).and(by_month)
    }

    /// Creates a record, then reloads the cache before returning so callers
    /// observe the service's state, not a local guess.
    ///
    /// When the mutation succeeds but the reload fails, the creation is
    /// still reported as `Ok`; the failed queries carry the reload error
    /// and keep their pre-mutation values.
    pub async fn create(
        &mut self,
        client: &Client,
        data: &ExpenseCreate,
    ) -> Result<Expense, ApiError> {
        let created = client.create(data).await?;
        tracing::info!(id = created.id, "expense created");
        if let Err(err) = self.refresh(client).await {
            tracing::warn!("reload after create failed: {err}");
        }
        Ok(created)
    }

    /// Applies a partial update, then reloads. See [`ExpenseCache::create`]
    /// for the failure contract.
    pub async fn update(
        &mut self,
        client: &Client,
        id: i64,
        patch: &ExpenseUpdate,
    ) -> Result<Expense, ApiError> {
        let updated = client.update(id, patch).await?;
        tracing::info!(id, "expense updated");
        if let Err(err) = self.refresh(client).await {
            tracing::warn!("reload after update failed: {err}");
        }
        Ok(updated)
    }

    /// Deletes a record, then reloads. See [`ExpenseCache::create`] for the
    /// failure contract.
    pub async fn delete(&mut self, client: &Client, id: i64) -> Result<(), ApiError> {
        client.delete(id).await?;
        tracing::info!(id, "expense deleted");
        if let Err(err) = self.refresh(client).await {
            tracing::warn!("reload after delete failed: {err}");
        }
        Ok(())
    }
}
