use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{Subscription, SubscriptionFilter, YearMonth};

/// Validated input for a new row. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscriptionRecord {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: YearMonth,
    pub end_date: Option<YearMonth>,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    /// Persist a new subscription and return it as stored.
    async fn create(&self, record: NewSubscriptionRecord) -> anyhow::Result<Subscription>;
    /// Load a subscription by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Subscription>>;
    /// Overwrite the mutable columns of `s.id`; refreshes `updated_at`.
    async fn update(&self, s: Subscription) -> anyhow::Result<Subscription>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Rows matching `filter`, oldest first.
    async fn list(&self, filter: &SubscriptionFilter) -> anyhow::Result<Vec<Subscription>>;
    /// Sum of `price` over the rows matching `filter`; 0 when none match.
    async fn sum(&self, filter: &SubscriptionFilter) -> anyhow::Result<i64>;
}
