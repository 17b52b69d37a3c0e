use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch};

/// Public API trait for the subscriptions module that other modules can use
#[async_trait]
pub trait SubscriptionsApi: Send + Sync {
    /// Create a subscription from caller input
    async fn create_subscription(&self, new_sub: NewSubscription) -> anyhow::Result<Subscription>;

    /// Get a subscription by ID; `None` when it does not exist
    async fn get_subscription(&self, id: Uuid) -> anyhow::Result<Option<Subscription>>;

    /// Update a subscription with partial data
    async fn update_subscription(
        &self,
        id: Uuid,
        patch: SubscriptionPatch,
    ) -> anyhow::Result<Subscription>;

    /// Delete a subscription by ID; deleting a missing id succeeds
    async fn delete_subscription(&self, id: Uuid) -> anyhow::Result<()>;

    async fn list_subscriptions(
        &self,
        filter: SubscriptionFilter,
    ) -> anyhow::Result<Vec<Subscription>>;

    /// Total price of the subscriptions matching `filter`
    async fn sum_prices(&self, filter: SubscriptionFilter) -> anyhow::Result<i64>;
}
