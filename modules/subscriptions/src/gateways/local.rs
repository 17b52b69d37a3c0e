use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::SubscriptionsApi,
    error::SubscriptionsError,
    model::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch},
};
use crate::domain::{error::DomainError, service::Service};

/// Local implementation of the SubscriptionsApi trait that delegates to the domain service
pub struct SubscriptionsLocalClient {
    service: Arc<Service>,
}

impl SubscriptionsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SubscriptionsApi for SubscriptionsLocalClient {
    async fn create_subscription(&self, new_sub: NewSubscription) -> anyhow::Result<Subscription> {
        self.service
            .create_subscription(new_sub)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn get_subscription(&self, id: Uuid) -> anyhow::Result<Option<Subscription>> {
        self.service
            .get_subscription(id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn update_subscription(
        &self,
        id: Uuid,
        patch: SubscriptionPatch,
    ) -> anyhow::Result<Subscription> {
        self.service
            .update_subscription(id, patch)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn delete_subscription(&self, id: Uuid) -> anyhow::Result<()> {
        self.service
            .delete_subscription(id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn list_subscriptions(
        &self,
        filter: SubscriptionFilter,
    ) -> anyhow::Result<Vec<Subscription>> {
        self.service
            .list_subscriptions(&filter)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn sum_prices(&self, filter: SubscriptionFilter) -> anyhow::Result<i64> {
        self.service
            .sum_prices(&filter)
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    let contract_error = match domain_error {
        DomainError::SubscriptionNotFound { id } => SubscriptionsError::not_found(id),
        DomainError::Validation { field, message } => {
            SubscriptionsError::validation(format!("{}: {}", field, message))
        }
        DomainError::Database { message } => {
            tracing::error!(%message, "subscriptions storage failure");
            SubscriptionsError::internal()
        }
    };

    anyhow::Error::new(contract_error)
}
