use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    EndDatePatch, NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch, YearMonth,
};
use crate::domain::error::DomainError;
use crate::domain::repo::{NewSubscriptionRecord, SubscriptionsRepository};

/// Domain service with business rules for subscription management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn SubscriptionsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_service_name_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_service_name_length: 255,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn SubscriptionsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(
        name = "subscriptions.service.create_subscription",
        skip(self, new_sub),
        fields(service_name = %new_sub.service_name, user_id = %new_sub.user_id)
    )]
    pub async fn create_subscription(
        &self,
        new_sub: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        info!("Creating new subscription");

        self.validate_service_name(&new_sub.service_name)?;
        validate_price(new_sub.price)?;
        let user_id = Uuid::parse_str(new_sub.user_id.trim()).map_err(|_| {
            DomainError::validation("user_id", format!("'{}' is not a UUID", new_sub.user_id))
        })?;
        let start_date = parse_month("start_date", &new_sub.start_date)?;
        let end_date = match new_sub.end_date.as_deref() {
            Some(raw) if !raw.is_empty() => Some(parse_month("end_date", raw)?),
            _ => None,
        };

        let created = self
            .repo
            .create(NewSubscriptionRecord {
                service_name: new_sub.service_name,
                price: new_sub.price,
                user_id,
                start_date,
                end_date,
            })
            .await
            .map_err(DomainError::database)?;

        info!("Successfully created subscription with id={}", created.id);
        Ok(created)
    }

    /// A missing id is `Ok(None)`, not an error.
    #[instrument(name = "subscriptions.service.get_subscription", skip(self), fields(subscription_id = %id))]
    pub async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        debug!("Getting subscription by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(DomainError::database)
    }

    #[instrument(
        name = "subscriptions.service.update_subscription",
        skip(self, patch),
        fields(subscription_id = %id)
    )]
    pub async fn update_subscription(
        &self,
        id: Uuid,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, DomainError> {
        info!("Updating subscription");

        let mut current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(DomainError::database)?
            .ok_or_else(|| DomainError::subscription_not_found(id))?;

        // Validate the whole patch before merging anything
        if let Some(ref name) = patch.service_name {
            self.validate_service_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        let end_date = match patch.end_date {
            EndDatePatch::Keep => None,
            EndDatePatch::Clear => Some(None),
            EndDatePatch::Set(ref raw) => Some(Some(parse_month("end_date", raw)?)),
        };

        if let Some(name) = patch.service_name {
            current.service_name = name;
        }
        if let Some(price) = patch.price {
            current.price = price;
        }
        if let Some(end_date) = end_date {
            current.end_date = end_date;
        }

        let updated = self
            .repo
            .update(current)
            .await
            .map_err(DomainError::database)?;

        info!(state = ?updated.state(), "Successfully updated subscription");
        Ok(updated)
    }

    /// Deleting an id that does not exist succeeds.
    #[instrument(name = "subscriptions.service.delete_subscription", skip(self), fields(subscription_id = %id))]
    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting subscription");

        let deleted = self.repo.delete(id).await.map_err(DomainError::database)?;
        if deleted {
            info!("Successfully deleted subscription");
        } else {
            debug!("Subscription already absent");
        }
        Ok(())
    }

    #[instrument(name = "subscriptions.service.list_subscriptions", skip(self))]
    pub async fn list_subscriptions(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, DomainError> {
        debug!("Listing subscriptions");
        let items = self.repo.list(filter).await.map_err(DomainError::database)?;
        debug!("Successfully listed {} subscriptions", items.len());
        Ok(items)
    }

    #[instrument(name = "subscriptions.service.sum_prices", skip(self))]
    pub async fn sum_prices(&self, filter: &SubscriptionFilter) -> Result<i64, DomainError> {
        debug!("Summing subscription prices");
        self.repo.sum(filter).await.map_err(DomainError::database)
    }

    // --- validation helpers ---

    fn validate_service_name(&self, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("service_name", "must not be empty"));
        }
        let len = name.chars().count();
        if len > self.config.max_service_name_length {
            return Err(DomainError::validation(
                "service_name",
                format!(
                    "too long: {} characters (max: {})",
                    len, self.config.max_service_name_length
                ),
            ));
        }
        Ok(())
    }
}

/// Upper bound for a single price, in minor units. Keeps `sum` far below
/// `i64::MAX` for any realistic number of rows.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

fn validate_price(price: i64) -> Result<(), DomainError> {
    if price < 0 {
        return Err(DomainError::validation(
            "price",
            format!("must be non-negative, got {price}"),
        ));
    }
    if price > MAX_PRICE {
        return Err(DomainError::validation(
            "price",
            format!("must not exceed {MAX_PRICE}, got {price}"),
        ));
    }
    Ok(())
}

fn parse_month(field: &str, raw: &str) -> Result<YearMonth, DomainError> {
    YearMonth::parse(raw).map_err(|e| DomainError::validation(field, e.to_string()))
}
