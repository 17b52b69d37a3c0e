use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    EndDatePatch, NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch,
};

/// REST DTO for subscription representation; months render as `YYYY-MM`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    #[schema(example = "2024-01")]
    pub start_date: String,
    /// Absent while the subscription is open-ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2024-06")]
    pub end_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new subscription
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionReq {
    #[schema(example = "Netflix")]
    pub service_name: String,
    /// Minor currency units, non-negative
    #[schema(example = 999, minimum = 0, maximum = 1000000000000i64)]
    pub price: i64,
    pub user_id: String,
    #[schema(example = "2024-01")]
    pub start_date: String,
    #[serde(default)]
    #[schema(example = "2024-06")]
    pub end_date: Option<String>,
}

/// REST DTO for updating a subscription (partial).
///
/// `end_date`: absent or null keeps the current value, `""` clears it,
/// `YYYY-MM` sets it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateSubscriptionReq {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Filter query shared by list and sum. Unparseable months are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionFilterQuery {
    /// Exact owner UUID
    pub user_id: Option<String>,
    /// Exact service name
    pub service_name: Option<String>,
    /// Inclusive lower bound on start month, `YYYY-MM`
    pub from: Option<String>,
    /// Inclusive upper bound on start month, `YYYY-MM`
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SumDto {
    pub sum: i64,
}

// Conversion implementations between REST DTOs and contract models

impl From<Subscription> for SubscriptionDto {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.price,
            user_id: s.user_id,
            start_date: s.start_date.to_string(),
            end_date: s.end_date.map(|d| d.to_string()),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<CreateSubscriptionReq> for NewSubscription {
    fn from(req: CreateSubscriptionReq) -> Self {
        Self {
            service_name: req.service_name,
            price: req.price,
            user_id: req.user_id,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

impl From<UpdateSubscriptionReq> for SubscriptionPatch {
    fn from(req: UpdateSubscriptionReq) -> Self {
        let end_date = match req.end_date {
            None => EndDatePatch::Keep,
            Some(v) if v.is_empty() => EndDatePatch::Clear,
            Some(v) => EndDatePatch::Set(v),
        };
        Self {
            service_name: req.service_name,
            price: req.price,
            end_date,
        }
    }
}

impl From<&SubscriptionFilterQuery> for SubscriptionFilter {
    fn from(q: &SubscriptionFilterQuery) -> Self {
        SubscriptionFilter::from_query(
            q.user_id.as_deref(),
            q.service_name.as_deref(),
            q.from.as_deref(),
            q.to.as_deref(),
        )
    }
}
