use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use crate::domain::period::YearMonth;

/// Pure subscription model for inter-module communication (no serde/utoipa)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    /// Minor currency units.
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: YearMonth,
    pub end_date: Option<YearMonth>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Open until an end month is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Open,
    Closed,
}

impl Subscription {
    pub fn state(&self) -> SubscriptionState {
        match self.end_date {
            Some(_) => SubscriptionState::Closed,
            None => SubscriptionState::Open,
        }
    }
}

/// Data for creating a new subscription.
///
/// Dates and the user id arrive as caller text and are validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// What an update does to `end_date`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EndDatePatch {
    #[default]
    Keep,
    Clear,
    Set(String),
}

/// Partial update data for a subscription
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub price: Option<i64>,
    pub end_date: EndDatePatch,
}

/// Predicate shared by listing and summation. Every field is optional and
/// constraints are combined with AND; `from`/`to` bound `start_date` inclusively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from: Option<YearMonth>,
    pub to: Option<YearMonth>,
}

impl SubscriptionFilter {
    /// Build a filter from raw query text. Never fails.
    ///
    /// Blank values impose no constraint. An unparseable `from`/`to` is
    /// dropped. A `user_id` is kept verbatim even when it is not a UUID, so
    /// it matches nothing instead of widening the query.
    pub fn from_query(
        user_id: Option<&str>,
        service_name: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Self {
        Self {
            user_id: non_blank(user_id),
            service_name: non_blank(service_name),
            from: lenient_month("from", from),
            to: lenient_month("to", to),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.user_id.is_none()
            && self.service_name.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn lenient_month(field: &str, raw: Option<&str>) -> Option<YearMonth> {
    let raw = non_blank(raw)?;
    match YearMonth::parse(&raw) {
        Ok(ym) => Some(ym),
        Err(e) => {
            tracing::debug!(field, error = %e, "ignoring unparseable month bound");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_impose_no_constraint() {
        let f = SubscriptionFilter::from_query(Some(""), Some("   "), Some(""), None);
        assert!(f.is_unconstrained());
    }

    #[test]
    fn bad_month_bounds_are_dropped() {
        let f = SubscriptionFilter::from_query(None, None, Some("2024-13"), Some("June"));
        assert_eq!(f.from, None);
        assert_eq!(f.to, None);
    }

    #[test]
    fn valid_values_are_kept() {
        let f = SubscriptionFilter::from_query(
            Some("60601fee-2bf1-4721-ae6f-7636e79a0cba"),
            Some("Netflix"),
            Some("2024-01"),
            Some("2024-06"),
        );
        assert_eq!(f.service_name.as_deref(), Some("Netflix"));
        assert_eq!(f.from, YearMonth::parse("2024-01").ok());
        assert_eq!(f.to, YearMonth::parse("2024-06").ok());
        assert!(!f.is_unconstrained());
    }

    #[test]
    fn malformed_user_id_is_kept() {
        let f = SubscriptionFilter::from_query(Some("not-a-uuid"), None, None, None);
        assert_eq!(f.user_id.as_deref(), Some("not-a-uuid"));
    }

    #[test]
    fn state_follows_end_date() {
        let now = Utc::now();
        let mut sub = Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".into(),
            price: 999,
            user_id: Uuid::new_v4(),
            start_date: YearMonth::parse("2024-01").unwrap(),
            end_date: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(sub.state(), SubscriptionState::Open);
        sub.end_date = YearMonth::parse("2024-06").ok();
        assert_eq!(sub.state(), SubscriptionState::Closed);
    }
}
