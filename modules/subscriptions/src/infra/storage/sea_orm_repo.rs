//! SeaORM-backed repository implementation for the domain port.
//!
//! This struct is generic over `C: ConnectionTrait`, so you can construct it
//! with a `DatabaseConnection` **or** a transactional connection.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, Func, OnConflict};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::contract::model::{Subscription, SubscriptionFilter};
use crate::domain::repo::{NewSubscriptionRecord, SubscriptionsRepository};
use crate::infra::storage::entity::{
    ActiveModel as SubscriptionAM, Column, Entity as SubscriptionEntity,
};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmSubscriptionsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmSubscriptionsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Translate the filter into a WHERE clause; every present constraint is ANDed.
fn filter_condition(filter: &SubscriptionFilter) -> Condition {
    let mut cond = Condition::all();

    if let Some(raw) = non_blank(filter.user_id.as_deref()) {
        cond = match Uuid::parse_str(raw) {
            Ok(user_id) => cond.add(Column::UserId.eq(user_id)),
            // no stored row can carry a malformed id
            Err(_) => cond.add(Expr::val(1).eq(0)),
        };
    }
    if let Some(name) = non_blank(filter.service_name.as_deref()) {
        cond = cond.add(Column::ServiceName.eq(name));
    }
    if let Some(from) = filter.from {
        cond = cond.add(Column::StartDate.gte(from.first_day()));
    }
    if let Some(to) = filter.to {
        cond = cond.add(Column::StartDate.lte(to.first_day()));
    }

    cond
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

#[async_trait::async_trait]
impl<C> SubscriptionsRepository for SeaOrmSubscriptionsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn create(&self, record: NewSubscriptionRecord) -> anyhow::Result<Subscription> {
        let now = Utc::now();
        let m = SubscriptionAM {
            id: Set(Uuid::new_v4()),
            service_name: Set(record.service_name),
            price: Set(record.price),
            user_id: Set(record.user_id),
            start_date: Set(record.start_date.first_day()),
            end_date: Set(record.end_date.map(|d| d.first_day())),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let stored = m.insert(&self.conn).await.context("insert failed")?;
        Ok(stored.into())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Subscription>> {
        let found = SubscriptionEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn update(&self, s: Subscription) -> anyhow::Result<Subscription> {
        // Full-row upsert keyed by id. A row deleted after the engine read it is
        // written back; user_id, start_date and created_at are never overwritten.
        let id = s.id;
        let m = SubscriptionAM {
            id: Set(s.id),
            service_name: Set(s.service_name),
            price: Set(s.price),
            user_id: Set(s.user_id),
            start_date: Set(s.start_date.first_day()),
            end_date: Set(s.end_date.map(|d| d.first_day())),
            created_at: Set(s.created_at),
            updated_at: Set(Utc::now()),
        };
        SubscriptionEntity::insert(m)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::ServiceName,
                        Column::Price,
                        Column::EndDate,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("update failed")?;

        SubscriptionEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("reload after update failed")?
            .map(Into::into)
            .ok_or_else(|| anyhow::anyhow!("subscription {id} missing after upsert"))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = SubscriptionEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> anyhow::Result<Vec<Subscription>> {
        let rows = SubscriptionEntity::find()
            .filter(filter_condition(filter))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sum(&self, filter: &SubscriptionFilter) -> anyhow::Result<i64> {
        // SUM(bigint) is NUMERIC on Postgres; cast back so both backends decode i64
        let total = Expr::expr(Func::coalesce([
            Expr::col((SubscriptionEntity, Column::Price)).sum(),
            Expr::val(0i64).into(),
        ]))
        .cast_as(Alias::new("BIGINT"));

        let sum = SubscriptionEntity::find()
            .select_only()
            .column_as(total, "total")
            .filter(filter_condition(filter))
            .into_tuple::<i64>()
            .one(&self.conn)
            .await
            .context("sum failed")?;
        Ok(sum.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::YearMonth;
    use sea_orm::{DbBackend, QueryTrait};

    fn where_sql(filter: &SubscriptionFilter) -> String {
        SubscriptionEntity::find()
            .filter(filter_condition(filter))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn empty_filter_has_no_predicates() {
        let sql = where_sql(&SubscriptionFilter::default());
        assert!(sql.ends_with("WHERE TRUE"), "{sql}");
    }

    #[test]
    fn month_bounds_compare_first_days() {
        let sql = where_sql(&SubscriptionFilter {
            from: YearMonth::parse("2024-01").ok(),
            to: YearMonth::parse("2024-06").ok(),
            ..Default::default()
        });
        assert!(sql.contains(r#""start_date" >= '2024-01-01'"#), "{sql}");
        assert!(sql.contains(r#""start_date" <= '2024-06-01'"#), "{sql}");
    }

    #[test]
    fn malformed_user_id_matches_nothing() {
        let sql = where_sql(&SubscriptionFilter {
            user_id: Some("nope".into()),
            ..Default::default()
        });
        assert!(sql.ends_with("WHERE 1 = 0"), "{sql}");
        assert!(!sql.contains(r#""user_id" ="#), "{sql}");
    }

    #[test]
    fn blank_strings_are_ignored() {
        let sql = where_sql(&SubscriptionFilter {
            user_id: Some("  ".into()),
            service_name: Some(String::new()),
            ..Default::default()
        });
        assert!(sql.ends_with("WHERE TRUE"), "{sql}");
        assert!(!sql.contains(r#""service_name" ="#), "{sql}");
    }
}
