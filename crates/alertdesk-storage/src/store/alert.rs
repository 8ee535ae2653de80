use alertdesk_common::types::Alert;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict, SimpleExpr};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, EntityTrait, Iterable, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::alert::{self, Column, Entity};
use crate::error::{Result, StorageError};
use crate::filter::{AlertFilter, AlertSort, SortField, SortOrder, TimeField};
use crate::store::SeaOrmAlertStore;
use crate::AlertStore;

fn to_alert(m: alert::Model) -> Result<Alert> {
    let level = m.level.parse().map_err(|_| StorageError::InvalidColumn {
        column: "level",
        value: m.level.clone(),
    })?;
    let status = m.status.parse().map_err(|_| StorageError::InvalidColumn {
        column: "status",
        value: m.status.clone(),
    })?;
    Ok(Alert {
        id: m.id,
        name: m.name,
        alert_type: m.alert_type,
        level,
        status,
        description: m.description,
        source: m.source,
        company: m.company,
        system_name: m.system_name,
        task_name: m.task_name,
        host: m.host,
        region: m.region,
        rule: m.rule,
        value: m.value,
        threshold: m.threshold,
        ave_time: m.ave_time,
        actual_value: m.actual_value,
        is_recover: m.is_recover,
        create_time: m.create_time.with_timezone(&Utc),
        update_time: m.update_time.with_timezone(&Utc),
        begin_time: m.begin_time.map(|t| t.with_timezone(&Utc)),
        end_time: m.end_time.map(|t| t.with_timezone(&Utc)),
        recover_time: m.recover_time.map(|t| t.with_timezone(&Utc)),
    })
}

fn to_active_model(a: &Alert) -> alert::ActiveModel {
    alert::ActiveModel {
        id: Set(a.id.clone()),
        name: Set(a.name.clone()),
        alert_type: Set(a.alert_type.clone()),
        level: Set(a.level.as_str().to_string()),
        status: Set(a.status.as_str().to_string()),
        description: Set(a.description.clone()),
        source: Set(a.source.clone()),
        company: Set(a.company.clone()),
        system_name: Set(a.system_name.clone()),
        task_name: Set(a.task_name.clone()),
        host: Set(a.host.clone()),
        region: Set(a.region.clone()),
        rule: Set(a.rule.clone()),
        value: Set(a.value.clone()),
        threshold: Set(a.threshold.clone()),
        ave_time: Set(a.ave_time.clone()),
        actual_value: Set(a.actual_value.clone()),
        is_recover: Set(a.is_recover),
        create_time: Set(a.create_time.fixed_offset()),
        update_time: Set(a.update_time.fixed_offset()),
        begin_time: Set(a.begin_time.map(|t| t.fixed_offset())),
        end_time: Set(a.end_time.map(|t| t.fixed_offset())),
        recover_time: Set(a.recover_time.map(|t| t.fixed_offset())),
    }
}

fn utc(t: DateTime<Utc>) -> DateTime<FixedOffset> {
    t.fixed_offset()
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `LOWER(col) LIKE '%needle%' ESCAPE '\'`
///
/// SQLite folds ASCII only, so the needle is folded the same way.
fn contains_ci(column: Column, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_ascii_lowercase()));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

fn condition(filter: &AlertFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(status) = filter.status_eq {
        cond = cond.add(Column::Status.eq(status.as_str()));
    }
    if let Some(level) = filter.level_eq {
        cond = cond.add(Column::Level.eq(level.as_str()));
    }

    let substring_filters = [
        (Column::Name, &filter.name_contains),
        (Column::AlertType, &filter.alert_type_contains),
        (Column::Company, &filter.company_contains),
        (Column::SystemName, &filter.system_name_contains),
        (Column::TaskName, &filter.task_name_contains),
        (Column::Host, &filter.host_contains),
        (Column::Region, &filter.region_contains),
    ];
    for (column, needle) in substring_filters {
        if let Some(needle) = needle {
            cond = cond.add(contains_ci(column, needle));
        }
    }

    if let Some(from) = filter.end_time_gte {
        cond = cond.add(Column::EndTime.gte(utc(from)));
    }
    if let Some(to) = filter.end_time_lte {
        cond = cond.add(Column::EndTime.lte(utc(to)));
    }

    if let Some(keyword) = &filter.keyword {
        let keyword_columns = [
            Column::Name,
            Column::Description,
            Column::AlertType,
            Column::Source,
            Column::Company,
            Column::SystemName,
            Column::TaskName,
            Column::Host,
        ];
        let mut any = Condition::any();
        for column in keyword_columns {
            any = any.add(contains_ci(column, keyword));
        }
        cond = cond.add(any);
    }

    if let Some(window) = &filter.time_window {
        let column = match window.field {
            TimeField::CreateTime => Column::CreateTime,
            TimeField::UpdateTime => Column::UpdateTime,
            TimeField::EndTime => Column::EndTime,
        };
        cond = cond
            .add(column.gte(utc(window.start)))
            .add(column.lte(utc(window.end)));
    }

    cond
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::EndTime => Column::EndTime,
        SortField::BeginTime => Column::BeginTime,
        SortField::CreateTime => Column::CreateTime,
        SortField::UpdateTime => Column::UpdateTime,
        SortField::RecoverTime => Column::RecoverTime,
        SortField::Name => Column::Name,
        SortField::Type => Column::AlertType,
        SortField::Company => Column::Company,
        SortField::SystemName => Column::SystemName,
        SortField::Host => Column::Host,
    }
}

#[async_trait]
impl AlertStore for SeaOrmAlertStore {
    async fn get(&self, id: &str) -> Result<Option<Alert>> {
        let model = Entity::find_by_id(id).one(self.db()).await?;
        model.map(to_alert).transpose()
    }

    async fn put(&self, alert: &Alert) -> Result<()> {
        let am = to_active_model(alert);
        let update_columns = Column::iter().filter(|c| !matches!(c, Column::Id));
        Entity::insert(am)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec_without_returning(self.db())
            .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<Option<Alert>> {
        let Some(model) = Entity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        Entity::delete_by_id(id).exec(self.db()).await?;
        to_alert(model).map(Some)
    }

    async fn list_all(&self) -> Result<Vec<Alert>> {
        let rows = Entity::find().all(self.db()).await?;
        rows.into_iter().map(to_alert).collect()
    }

    async fn count(&self, filter: &AlertFilter) -> Result<u64> {
        Ok(Entity::find()
            .filter(condition(filter))
            .count(self.db())
            .await?)
    }

    async fn query(
        &self,
        filter: &AlertFilter,
        sort: &AlertSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Alert>> {
        let order = match sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let rows = Entity::find()
            .filter(condition(filter))
            .order_by(sort_column(sort.field), order)
            .order_by(Column::Id, Order::Asc)
            .limit(limit)
            .offset(offset)
            .all(self.db())
            .await?;
        rows.into_iter().map(to_alert).collect()
    }

    async fn clear(&self) -> Result<()> {
        let res = Entity::delete_many().exec(self.db()).await?;
        tracing::debug!(rows = res.rows_affected, "Cleared alerts table");
        Ok(())
    }

    async fn len(&self) -> Result<u64> {
        Ok(Entity::find().count(self.db()).await?)
    }
}
