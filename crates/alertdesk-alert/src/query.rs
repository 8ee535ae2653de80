use alertdesk_common::types::{Alert, AlertLevel, AlertStatus};
use alertdesk_storage::{
    AlertFilter, AlertSort, AlertStore, SortField, SortOrder, TimeField, TimeWindow,
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{AlertError, Result};
use crate::pagination::{Page, PageRequest};
use crate::stats::AlertStatistics;
use crate::time::parse_optional_time;

/// Alert types offered as options even before any alert of that type exists.
pub const DEFAULT_ALERT_TYPES: [&str; 2] = ["host", "business"];

/// 告警列表查询条件
///
/// 所有字段均为原始文本，空白视为不限制。`begin_time` / `end_time` 约束的是
/// 告警的 `endTime`。
#[derive(Debug, Clone, Default)]
pub struct AlertListQuery {
    pub status: Option<String>,
    pub level: Option<String>,
    pub alert_type: Option<String>,
    pub company: Option<String>,
    pub system_name: Option<String>,
    pub task_name: Option<String>,
    pub host: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
    pub begin_time: Option<String>,
    pub end_time: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn owned_non_blank(value: &Option<String>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

impl AlertListQuery {
    /// Parses and validates the raw parameters into a store filter.
    pub fn to_filter(&self) -> Result<AlertFilter> {
        let status_eq = non_blank(&self.status)
            .map(|s| s.parse::<AlertStatus>())
            .transpose()
            .map_err(AlertError::Validation)?;
        let level_eq = non_blank(&self.level)
            .map(|s| s.parse::<AlertLevel>())
            .transpose()
            .map_err(AlertError::Validation)?;
        let end_time_gte = parse_optional_time("beginTime", self.begin_time.as_deref())?;
        let end_time_lte = parse_optional_time("endTime", self.end_time.as_deref())?;
        if let (Some(from), Some(to)) = (end_time_gte, end_time_lte) {
            if from > to {
                return Err(AlertError::validation("beginTime must not be after endTime"));
            }
        }

        Ok(AlertFilter {
            status_eq,
            level_eq,
            name_contains: owned_non_blank(&self.name),
            alert_type_contains: owned_non_blank(&self.alert_type),
            company_contains: owned_non_blank(&self.company),
            system_name_contains: owned_non_blank(&self.system_name),
            task_name_contains: owned_non_blank(&self.task_name),
            host_contains: owned_non_blank(&self.host),
            region_contains: owned_non_blank(&self.region),
            end_time_gte,
            end_time_lte,
            ..Default::default()
        })
    }

    /// Sort field defaults to `endTime`, order to `desc`.
    pub fn to_sort(&self) -> Result<AlertSort> {
        let field = non_blank(&self.sort_field)
            .map(|s| s.parse::<SortField>())
            .transpose()
            .map_err(AlertError::Validation)?
            .unwrap_or_default();
        let order = non_blank(&self.sort_order)
            .map(|s| s.parse::<SortOrder>())
            .transpose()
            .map_err(AlertError::Validation)?
            .unwrap_or_default();
        Ok(AlertSort { field, order })
    }
}

/// Read-only queries over the alert store.
#[derive(Clone)]
pub struct AlertQueryEngine {
    store: Arc<dyn AlertStore>,
}

impl AlertQueryEngine {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Alert> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AlertError::validation("alert id is required"));
        }
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AlertError::NotFound { id: id.to_string() })
    }

    /// Filtered, sorted, paginated listing.
    pub async fn list(&self, query: &AlertListQuery, page: PageRequest) -> Result<Page<Alert>> {
        let filter = query.to_filter()?;
        let sort = query.to_sort()?;
        self.page(&filter, &sort, page).await
    }

    /// Full-text search: the keyword may appear in any of name, description,
    /// type, source, company, systemName, taskName or host.
    pub async fn search(&self, keyword: &str, page: PageRequest) -> Result<Page<Alert>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AlertError::validation("keyword is required"));
        }
        let filter = AlertFilter {
            keyword: Some(keyword.to_string()),
            ..Default::default()
        };
        self.page(&filter, &AlertSort::default(), page).await
    }

    /// Alerts whose `time_field` lies in `[start, end]`, newest first.
    /// `time_field` is `CREATE` (default), `UPDATE` or `END`.
    pub async fn time_range(
        &self,
        start: &str,
        end: &str,
        time_field: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Alert>> {
        let start = parse_optional_time("startTime", Some(start))?
            .ok_or_else(|| AlertError::validation("startTime is required"))?;
        let end = parse_optional_time("endTime", Some(end))?
            .ok_or_else(|| AlertError::validation("endTime is required"))?;
        if start > end {
            return Err(AlertError::validation("startTime must not be after endTime"));
        }
        let field = match time_field.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<TimeField>().map_err(AlertError::Validation)?,
            None => TimeField::default(),
        };

        let filter = AlertFilter {
            time_window: Some(TimeWindow { field, start, end }),
            ..Default::default()
        };
        let sort = AlertSort {
            field: match field {
                TimeField::CreateTime => SortField::CreateTime,
                TimeField::UpdateTime => SortField::UpdateTime,
                TimeField::EndTime => SortField::EndTime,
            },
            order: SortOrder::Desc,
        };
        self.page(&filter, &sort, page).await
    }

    pub async fn statistics(&self) -> Result<AlertStatistics> {
        let alerts = self.store.list_all().await?;
        Ok(AlertStatistics::from_alerts(&alerts))
    }

    /// Alert types to offer as choices: the defaults plus every type in use.
    pub async fn alert_types(&self) -> Result<Vec<String>> {
        let mut types: BTreeSet<String> =
            DEFAULT_ALERT_TYPES.iter().map(|s| s.to_string()).collect();
        for alert in self.store.list_all().await? {
            types.insert(alert.alert_type);
        }
        Ok(types.into_iter().collect())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(self.store.len().await?)
    }

    async fn page(
        &self,
        filter: &AlertFilter,
        sort: &AlertSort,
        page: PageRequest,
    ) -> Result<Page<Alert>> {
        let total = self.store.count(filter).await?;
        let offset = page.offset();
        let data = if offset >= total {
            Vec::new()
        } else {
            self.store.query(filter, sort, offset, page.limit()).await?
        };
        tracing::debug!(total, offset, returned = data.len(), "Alert page query");
        Ok(Page::new(data, total, page))
    }
}
