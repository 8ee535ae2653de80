use sea_orm::entity::prelude::*;

/// `alerts` 表。列名沿用 camelCase 接口字段名。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub alert_type: String,
    pub level: String,
    pub status: String,
    pub description: String,
    pub source: String,
    pub company: Option<String>,
    #[sea_orm(column_name = "systemName")]
    pub system_name: Option<String>,
    #[sea_orm(column_name = "taskName")]
    pub task_name: Option<String>,
    pub host: Option<String>,
    pub region: Option<String>,
    pub rule: Option<String>,
    pub value: Option<String>,
    pub threshold: Option<String>,
    #[sea_orm(column_name = "aveTime")]
    pub ave_time: Option<String>,
    #[sea_orm(column_name = "actualValue")]
    pub actual_value: Option<String>,
    #[sea_orm(column_name = "isRecover")]
    pub is_recover: bool,
    #[sea_orm(column_name = "createTime")]
    pub create_time: DateTimeWithTimeZone,
    #[sea_orm(column_name = "updateTime")]
    pub update_time: DateTimeWithTimeZone,
    #[sea_orm(column_name = "beginTime")]
    pub begin_time: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "endTime")]
    pub end_time: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "recoverTime")]
    pub recover_time: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
