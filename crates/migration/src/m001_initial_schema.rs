use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

// 列名与接口字段名一致（camelCase），需加引号
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    "type" TEXT NOT NULL,
    level TEXT NOT NULL,
    status TEXT NOT NULL,
    description TEXT NOT NULL,
    source TEXT NOT NULL,
    company TEXT,
    "systemName" TEXT,
    "taskName" TEXT,
    host TEXT,
    region TEXT,
    rule TEXT,
    value TEXT,
    threshold TEXT,
    "aveTime" TEXT,
    "actualValue" TEXT,
    "isRecover" INTEGER NOT NULL DEFAULT 0,
    "createTime" TEXT NOT NULL,
    "updateTime" TEXT NOT NULL,
    "beginTime" TEXT,
    "endTime" TEXT,
    "recoverTime" TEXT
);
CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts(status);
CREATE INDEX IF NOT EXISTS idx_alerts_level ON alerts(level);
CREATE INDEX IF NOT EXISTS idx_alerts_end_time ON alerts("endTime" DESC);
CREATE INDEX IF NOT EXISTS idx_alerts_create_time ON alerts("createTime");
"#;

const DOWN_SQL: &str = "
DROP INDEX IF EXISTS idx_alerts_create_time;
DROP INDEX IF EXISTS idx_alerts_end_time;
DROP INDEX IF EXISTS idx_alerts_level;
DROP INDEX IF EXISTS idx_alerts_status;
DROP TABLE IF EXISTS alerts;
";
