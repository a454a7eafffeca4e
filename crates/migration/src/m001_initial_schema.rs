use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite keeps timestamps as RFC 3339 text
        let ts_type = match manager.get_database_backend() {
            DbBackend::Postgres => "TIMESTAMPTZ",
            _ => "TEXT",
        };
        let sql = UP_SQL.replace("{ts}", ts_type);
        manager.get_connection().execute_unprepared(&sql).await?;
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

const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS alert_configurations (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL,
    name TEXT NOT NULL,
    target_type TEXT NOT NULL,
    default_severity TEXT NOT NULL,
    active BOOLEAN NOT NULL,
    created_at {ts} NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_configurations_customer ON alert_configurations(customer_id);

CREATE TABLE IF NOT EXISTS alert_definitions (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL,
    configuration_id TEXT NOT NULL,
    created_at {ts} NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alert_definitions_configuration ON alert_definitions(configuration_id);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY NOT NULL,
    customer_id TEXT NOT NULL,
    definition_id TEXT NOT NULL,
    configuration_id TEXT NOT NULL,
    source_id TEXT NOT NULL,
    source_name TEXT,
    name TEXT,
    severity TEXT NOT NULL,
    configuration_type TEXT NOT NULL,
    message TEXT,
    labels TEXT NOT NULL,
    state TEXT NOT NULL,
    create_time {ts} NOT NULL,
    acknowledged_time {ts},
    resolved_time {ts}
);
CREATE INDEX IF NOT EXISTS idx_alerts_definition_state ON alerts(definition_id, state);
CREATE INDEX IF NOT EXISTS idx_alerts_state ON alerts(state);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS alerts;
DROP TABLE IF EXISTS alert_definitions;
DROP TABLE IF EXISTS alert_configurations;
";
