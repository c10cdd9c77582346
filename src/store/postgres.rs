use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::StoreError;
use crate::model::FarmPlanRecord;

/// DDL applied on connect, one statement per entry.
pub const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS farm_plans (
        id UUID PRIMARY KEY,
        farmer_name TEXT,
        total_area DOUBLE PRECISION NOT NULL,
        recommendations JSONB NOT NULL,
        allocation JSONB NOT NULL,
        total_profit DOUBLE PRECISION NOT NULL,
        sustainability DOUBLE PRECISION NOT NULL,
        risk_level TEXT NOT NULL,
        request_id TEXT UNIQUE,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS farm_plans_created_at_idx ON farm_plans (created_at DESC)",
];

const COLUMNS: &str = "id, farmer_name, total_area, recommendations, allocation, \
                       total_profit, sustainability, risk_level, request_id, created_at";

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    farmer_name: Option<String>,
    total_area: f64,
    recommendations: Json<Value>,
    allocation: Json<Value>,
    total_profit: f64,
    sustainability: f64,
    risk_level: String,
    request_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PlanRow> for FarmPlanRecord {
    fn from(row: PlanRow) -> Self {
        FarmPlanRecord {
            id: row.id,
            farmer_name: row.farmer_name,
            total_area: row.total_area,
            recommendations: row.recommendations.0,
            allocation: row.allocation.0,
            total_profit: row.total_profit,
            sustainability: row.sustainability,
            risk_level: row.risk_level,
            request_id: row.request_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(database_url)?;
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("farm_plans schema ready");
        Ok(())
    }

    pub(super) async fn insert(&self, record: FarmPlanRecord) -> Result<FarmPlanRecord, StoreError> {
        let sql = format!(
            "INSERT INTO farm_plans ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let row: PlanRow = sqlx::query_as(&sql)
            .bind(record.id)
            .bind(&record.farmer_name)
            .bind(record.total_area)
            .bind(Json(&record.recommendations))
            .bind(Json(&record.allocation))
            .bind(record.total_profit)
            .bind(record.sustainability)
            .bind(&record.risk_level)
            .bind(&record.request_id)
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    pub(super) async fn list(&self) -> Result<Vec<FarmPlanRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM farm_plans ORDER BY created_at DESC");
        let rows: Vec<PlanRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub(super) async fn get(&self, id: Uuid) -> Result<Option<FarmPlanRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM farm_plans WHERE id = $1");
        let row: Option<PlanRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub(super) async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM farm_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn find_by_request_id(&self, request_id: &str) -> Result<Option<FarmPlanRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM farm_plans WHERE request_id = $1");
        let row: Option<PlanRow> = sqlx::query_as(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}
