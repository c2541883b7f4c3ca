//! Campaign persistence.
//!
//! The sync writes through the `CampaignStore` trait; `PgStore` is the
//! Postgres implementation and also serves the read queries behind the
//! customer dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use parser::{CampaignRecord, Granularity};
use serde::Serialize;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::future::Future;
use uuid::Uuid;

/// 15 bound columns per row keeps each statement well under the Postgres
/// limit of 65535 parameters.
const INSERT_CHUNK: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceStats {
    pub deleted: u64,
    pub inserted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::Failed => "failed",
        }
    }
}

/// Final state of one sync invocation, written to `sync_runs`.
#[derive(Debug, Clone)]
pub struct SyncRunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub error: Option<String>,
    pub records: usize,
    pub detail: serde_json::Value,
}

pub trait CampaignStore {
    /// Delete every row of `dashboard_id`, then insert `records`.
    fn replace_dashboard_records(
        &self,
        dashboard_id: Uuid,
        records: &[CampaignRecord],
    ) -> impl Future<Output = Result<ReplaceStats, sqlx::Error>> + Send;

    /// Stamp the dashboard's last sync time. `false` when no such dashboard exists.
    fn mark_dashboard_synced(
        &self,
        dashboard_id: Uuid,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn start_sync_run(&self, dashboard_id: Uuid) -> impl Future<Output = Result<Uuid, sqlx::Error>> + Send;

    fn finish_sync_run(&self, report: &SyncRunReport) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// Persisted campaign row as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StoredCampaign {
    pub record_id: Uuid,
    #[serde(flatten)]
    pub record: CampaignRecord,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub dashboard_id: Uuid,
    pub report_type: Option<Granularity>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: i64,
}

/// Raw sums over a set of campaign rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CampaignTotals {
    pub records: i64,
    pub reach: i64,
    pub impressions: i64,
    pub conversations_started: i64,
    pub profile_visits: i64,
    pub amount_spent: f64,
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(db_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn list_campaigns(&self, filter: &CampaignFilter) -> Result<Vec<StoredCampaign>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT record_id, client_id, dashboard_id, campaign_name, reach, impressions,
                   frequency, conversations_started, profile_visits, amount_spent,
                   cpm, cpc, ctr, report_type, period_start, period_end, created_at
            FROM campaign_metrics
            WHERE dashboard_id =
            "#,
        );
        query.push_bind(filter.dashboard_id);

        if let Some(report_type) = filter.report_type {
            query.push(" AND report_type = ").push_bind(report_type.as_str());
        }
        if let Some(from) = filter.from {
            query.push(" AND period_start >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND period_end <= ").push_bind(to);
        }
        query
            .push(" ORDER BY period_start DESC, campaign_name LIMIT ")
            .push_bind(filter.limit);

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(stored_campaign_from_row).collect()
    }

    pub async fn summarize_campaigns(
        &self,
        dashboard_id: Uuid,
        report_type: Option<Granularity>,
    ) -> Result<CampaignTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS records,
                   COALESCE(SUM(reach), 0)::bigint AS reach,
                   COALESCE(SUM(impressions), 0)::bigint AS impressions,
                   COALESCE(SUM(conversations_started), 0)::bigint AS conversations_started,
                   COALESCE(SUM(profile_visits), 0)::bigint AS profile_visits,
                   COALESCE(SUM(amount_spent), 0)::float8 AS amount_spent
            FROM campaign_metrics
            WHERE dashboard_id = $1
              AND ($2::text IS NULL OR report_type = $2)
            "#,
        )
        .bind(dashboard_id)
        .bind(report_type.map(|g| g.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(CampaignTotals {
            records: row.try_get("records")?,
            reach: row.try_get("reach")?,
            impressions: row.try_get("impressions")?,
            conversations_started: row.try_get("conversations_started")?,
            profile_visits: row.try_get("profile_visits")?,
            amount_spent: row.try_get("amount_spent")?,
        })
    }

    /// `None` when the dashboard does not exist; `Some(None)` when it was never synced.
    pub async fn dashboard_last_sync(
        &self,
        dashboard_id: Uuid,
    ) -> Result<Option<Option<DateTime<Utc>>>, sqlx::Error> {
        let row: Option<(Option<DateTime<Utc>>,)> =
            sqlx::query_as("SELECT last_sync_at FROM dashboards WHERE dashboard_id = $1")
                .bind(dashboard_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(ts,)| ts))
    }
}

fn stored_campaign_from_row(row: &PgRow) -> Result<StoredCampaign, sqlx::Error> {
    let report_type: String = row.try_get("report_type")?;
    let report_type: Granularity = report_type
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))?;

    Ok(StoredCampaign {
        record_id: row.try_get("record_id")?,
        created_at: row.try_get("created_at")?,
        record: CampaignRecord {
            client_id: row.try_get("client_id")?,
            dashboard_id: row.try_get("dashboard_id")?,
            campaign_name: row.try_get("campaign_name")?,
            reach: row.try_get("reach")?,
            impressions: row.try_get("impressions")?,
            frequency: row.try_get("frequency")?,
            conversations_started: row.try_get("conversations_started")?,
            profile_visits: row.try_get("profile_visits")?,
            amount_spent: row.try_get("amount_spent")?,
            cpm: row.try_get("cpm")?,
            cpc: row.try_get("cpc")?,
            ctr: row.try_get("ctr")?,
            report_type,
            period_start: row.try_get("period_start")?,
            period_end: row.try_get("period_end")?,
        },
    })
}

impl CampaignStore for PgStore {
    /// Delete and insert share one transaction, so a failure part-way leaves
    /// the previous rows in place instead of an empty dashboard.
    async fn replace_dashboard_records(
        &self,
        dashboard_id: Uuid,
        records: &[CampaignRecord],
    ) -> Result<ReplaceStats, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM campaign_metrics WHERE dashboard_id = $1")
            .bind(dashboard_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK) {
            let mut query = QueryBuilder::<Postgres>::new(
                r#"
                INSERT INTO campaign_metrics
                (client_id, dashboard_id, campaign_name, reach, impressions, frequency,
                 conversations_started, profile_visits, amount_spent, cpm, cpc, ctr,
                 report_type, period_start, period_end)
                "#,
            );
            query.push_values(chunk, |mut row, r| {
                row.push_bind(r.client_id)
                    .push_bind(dashboard_id)
                    .push_bind(r.campaign_name.as_str())
                    .push_bind(r.reach)
                    .push_bind(r.impressions)
                    .push_bind(r.frequency)
                    .push_bind(r.conversations_started)
                    .push_bind(r.profile_visits)
                    .push_bind(r.amount_spent)
                    .push_bind(r.cpm)
                    .push_bind(r.cpc)
                    .push_bind(r.ctr)
                    .push_bind(r.report_type.as_str())
                    .push_bind(r.period_start)
                    .push_bind(r.period_end);
            });
            inserted += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(ReplaceStats { deleted, inserted })
    }

    async fn mark_dashboard_synced(&self, dashboard_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE dashboards SET last_sync_at = now() WHERE dashboard_id = $1")
            .bind(dashboard_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn start_sync_run(&self, dashboard_id: Uuid) -> Result<Uuid, sqlx::Error> {
        let run_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO sync_runs (run_id, dashboard_id, status, detail)
            VALUES ($1, $2, 'running', '{}')
            "#,
        )
        .bind(run_id)
        .bind(dashboard_id)
        .execute(&self.pool)
        .await?;
        Ok(run_id)
    }

    async fn finish_sync_run(&self, report: &SyncRunReport) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE sync_runs
            SET finished_at = now(), status = $2, error = $3, records = $4, detail = detail || $5
            WHERE run_id = $1
            "#,
        )
        .bind(report.run_id)
        .bind(report.status.as_str())
        .bind(report.error.as_deref())
        .bind(report.records as i64)
        .bind(&report.detail)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
