use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use collector::store::{CampaignFilter, CampaignTotals, StoredCampaign};
use collector::{run_sync, SyncOutcome, SyncRequest};
use parser::{DerivedMetrics, Granularity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

// ============================================================================
// Response types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
pub struct SyncResponse {
    success: bool,
    #[serde(flatten)]
    outcome: SyncOutcome,
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    dashboard_id: Uuid,
    campaigns: Vec<StoredCampaign>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    dashboard_id: Uuid,
    report_type: Option<Granularity>,
    last_sync_at: Option<DateTime<Utc>>,
    totals: CampaignTotals,
    metrics: DerivedMetrics,
}

// ============================================================================
// Query params
// ============================================================================

#[derive(Deserialize)]
pub struct CampaignsQuery {
    report_type: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SummaryQuery {
    report_type: Option<String>,
}

fn parse_report_type(raw: Option<&str>) -> Result<Option<Granularity>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(AppError::BadRequest),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn sync_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let today = Local::now().date_naive();
    let outcome = run_sync(&state.fetcher, &state.store, &request, today).await?;

    Ok(Json(SyncResponse {
        success: true,
        outcome,
    }))
}

pub async fn campaigns_handler(
    State(state): State<Arc<AppState>>,
    Path(dashboard_id): Path<Uuid>,
    Query(params): Query<CampaignsQuery>,
) -> Result<Json<CampaignsResponse>, AppError> {
    let filter = CampaignFilter {
        dashboard_id,
        report_type: parse_report_type(params.report_type.as_deref())?,
        from: params.from,
        to: params.to,
        limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    };

    let campaigns = state.store.list_campaigns(&filter).await?;
    Ok(Json(CampaignsResponse {
        dashboard_id,
        campaigns,
    }))
}

pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Path(dashboard_id): Path<Uuid>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let report_type = parse_report_type(params.report_type.as_deref())?;

    let last_sync_at = state
        .store
        .dashboard_last_sync(dashboard_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("dashboard {} not found", dashboard_id)))?;

    let totals = state.store.summarize_campaigns(dashboard_id, report_type).await?;
    let metrics = DerivedMetrics::compute(totals.amount_spent, totals.impressions, totals.profile_visits);

    Ok(Json(SummaryResponse {
        dashboard_id,
        report_type,
        last_sync_at,
        totals,
        metrics,
    }))
}
