//! Sheet-to-dashboard sync.
//!
//! One invocation: resolve the spreadsheet id, fetch the three tabs
//! concurrently, parse them in order (daily, weekly, monthly), replace the
//! dashboard's rows and stamp its last sync time. Nothing is retried and
//! concurrent syncs of the same dashboard are not coordinated.

use chrono::NaiveDate;
use parser::{parse_report, CampaignRecord, Granularity, ReportContext};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::fetch::{content_hash, SheetFetcher, TabIds};
use crate::spreadsheet::extract_spreadsheet_id;
use crate::store::{CampaignStore, ReplaceStats, RunStatus, SyncRunReport};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid spreadsheet url: {0}")]
    InvalidSpreadsheetUrl(String),

    #[error("failed to persist campaign records: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    /// Owner of the dashboard.
    pub client_id: Uuid,
    pub spreadsheet_url: String,
    pub dashboard_id: Uuid,
    #[serde(flatten)]
    pub tabs: TabIds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GranularityCounts {
    pub daily: usize,
    pub weekly: usize,
    pub monthly: usize,
}

impl GranularityCounts {
    fn set(&mut self, granularity: Granularity, count: usize) {
        match granularity {
            Granularity::Daily => self.daily = count,
            Granularity::Weekly => self.weekly = count,
            Granularity::Monthly => self.monthly = count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TabDigest {
    pub report_type: Granularity,
    pub content_hash: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub total_records: usize,
    pub counts: GranularityCounts,
    #[serde(skip)]
    pub tabs: Vec<TabDigest>,
    #[serde(skip)]
    pub replaced: ReplaceStats,
}

/// Fetch and parse without persisting anything.
pub async fn collect_records(
    fetcher: &SheetFetcher,
    request: &SyncRequest,
    today: NaiveDate,
) -> Result<(Vec<CampaignRecord>, GranularityCounts, Vec<TabDigest>), SyncError> {
    let spreadsheet_id = extract_spreadsheet_id(&request.spreadsheet_url)
        .ok_or_else(|| SyncError::InvalidSpreadsheetUrl(request.spreadsheet_url.clone()))?;

    let fetched = fetcher.fetch_tabs(spreadsheet_id, &request.tabs).await;

    let ctx = ReportContext {
        client_id: request.client_id,
        dashboard_id: request.dashboard_id,
        today,
    };

    let mut records = Vec::new();
    let mut counts = GranularityCounts::default();
    let mut digests = Vec::new();
    for granularity in Granularity::ALL {
        let Some(body) = fetched.get(granularity) else {
            continue;
        };
        let parsed = parse_report(body, granularity, &ctx);
        info!(
            dashboard_id = %request.dashboard_id,
            report_type = %granularity,
            records = parsed.len(),
            "parsed tab"
        );
        digests.push(TabDigest {
            report_type: granularity,
            content_hash: content_hash(body),
            bytes: body.len(),
        });
        counts.set(granularity, parsed.len());
        records.extend(parsed);
    }

    Ok((records, counts, digests))
}

/// Run a full sync for one dashboard. The run is recorded in the store
/// whether it succeeds or fails; a bad spreadsheet URL is rejected before
/// anything is recorded or fetched.
pub async fn run_sync<S: CampaignStore>(
    fetcher: &SheetFetcher,
    store: &S,
    request: &SyncRequest,
    today: NaiveDate,
) -> Result<SyncOutcome, SyncError> {
    if extract_spreadsheet_id(&request.spreadsheet_url).is_none() {
        return Err(SyncError::InvalidSpreadsheetUrl(request.spreadsheet_url.clone()));
    }

    let run_id = store.start_sync_run(request.dashboard_id).await?;
    info!(dashboard_id = %request.dashboard_id, %run_id, "sync started");

    let result = sync_dashboard(fetcher, store, request, today).await;

    let report = match &result {
        Ok(outcome) => SyncRunReport {
            run_id,
            status: RunStatus::Ok,
            error: None,
            records: outcome.total_records,
            detail: serde_json::json!({
                "counts": outcome.counts,
                "tabs": outcome.tabs,
                "deleted": outcome.replaced.deleted,
            }),
        },
        Err(e) => SyncRunReport {
            run_id,
            status: RunStatus::Failed,
            error: Some(e.to_string()),
            records: 0,
            detail: serde_json::json!({}),
        },
    };
    if let Err(e) = store.finish_sync_run(&report).await {
        warn!(%run_id, error = %e, "failed to record sync run result");
    }

    match &result {
        Ok(outcome) => info!(
            dashboard_id = %request.dashboard_id,
            total = outcome.total_records,
            daily = outcome.counts.daily,
            weekly = outcome.counts.weekly,
            monthly = outcome.counts.monthly,
            "sync finished"
        ),
        Err(e) => warn!(dashboard_id = %request.dashboard_id, error = %e, "sync failed"),
    }

    result
}

async fn sync_dashboard<S: CampaignStore>(
    fetcher: &SheetFetcher,
    store: &S,
    request: &SyncRequest,
    today: NaiveDate,
) -> Result<SyncOutcome, SyncError> {
    let (records, counts, tabs) = collect_records(fetcher, request, today).await?;

    let replaced = store
        .replace_dashboard_records(request.dashboard_id, &records)
        .await?;

    if !store.mark_dashboard_synced(request.dashboard_id).await? {
        warn!(dashboard_id = %request.dashboard_id, "dashboard not found, last sync time not stamped");
    }

    Ok(SyncOutcome {
        total_records: records.len(),
        counts,
        tabs,
        replaced,
    })
}
