//! Collector CLI - Runs one spreadsheet sync for a dashboard
//!
//! Usage:
//!   cargo run --bin collector -- \
//!     --client-id <uuid> --dashboard-id <uuid> \
//!     --spreadsheet-url https://docs.google.com/spreadsheets/d/<id>/edit \
//!     --daily-gid 0 --weekly-gid 123 --monthly-gid 456
//!
//!   # Fetch and parse only, nothing written:
//!   cargo run --bin collector -- ... --dry-run

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use collector::{collect_records, run_sync, Config, PgStore, SheetFetcher, SyncRequest, TabIds};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "collector", about = "Syncs campaign reports from a spreadsheet into a dashboard")]
struct Args {
    /// Client (dashboard owner) id
    #[arg(long)]
    client_id: Uuid,

    /// Dashboard id whose rows are replaced
    #[arg(long)]
    dashboard_id: Uuid,

    /// Spreadsheet URL (any URL containing /spreadsheets/d/<id>)
    #[arg(long)]
    spreadsheet_url: String,

    /// Tab gid of the daily report
    #[arg(long)]
    daily_gid: Option<String>,

    /// Tab gid of the weekly report
    #[arg(long)]
    weekly_gid: Option<String>,

    /// Tab gid of the monthly report
    #[arg(long)]
    monthly_gid: Option<String>,

    /// Dry run - fetch and parse, don't touch the database
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let request = SyncRequest {
        client_id: args.client_id,
        spreadsheet_url: args.spreadsheet_url,
        dashboard_id: args.dashboard_id,
        tabs: TabIds {
            daily: args.daily_gid,
            weekly: args.weekly_gid,
            monthly: args.monthly_gid,
        },
    };
    let today = Local::now().date_naive();

    println!("=== Campaign Sheet Collector ===");
    println!("Dashboard: {}", request.dashboard_id);
    println!("Spreadsheet: {}", request.spreadsheet_url);

    let config = Config::from_env()?;
    let fetcher = SheetFetcher::new(config.http_client()?, config.sheets_base_url.clone());

    if args.dry_run {
        let (records, counts, tabs) = collect_records(&fetcher, &request, today).await?;
        for tab in &tabs {
            println!("  {}: {} bytes, {}", tab.report_type, tab.bytes, tab.content_hash);
        }
        for (i, r) in records.iter().take(5).enumerate() {
            println!(
                "  [{}] {} | {} | {} -> {} | R$ {:.2}",
                i + 1,
                r.report_type,
                r.campaign_name,
                r.period_start,
                r.period_end,
                r.amount_spent
            );
        }
        if records.len() > 5 {
            println!("  ... and {} more", records.len() - 5);
        }
        println!("\nDry run - would replace dashboard rows with {} records", records.len());
        println!("Daily: {} | Weekly: {} | Monthly: {}", counts.daily, counts.weekly, counts.monthly);
        return Ok(());
    }

    let store = PgStore::connect(config.require_db_url()?, 5)
        .await
        .context("Failed to connect to database")?;

    let outcome = run_sync(&fetcher, &store, &request, today).await?;

    println!("\n=== Sync Complete ===");
    println!("Records: {}", outcome.total_records);
    println!(
        "Daily: {} | Weekly: {} | Monthly: {}",
        outcome.counts.daily, outcome.counts.weekly, outcome.counts.monthly
    );
    println!(
        "Replaced: {} deleted, {} inserted",
        outcome.replaced.deleted, outcome.replaced.inserted
    );

    Ok(())
}
