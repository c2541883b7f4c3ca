//! Parser CLI - Parses a local campaign CSV export without touching the database
//!
//! Usage:
//!   cargo run --bin parser -- --file relatorio_mensal.csv --granularity monthly
//!   cargo run --bin parser -- --file semana.csv --granularity weekly --json

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use parser::{parse_report, CampaignRecord, Granularity, ReportContext};
use tokio::fs;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "parser", about = "Parses a campaign report CSV export")]
struct Args {
    /// Path to the CSV export of one spreadsheet tab
    #[arg(long)]
    file: String,

    /// Report granularity of the tab (daily, weekly, monthly)
    #[arg(long, default_value = "daily")]
    granularity: Granularity,

    /// Client id stamped on the parsed rows
    #[arg(long)]
    client_id: Option<Uuid>,

    /// Dashboard id stamped on the parsed rows
    #[arg(long)]
    dashboard_id: Option<Uuid>,

    /// Print every parsed record as JSON instead of a summary
    #[arg(long, default_value = "false")]
    json: bool,
}

fn print_summary(records: &[CampaignRecord]) {
    let spend: f64 = records.iter().map(|r| r.amount_spent).sum();
    let impressions: i64 = records.iter().map(|r| r.impressions).sum();
    let conversations: i64 = records.iter().map(|r| r.conversations_started).sum();

    println!("Parsed {} records", records.len());
    for (i, r) in records.iter().take(3).enumerate() {
        println!(
            "  [{}] {} | {} -> {} | R$ {:.2} | CPM {:.2}",
            i + 1,
            r.campaign_name,
            r.period_start,
            r.period_end,
            r.amount_spent,
            r.cpm
        );
    }
    if records.len() > 3 {
        println!("  ... and {} more", records.len() - 3);
    }
    println!("{:-<60}", "");
    println!("Total spend:         R$ {:.2}", spend);
    println!("Total impressions:   {}", impressions);
    println!("Total conversations: {}", conversations);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let content = fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;

    let ctx = ReportContext {
        client_id: args.client_id.unwrap_or_else(Uuid::nil),
        dashboard_id: args.dashboard_id.unwrap_or_else(Uuid::nil),
        today: Local::now().date_naive(),
    };

    let records = parse_report(&content, args.granularity, &ctx);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize records")?
        );
    } else {
        println!("=== Campaign Report Parser ===");
        println!("File: {} ({} bytes)", args.file, content.len());
        println!("Granularity: {}", args.granularity);
        print_summary(&records);
    }

    Ok(())
}
