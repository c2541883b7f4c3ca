//! Collector - Pulls campaign reports from a shared spreadsheet into the store
//!
//! Responsibilities:
//! - Extract the spreadsheet id from the URL configured on a dashboard
//! - Fetch the daily / weekly / monthly tab exports concurrently
//! - Parse them into campaign records (see the `parser` crate)
//! - Replace the dashboard's rows and stamp its last sync time
//! - Record every sync run for auditing

pub mod config;
pub mod fetch;
pub mod spreadsheet;
pub mod store;
pub mod sync;

pub use config::Config;
pub use fetch::{SheetFetcher, TabIds};
pub use store::{CampaignStore, PgStore};
pub use sync::{collect_records, run_sync, GranularityCounts, SyncError, SyncOutcome, SyncRequest};
