//! Spreadsheet URL handling.

use once_cell::sync::Lazy;
use regex::Regex;

static SPREADSHEET_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("spreadsheet id pattern is valid")
});

/// Id embedded in a sheet URL such as
/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`. First match wins.
pub fn extract_spreadsheet_id(url: &str) -> Option<&str> {
    SPREADSHEET_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Public CSV export of a single tab.
pub fn csv_export_url(base_url: &str, spreadsheet_id: &str, gid: &str) -> String {
    format!(
        "{}/spreadsheets/d/{}/export?format=csv&gid={}",
        base_url.trim_end_matches('/'),
        spreadsheet_id,
        gid
    )
}
