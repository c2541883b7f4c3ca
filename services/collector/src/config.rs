use anyhow::{Context, Result};
use std::time::Duration;

use crate::fetch::DEFAULT_BASE_URL;

const USER_AGENT: &str = "CampaignSheetSync/1.0 (+dashboard sync)";

/// Settings shared by every binary that runs a sync.
#[derive(Debug, Clone)]
pub struct Config {
    /// Only required by code paths that touch the database.
    pub db_url: Option<String>,
    pub sheets_base_url: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_url: std::env::var("DB_URL").ok(),
            sheets_base_url: std::env::var("SHEETS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    pub fn require_db_url(&self) -> Result<&str> {
        self.db_url.as_deref().context("DB_URL env var missing")
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.http_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")
    }
}
