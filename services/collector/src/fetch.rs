//! Spreadsheet tab fetcher.
//!
//! A failed tab is not an error: it yields no body and the other tabs carry
//! on. There is no retry.

use parser::Granularity;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::spreadsheet::csv_export_url;

pub const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Tab (`gid`) per report granularity. A missing gid means the tab is not fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TabIds {
    #[serde(rename = "daily_gid", default)]
    pub daily: Option<String>,
    #[serde(rename = "weekly_gid", default)]
    pub weekly: Option<String>,
    #[serde(rename = "monthly_gid", default)]
    pub monthly: Option<String>,
}

impl TabIds {
    pub fn get(&self, granularity: Granularity) -> Option<&str> {
        match granularity {
            Granularity::Daily => self.daily.as_deref(),
            Granularity::Weekly => self.weekly.as_deref(),
            Granularity::Monthly => self.monthly.as_deref(),
        }
    }
}

/// Raw CSV bodies; `None` for tabs that were skipped or failed.
#[derive(Debug, Default)]
pub struct FetchedTabs {
    pub daily: Option<String>,
    pub weekly: Option<String>,
    pub monthly: Option<String>,
}

impl FetchedTabs {
    pub fn get(&self, granularity: Granularity) -> Option<&str> {
        match granularity {
            Granularity::Daily => self.daily.as_deref(),
            Granularity::Weekly => self.weekly.as_deref(),
            Granularity::Monthly => self.monthly.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl SheetFetcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// GET one tab export. Transport errors and non-2xx responses give `None`.
    pub async fn fetch_tab(&self, spreadsheet_id: &str, gid: &str) -> Option<String> {
        let url = csv_export_url(&self.base_url, spreadsheet_id, gid);
        debug!(%url, "fetching tab export");

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(gid, error = %e, "tab export request failed");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(gid, status = status.as_u16(), "tab export returned error status");
            return None;
        }

        match resp.text().await {
            Ok(body) => {
                debug!(gid, bytes = body.len(), "tab export downloaded");
                Some(body)
            }
            Err(e) => {
                warn!(gid, error = %e, "failed to read tab export body");
                None
            }
        }
    }

    async fn fetch_optional(&self, spreadsheet_id: &str, gid: Option<&str>) -> Option<String> {
        match gid {
            Some(gid) => self.fetch_tab(spreadsheet_id, gid).await,
            None => None,
        }
    }

    /// Fetch the three tabs concurrently.
    pub async fn fetch_tabs(&self, spreadsheet_id: &str, tabs: &TabIds) -> FetchedTabs {
        let (daily, weekly, monthly) = tokio::join!(
            self.fetch_optional(spreadsheet_id, tabs.daily.as_deref()),
            self.fetch_optional(spreadsheet_id, tabs.weekly.as_deref()),
            self.fetch_optional(spreadsheet_id, tabs.monthly.as_deref()),
        );
        FetchedTabs {
            daily,
            weekly,
            monthly,
        }
    }
}

/// Same digest format the sync-run audit records.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fetcher(server: &MockServer) -> SheetFetcher {
        SheetFetcher::new(reqwest::Client::new(), server.base_url())
    }

    #[tokio::test]
    async fn test_fetch_tab_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/spreadsheets/d/sheet1/export")
                    .query_param("format", "csv")
                    .query_param("gid", "42");
                then.status(200).body("Campanha,Alcance,Impressões\nA,1,2\n");
            })
            .await;

        let body = fetcher(&server).fetch_tab("sheet1", "42").await;

        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some("Campanha,Alcance,Impressões\nA,1,2\n"));
    }

    #[tokio::test]
    async fn test_fetch_tab_error_status_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/spreadsheets/d/sheet1/export");
                then.status(404).body("not found");
            })
            .await;

        assert_eq!(fetcher(&server).fetch_tab("sheet1", "1").await, None);
    }

    #[tokio::test]
    async fn test_fetch_tab_connection_refused_is_none() {
        // Nothing listens on port 9 of localhost.
        let fetcher = SheetFetcher::new(reqwest::Client::new(), "http://127.0.0.1:9");
        assert_eq!(fetcher.fetch_tab("sheet1", "1").await, None);
    }

    #[tokio::test]
    async fn test_fetch_tabs_skips_missing_gid() {
        let server = MockServer::start_async().await;
        let daily = server
            .mock_async(|when, then| {
                when.method(GET).query_param("gid", "1");
                then.status(200).body("daily");
            })
            .await;
        let monthly = server
            .mock_async(|when, then| {
                when.method(GET).query_param("gid", "3");
                then.status(500);
            })
            .await;

        let tabs = TabIds {
            daily: Some("1".into()),
            weekly: None,
            monthly: Some("3".into()),
        };
        let fetched = fetcher(&server).fetch_tabs("sheet1", &tabs).await;

        daily.assert_hits_async(1).await;
        monthly.assert_hits_async(1).await;
        assert_eq!(fetched.get(Granularity::Daily), Some("daily"));
        assert_eq!(fetched.get(Granularity::Weekly), None);
        assert_eq!(fetched.get(Granularity::Monthly), None);
    }

    #[test]
    fn test_tab_ids_deserialize_from_request_names() {
        let tabs: TabIds = serde_json::from_str(r#"{"daily_gid":"0","monthly_gid":"99"}"#).unwrap();
        assert_eq!(tabs.get(Granularity::Daily), Some("0"));
        assert_eq!(tabs.get(Granularity::Weekly), None);
        assert_eq!(tabs.get(Granularity::Monthly), Some("99"));
    }

    #[test]
    fn test_content_hash_format() {
        let hash = content_hash("abc");
        assert_eq!(
            hash,
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
