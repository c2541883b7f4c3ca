//! Campaign record model shared by the collector and the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Reporting bucket. Each one is sourced from its own spreadsheet tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Order in which tabs are concatenated during a sync.
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "diario" | "diário" => Ok(Granularity::Daily),
            "weekly" | "semanal" => Ok(Granularity::Weekly),
            "monthly" | "mensal" => Ok(Granularity::Monthly),
            other => Err(format!(
                "unknown report type '{}', expected daily, weekly or monthly",
                other
            )),
        }
    }
}

/// One campaign row for one reporting period of one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub client_id: Uuid,
    pub dashboard_id: Uuid,
    pub campaign_name: String,
    pub reach: i64,
    pub impressions: i64,
    pub frequency: f64,
    pub conversations_started: i64,
    /// Stand-in for link clicks; the exports carry no click column.
    pub profile_visits: i64,
    pub amount_spent: f64,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub report_type: Granularity,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Values that are constant for every row parsed during a single sync.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    pub client_id: Uuid,
    pub dashboard_id: Uuid,
    /// Fallback for missing or unreadable period dates.
    pub today: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_round_trips_through_str() {
        for g in Granularity::ALL {
            assert_eq!(g.as_str().parse::<Granularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_granularity_accepts_portuguese_labels() {
        assert_eq!("Mensal".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!(" semanal ".parse::<Granularity>().unwrap(), Granularity::Weekly);
    }

    #[test]
    fn test_granularity_rejects_unknown() {
        let err = "yearly".parse::<Granularity>().unwrap_err();
        assert!(err.contains("yearly"));
    }

    #[test]
    fn test_granularity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Granularity::Weekly).unwrap(), "\"weekly\"");
    }
}
