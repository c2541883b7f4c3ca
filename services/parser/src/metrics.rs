//! Advertising efficiency ratios.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DerivedMetrics {
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
}

impl DerivedMetrics {
    /// `clicks` is whatever the report offers as a click count (profile
    /// visits for the current exports). Zero denominators give zero; values
    /// are otherwise passed through unchecked.
    pub fn compute(spend: f64, impressions: i64, clicks: i64) -> Self {
        let cpm = if impressions > 0 {
            spend / impressions as f64 * 1000.0
        } else {
            0.0
        };
        let cpc = if clicks > 0 { spend / clicks as f64 } else { 0.0 };
        let ctr = if impressions > 0 {
            clicks as f64 / impressions as f64 * 100.0
        } else {
            0.0
        };
        Self { cpm, cpc, ctr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpm() {
        let m = DerivedMetrics::compute(500.0, 20_000, 0);
        assert_eq!(m.cpm, 25.0);
    }

    #[test]
    fn test_cpc_and_ctr() {
        let m = DerivedMetrics::compute(100.0, 10_000, 200);
        assert_eq!(m.cpc, 0.5);
        assert_eq!(m.ctr, 2.0);
    }

    #[test]
    fn test_zero_impressions_guard() {
        for spend in [0.0, 1.0, 1_000_000.0] {
            let m = DerivedMetrics::compute(spend, 0, 50);
            assert_eq!(m.cpm, 0.0);
            assert_eq!(m.ctr, 0.0);
        }
    }

    #[test]
    fn test_zero_clicks_guard() {
        for spend in [0.0, 3.5, 99_999.0] {
            assert_eq!(DerivedMetrics::compute(spend, 1000, 0).cpc, 0.0);
        }
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(DerivedMetrics::compute(0.0, 0, 0), DerivedMetrics::default());
    }
}
