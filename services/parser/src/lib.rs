//! Campaign report parser
//!
//! Turns the CSV export of one spreadsheet tab into `CampaignRecord`s:
//! - Read rows honoring double-quoted fields
//! - Map Portuguese or English headers to canonical fields
//! - Coerce Brazilian-formatted numbers, currency and dates
//! - Derive CPM / CPC / CTR
//!
//! Parsing never fails. Missing columns default to zero (or the sync date)
//! and short rows are dropped. For a fixed `ReportContext` the output is
//! deterministic.

pub mod columns;
pub mod locale;
pub mod metrics;
pub mod record;

use columns::{ColumnMap, Field};
use csv::StringRecord;
use tracing::{debug, warn};

pub use metrics::DerivedMetrics;
pub use record::{CampaignRecord, Granularity, ReportContext};

/// Rows with fewer fields are treated as blank or trailing noise.
pub const MIN_FIELDS: usize = 3;

/// Split CSV text into records. Quoted fields keep their commas; the quotes
/// themselves are removed. Blank lines produce no record.
pub fn read_rows(content: &str) -> Vec<StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (line_idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => warn!(line = line_idx + 1, error = %e, "skipping unreadable csv record"),
        }
    }
    rows
}

/// Parse one tab export. The first row is the header row.
pub fn parse_report(content: &str, granularity: Granularity, ctx: &ReportContext) -> Vec<CampaignRecord> {
    let mut rows = read_rows(content).into_iter();

    let header = match rows.next() {
        Some(h) => h,
        None => {
            debug!(report_type = %granularity, "empty export, nothing to parse");
            return Vec::new();
        }
    };
    let headers: Vec<&str> = header.iter().collect();
    let columns = ColumnMap::resolve(&headers);

    let missing = columns.missing();
    if !missing.is_empty() {
        debug!(report_type = %granularity, ?missing, "columns not found, using defaults");
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        if row.len() < MIN_FIELDS {
            skipped += 1;
            continue;
        }
        records.push(build_record(&columns, &row, granularity, ctx));
    }

    debug!(
        report_type = %granularity,
        parsed = records.len(),
        skipped,
        "parsed campaign export"
    );
    records
}

fn build_record(
    columns: &ColumnMap,
    row: &StringRecord,
    granularity: Granularity,
    ctx: &ReportContext,
) -> CampaignRecord {
    let text = |field: Field| columns.get(field, row).unwrap_or("");

    let reach = locale::parse_count(text(Field::Reach));
    let impressions = locale::parse_count(text(Field::Impressions));
    let conversations_started = locale::parse_count(text(Field::Conversations));
    let profile_visits = locale::parse_count(text(Field::ProfileVisits));
    let amount_spent = locale::parse_currency(text(Field::AmountSpent));
    let derived = DerivedMetrics::compute(amount_spent, impressions, profile_visits);

    CampaignRecord {
        client_id: ctx.client_id,
        dashboard_id: ctx.dashboard_id,
        campaign_name: locale::clean_campaign_name(text(Field::CampaignName)),
        reach,
        impressions,
        frequency: locale::parse_decimal(text(Field::Frequency)),
        conversations_started,
        profile_visits,
        amount_spent,
        cpm: derived.cpm,
        cpc: derived.cpc,
        ctr: derived.ctr,
        report_type: granularity,
        period_start: locale::parse_date(text(Field::PeriodStart), ctx.today),
        period_end: locale::parse_date(text(Field::PeriodEnd), ctx.today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn ctx() -> ReportContext {
        ReportContext {
            client_id: Uuid::from_u128(1),
            dashboard_id: Uuid::from_u128(2),
            today: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -------------------------------------------------------------------------
    // ROW SPLITTING
    // -------------------------------------------------------------------------

    #[test]
    fn test_quoted_comma_is_preserved() {
        let rows = read_rows("\"A, B\",10,\"R$ 1.234,56\"\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(&rows[0][0], "A, B");
        assert_eq!(&rows[0][1], "10");
        assert_eq!(locale::parse_currency(&rows[0][2]), 1234.56);
    }

    #[test]
    fn test_blank_lines_produce_no_rows() {
        let rows = read_rows("a,b,c\n\n1,2,3\n\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rows = read_rows("a,b,c\r\n1,2,3\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "3");
    }

    // -------------------------------------------------------------------------
    // REPORT PARSING
    // -------------------------------------------------------------------------

    #[test]
    fn test_portuguese_export_scenario() {
        let csv = "Campanha,Conversas Iniciadas,Alcance,Impressões,Valor Investido (R$)\n\
                   Campanha X,50,10000,20000,R$ 500,00\n";
        let records = parse_report(csv, Granularity::Monthly, &ctx());

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.campaign_name, "Campanha X");
        assert_eq!(r.conversations_started, 50);
        assert_eq!(r.reach, 10000);
        assert_eq!(r.impressions, 20000);
        assert_eq!(r.amount_spent, 500.0);
        assert_eq!(r.cpm, 25.0);
        assert_eq!(r.report_type, Granularity::Monthly);
    }

    #[test]
    fn test_missing_columns_default() {
        let csv = "Campanha,Conversas Iniciadas,Alcance,Impressões,Valor Investido (R$)\n\
                   Campanha X,50,10000,20000,\"R$ 500,00\"\n";
        let r = &parse_report(csv, Granularity::Weekly, &ctx())[0];

        assert_eq!(r.frequency, 0.0);
        assert_eq!(r.profile_visits, 0);
        assert_eq!(r.cpc, 0.0);
        assert_eq!(r.ctr, 0.0);
        assert_eq!(r.period_start, ctx().today);
        assert_eq!(r.period_end, ctx().today);
    }

    #[test]
    fn test_english_weekly_export() {
        let csv = "Reporting starts,Reporting ends,Campaign name,Reach,Impressions,Frequency,Results,Instagram profile visits,Amount spent (BRL)\n\
                   01/09/2024,07/09/2024,Lead Ads,\"12.000\",\"40.000\",\"3,33\",120,400,\"R$ 1.000,00\"\n";
        let r = &parse_report(csv, Granularity::Weekly, &ctx())[0];

        assert_eq!(r.period_start, day(2024, 9, 1));
        assert_eq!(r.period_end, day(2024, 9, 7));
        assert_eq!(r.reach, 12000);
        assert_eq!(r.impressions, 40000);
        assert_eq!(r.frequency, 3.33);
        assert_eq!(r.conversations_started, 120);
        assert_eq!(r.profile_visits, 400);
        assert_eq!(r.amount_spent, 1000.0);
        assert_eq!(r.cpm, 25.0);
        assert_eq!(r.cpc, 2.5);
        assert!((r.ctr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_export_uses_single_day_column() {
        let csv = "Dia,Nome da campanha,Alcance,Impressões,Valor usado (BRL)\n\
                   05/03/2024,Remarketing,100,200,\"R$ 10,00\"\n";
        let r = &parse_report(csv, Granularity::Daily, &ctx())[0];

        assert_eq!(r.period_start, day(2024, 3, 5));
        assert_eq!(r.period_end, day(2024, 3, 5));
        assert_eq!(r.campaign_name, "Remarketing");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let csv = "Campanha,Alcance,Impressões\nA,1,2\nB,3\n,\nC,4,5\n";
        let records = parse_report(csv, Granularity::Daily, &ctx());
        let names: Vec<_> = records.iter().map(|r| r.campaign_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_duplicate_campaigns_are_kept() {
        let csv = "Campanha,Alcance,Impressões\nA,1,2\nA,1,2\n";
        let records = parse_report(csv, Granularity::Daily, &ctx());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_blank_campaign_name_placeholder() {
        let csv = "Campanha,Alcance,Impressões\n  ,1,2\n";
        let records = parse_report(csv, Granularity::Daily, &ctx());
        assert_eq!(records[0].campaign_name, locale::UNNAMED_CAMPAIGN);
    }

    #[test]
    fn test_context_ids_are_stamped() {
        let csv = "Campanha,Alcance,Impressões\nA,1,2\n";
        let r = &parse_report(csv, Granularity::Daily, &ctx())[0];
        assert_eq!(r.client_id, Uuid::from_u128(1));
        assert_eq!(r.dashboard_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_bom_on_header() {
        let csv = "\u{feff}Campanha,Alcance,Impressões\nA,7,9\n";
        let r = &parse_report(csv, Granularity::Daily, &ctx())[0];
        assert_eq!(r.campaign_name, "A");
        assert_eq!(r.reach, 7);
    }

    // -------------------------------------------------------------------------
    // EDGE CASES
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_input() {
        assert!(parse_report("", Granularity::Daily, &ctx()).is_empty());
    }

    #[test]
    fn test_header_only() {
        let csv = "Campanha,Alcance,Impressões\n";
        assert!(parse_report(csv, Granularity::Daily, &ctx()).is_empty());
    }

    #[test]
    fn test_parse_determinism() {
        let csv = "Campanha,Alcance,Impressões,Valor Investido (R$)\n\
                   A,\"1.000\",\"5.000\",\"R$ 50,00\"\n\
                   B,\"2.000\",\"8.000\",\"R$ 80,00\"\n";
        let baseline = parse_report(csv, Granularity::Monthly, &ctx());
        for _ in 0..10 {
            assert_eq!(parse_report(csv, Granularity::Monthly, &ctx()), baseline);
        }
    }
}
