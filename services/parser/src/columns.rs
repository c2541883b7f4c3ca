//! Header alias table for the campaign report exports.
//!
//! The ad platform exports the same report with Portuguese or English
//! headers depending on the account language. Every canonical field lists
//! its accepted labels (already lower-cased). Resolution runs once per tab;
//! data rows are then read by position.

use csv::StringRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CampaignName,
    Reach,
    Impressions,
    Frequency,
    Conversations,
    ProfileVisits,
    AmountSpent,
    PeriodStart,
    PeriodEnd,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::CampaignName,
        Field::Reach,
        Field::Impressions,
        Field::Frequency,
        Field::Conversations,
        Field::ProfileVisits,
        Field::AmountSpent,
        Field::PeriodStart,
        Field::PeriodEnd,
    ];

    /// Accepted header labels, most specific first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::CampaignName => &["nome da campanha", "campaign name", "campanha", "campaign"],
            Field::Reach => &["alcance", "reach"],
            Field::Impressions => &["impressões", "impressoes", "impressions"],
            Field::Frequency => &["frequência", "frequencia", "frequency"],
            Field::Conversations => &[
                "conversas iniciadas",
                "conversas por mensagem iniciadas",
                "messaging conversations started",
                "conversations started",
                "resultados",
                "results",
            ],
            Field::ProfileVisits => &[
                "visitas ao perfil do instagram",
                "visitas ao perfil",
                "instagram profile visits",
                "profile visits",
            ],
            Field::AmountSpent => &[
                "valor investido (r$)",
                "valor investido",
                "valor usado (brl)",
                "valor usado",
                "amount spent (brl)",
                "amount spent",
                "investimento",
            ],
            // The daily tab has a single "Dia" column; it feeds both ends.
            Field::PeriodStart => &[
                "início dos relatórios",
                "inicio dos relatorios",
                "reporting starts",
                "data de início",
                "data inicio",
                "dia",
                "day",
                "data",
                "date",
            ],
            Field::PeriodEnd => &[
                "término dos relatórios",
                "termino dos relatorios",
                "reporting ends",
                "data de término",
                "data fim",
                "dia",
                "day",
                "data",
                "date",
            ],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Field -> column position, resolved against one header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; Field::ALL.len()],
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();

        let mut positions = [None; Field::ALL.len()];
        for field in Field::ALL {
            positions[field.index()] = find_column(&normalized, field.aliases());
        }
        Self { positions }
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions[field.index()]
    }

    /// Cell for `field` in `row`; `None` when the column is unmapped or the row is short.
    pub fn get<'r>(&self, field: Field, row: &'r StringRecord) -> Option<&'r str> {
        self.position(field).and_then(|idx| row.get(idx))
    }

    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.position(*f).is_none())
            .collect()
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Exact label match across all headers wins; otherwise the first header
/// containing an alias, aliases tried in order.
fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(idx) = headers.iter().position(|h| h == alias) {
            return Some(idx);
        }
    }
    for alias in aliases {
        if let Some(idx) = headers.iter().position(|h| h.contains(alias)) {
            return Some(idx);
        }
    }
    None
}
