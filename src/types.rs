use crate::util::{format_int, format_number};
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

/// Label used for the aggregate row appended after the category rows.
pub const TOTAL_LABEL: &str = "TOTAL";

/// The four semantic columns a docket export must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseField {
    DistributionDate,
    ClearanceDate,
    ActionArea,
    ProcessId,
}

impl CaseField {
    pub const ALL: [CaseField; 4] = [
        CaseField::DistributionDate,
        CaseField::ClearanceDate,
        CaseField::ActionArea,
        CaseField::ProcessId,
    ];

    /// Lower-case substring a source column name must contain to match.
    pub fn needle(self) -> &'static str {
        match self {
            CaseField::DistributionDate => "data_distribuicao",
            CaseField::ClearanceDate => "data_baixa",
            CaseField::ActionArea => "nome_area_acao",
            CaseField::ProcessId => "processo_id",
        }
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseField::DistributionDate => "distribution date",
            CaseField::ClearanceDate => "clearance date",
            CaseField::ActionArea => "action area",
            CaseField::ProcessId => "process id",
        };
        f.write_str(name)
    }
}

/// A CSV file as read from disk, before any column resolution.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Each data row, padded with blanks to the header width.
    pub rows: Vec<Vec<String>>,
}

/// One normalized row of the docket export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    pub process_id: Option<String>,
    pub distribution_date: Option<NaiveDate>,
    pub clearance_date: Option<NaiveDate>,
    pub action_area: Option<String>,
}

impl CaseRecord {
    pub fn distribution_year(&self) -> Option<i32> {
        self.distribution_date.map(|d| d.year())
    }

    pub fn clearance_year(&self) -> Option<i32> {
        self.clearance_date.map(|d| d.year())
    }

    pub fn is_open(&self) -> bool {
        self.clearance_date.is_none()
    }
}

/// Normalized record set plus the distribution years it covers.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CaseRecord>,
    years: Vec<i32>,
}

impl Dataset {
    pub fn new(records: Vec<CaseRecord>) -> Self {
        let mut years: Vec<i32> = records.iter().filter_map(CaseRecord::distribution_year).collect();
        years.sort_unstable();
        years.dedup();
        Self { records, years }
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Distinct distribution years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct StatsRow {
    #[serde(rename = "nome_area_acao")]
    #[tabled(rename = "nome_area_acao")]
    pub action_area: String,
    #[serde(rename = "Distribuídos")]
    #[tabled(rename = "Distribuídos", display_with = "display_count")]
    pub distributed_count: usize,
    #[serde(rename = "Baixados")]
    #[tabled(rename = "Baixados", display_with = "display_count")]
    pub cleared_count: usize,
    #[serde(rename = "Pendentes")]
    #[tabled(rename = "Pendentes", display_with = "display_count")]
    pub pending_count: usize,
    #[serde(rename = "Taxa de Congestionamento (%)", serialize_with = "serialize_rate")]
    #[tabled(rename = "Taxa de Congestionamento (%)", display_with = "display_rate")]
    pub congestion_rate: f64,
}

impl StatsRow {
    pub fn is_total(&self) -> bool {
        self.action_area == TOTAL_LABEL
    }
}

/// Category rows for one year, followed by the totals row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsTable {
    pub year: i32,
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    pub fn categories(&self) -> &[StatsRow] {
        match self.rows.split_last() {
            Some((_, categories)) => categories,
            None => &[],
        }
    }

    pub fn totals(&self) -> Option<&StatsRow> {
        self.rows.last().filter(|r| r.is_total())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ChartBar {
    #[tabled(rename = "nome_area_acao")]
    pub action_area: String,
    #[tabled(rename = "Distribuídos", display_with = "display_count")]
    pub distributed: usize,
    #[tabled(rename = "Baixados", display_with = "display_count")]
    pub cleared: usize,
    #[tabled(rename = "Pendentes", display_with = "display_count")]
    pub pending: usize,
}

/// Data behind the "distributed x cleared x pending" chart view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub year: i32,
    pub total_distributed: usize,
    pub total_cleared: usize,
    pub total_pending: usize,
    pub congestion_rate: f64,
    pub bars: Vec<ChartBar>,
}

fn display_count(n: &usize) -> String {
    format_int(*n)
}

fn display_rate(rate: &f64) -> String {
    format_number(*rate, 2)
}

fn serialize_rate<S: Serializer>(rate: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.2}", rate))
}
