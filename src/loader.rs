use crate::error::{LoadError, SchemaError};
use crate::types::{CaseField, CaseRecord, Dataset, RawTable};
use crate::util::{non_blank, parse_date_safe};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Rows whose distribution date was blank or unreadable.
    pub bad_distribution_dates: usize,
    /// Rows with a non-blank clearance date that could not be read.
    pub bad_clearance_dates: usize,
    /// Source column matched for each field, in `CaseField::ALL` order.
    pub resolved_columns: Vec<(CaseField, String)>,
}

/// Column positions for the four semantic fields.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    distribution_date: usize,
    clearance_date: usize,
    action_area: usize,
    process_id: usize,
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<(Dataset, LoadReport), LoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading docket CSV");
    let file = File::open(path)?;
    load_reader(file)
}

pub fn load_reader<R: Read>(rdr: R) -> Result<(Dataset, LoadReport), LoadError> {
    let raw = read_raw_table(rdr)?;
    load(&raw)
}

/// Read every row as text. Short rows are padded so each row has one cell
/// per header.
pub fn read_raw_table<R: Read>(rdr: R) -> Result<RawTable, LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

/// First header whose lower-cased name contains the field's needle.
pub fn resolve_column(headers: &[String], field: CaseField) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(field.needle()))
        .ok_or(SchemaError::MissingColumn { field })
}

fn resolve_columns(headers: &[String]) -> Result<ColumnMap, SchemaError> {
    Ok(ColumnMap {
        distribution_date: resolve_column(headers, CaseField::DistributionDate)?,
        clearance_date: resolve_column(headers, CaseField::ClearanceDate)?,
        action_area: resolve_column(headers, CaseField::ActionArea)?,
        process_id: resolve_column(headers, CaseField::ProcessId)?,
    })
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Normalize a raw table into case records.
///
/// Unreadable dates become `None` and are counted in the report. The load
/// fails only when a field has no matching column or when not a single
/// distribution date could be read.
pub fn load(raw: &RawTable) -> Result<(Dataset, LoadReport), LoadError> {
    let cols = resolve_columns(&raw.headers)?;

    let mut bad_distribution_dates = 0usize;
    let mut bad_clearance_dates = 0usize;
    let records: Vec<CaseRecord> = raw
        .rows
        .iter()
        .map(|row| {
            let distribution_date = parse_date_safe(Some(cell(row, cols.distribution_date)));
            if distribution_date.is_none() {
                bad_distribution_dates += 1;
            }
            let clearance_raw = cell(row, cols.clearance_date);
            let clearance_date = parse_date_safe(Some(clearance_raw));
            if clearance_date.is_none() && !clearance_raw.trim().is_empty() {
                bad_clearance_dates += 1;
            }
            CaseRecord {
                process_id: non_blank(cell(row, cols.process_id)),
                distribution_date,
                clearance_date,
                action_area: non_blank(cell(row, cols.action_area)),
            }
        })
        .collect();

    if records.iter().all(|r| r.distribution_date.is_none()) {
        return Err(SchemaError::NoParsableDates.into());
    }

    let resolved_columns = CaseField::ALL
        .iter()
        .zip([cols.distribution_date, cols.clearance_date, cols.action_area, cols.process_id])
        .map(|(field, idx)| (*field, raw.headers[idx].clone()))
        .collect();
    let report = LoadReport {
        total_rows: records.len(),
        bad_distribution_dates,
        bad_clearance_dates,
        resolved_columns,
    };
    let dataset = Dataset::new(records);
    debug!(years = ?dataset.years(), "distribution years found");
    info!(
        rows = report.total_rows,
        bad_distribution_dates,
        bad_clearance_dates,
        "dataset normalized"
    );
    Ok((dataset, report))
}
