use crate::types::CaseField;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no column matching '{}' found for {field}", .field.needle())]
    MissingColumn { field: CaseField },

    #[error("no value in the distribution date column could be parsed as a date")]
    NoParsableDates,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no cases were distributed in {0}")]
    YearNotAvailable(i32),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no data loaded, load a CSV file first")]
    NotLoaded,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
