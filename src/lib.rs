//! Case-docket statistics by action area.
//!
//! [`loader`] turns a docket CSV export into a normalized [`Dataset`];
//! [`reports::compute`] turns that dataset and a year into a [`StatsTable`]
//! of distributed, cleared and pending counts with congestion rates.

pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod session;
pub mod types;
pub mod util;

pub use error::{LoadError, SchemaError, SessionError, StatsError};
pub use loader::LoadReport;
pub use session::Session;
pub use types::{CaseRecord, ChartSummary, Dataset, StatsRow, StatsTable};
