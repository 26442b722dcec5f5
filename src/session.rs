// In-memory state for one interactive run. The dataset is loaded once per
// file and reused for every statistics request until another file replaces it.
use crate::error::SessionError;
use crate::loader::{self, LoadReport};
use crate::reports;
use crate::types::{ChartSummary, Dataset, StatsTable};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default)]
pub struct Session {
    loaded: Option<Loaded>,
}

#[derive(Debug)]
struct Loaded {
    source: PathBuf,
    data: Dataset,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, replacing any dataset already held.
    ///
    /// On failure the previous dataset is dropped as well, so a bad upload
    /// never leaves stale statistics behind.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, SessionError> {
        let path = path.as_ref();
        if let Some(prev) = self.loaded.take() {
            info!(previous = %prev.source.display(), "discarding loaded dataset");
        }
        let (data, report) = loader::load_path(path)?;
        self.loaded = Some(Loaded { source: path.to_path_buf(), data });
        Ok(report)
    }

    /// Install an already normalized dataset.
    pub fn replace(&mut self, source: impl Into<PathBuf>, data: Dataset) {
        self.loaded = Some(Loaded { source: source.into(), data });
    }

    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn source(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.source.as_path())
    }

    pub fn dataset(&self) -> Result<&Dataset, SessionError> {
        self.loaded.as_ref().map(|l| &l.data).ok_or(SessionError::NotLoaded)
    }

    pub fn statistics(&self, year: i32) -> Result<StatsTable, SessionError> {
        Ok(reports::compute(self.dataset()?, year)?)
    }

    pub fn chart(&self, year: i32) -> Result<ChartSummary, SessionError> {
        let table = self.statistics(year)?;
        Ok(reports::chart_summary(&table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LoadError, SchemaError, StatsError};
    use std::fs;

    const CSV: &str = "\
processo_id,data_distribuicao,data_baixa,nome_area_acao
1,2023-01-10,,Civil
2,2023-02-11,2023-03-01,Civil
3,2022-07-07,2023-01-01,Penal
";

    #[test]
    fn requests_before_load_fail() {
        let session = Session::new();
        assert!(!session.is_loaded());
        assert!(matches!(session.dataset(), Err(SessionError::NotLoaded)));
        assert!(matches!(session.statistics(2023), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn load_then_compute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processos.csv");
        fs::write(&path, CSV).unwrap();

        let mut session = Session::new();
        let report = session.load(&path).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(session.source(), Some(path.as_path()));
        assert_eq!(session.dataset().unwrap().years(), &[2022, 2023]);

        let table = session.statistics(2023).unwrap();
        let totals = table.totals().unwrap();
        assert_eq!(totals.distributed_count, 2);
        assert_eq!(totals.cleared_count, 1);
        assert_eq!(totals.pending_count, 1);

        let chart = session.chart(2023).unwrap();
        assert_eq!(chart.congestion_rate, 50.0);

        assert!(matches!(
            session.statistics(2020),
            Err(SessionError::Stats(StatsError::YearNotAvailable(2020)))
        ));
    }

    #[test]
    fn failed_reload_drops_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        fs::write(&good, CSV).unwrap();
        fs::write(&bad, "id,when\n1,2023-01-01\n").unwrap();

        let mut session = Session::new();
        session.load(&good).unwrap();
        let err = session.load(&bad).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Load(LoadError::Schema(SchemaError::MissingColumn { .. }))
        ));
        assert!(!session.is_loaded());
    }

    #[test]
    fn replace_and_clear() {
        let mut session = Session::new();
        session.replace("memory", Dataset::default());
        assert!(session.is_loaded());
        assert!(session.dataset().unwrap().is_empty());
        session.clear();
        assert!(!session.is_loaded());
    }
}
