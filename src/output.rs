use crate::error::OutputError;
use crate::types::{ChartSummary, StatsTable};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// File name the statistics table is exported under.
pub fn export_file_name(year: i32) -> String {
    format!("estatisticas_processos_{}.csv", year)
}

/// File name the chart summary is exported under.
pub fn chart_file_name(year: i32) -> String {
    format!("grafico_processos_{}.json", year)
}

/// Write every row of `table`, totals included, to
/// `out_dir/estatisticas_processos_{year}.csv`. Returns the written path.
pub fn export_statistics(out_dir: &Path, table: &StatsTable) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(export_file_name(table.year));
    let mut wtr = csv::Writer::from_path(&path)?;
    table.rows.iter().try_for_each(|r| wtr.serialize(r))?;
    wtr.flush()?;
    Ok(path)
}

/// Write the chart bars and headline metrics as pretty JSON to
/// `out_dir/grafico_processos_{year}.json`. Returns the written path.
pub fn export_chart(out_dir: &Path, chart: &ChartSummary) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(chart_file_name(chart.year));
    fs::write(&path, serde_json::to_string_pretty(chart)?)?;
    Ok(path)
}

pub fn render_table<T: Tabled + Clone>(rows: &[T]) -> String {
    Table::new(rows.iter().cloned()).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T: Tabled + Clone>(rows: &[T], max_rows: usize) {
    let slice = &rows[..rows.len().min(max_rows)];
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_table(slice));
}
