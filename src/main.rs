// Entry point and high-level CLI flow.
//
// - With `--file` and `--year` the binary loads, computes, exports and exits.
// - Otherwise it runs a menu loop: [1] loads a CSV into the session,
//   [2] prints and exports the statistics table for a chosen year,
//   [3] prints and exports the chart summary.
use anyhow::Context;
use clap::Parser;
use docket_stats::util::{format_int, format_number};
use docket_stats::{output, LoadReport, Session};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "docket_stats", version, about = "Case-docket statistics by action area")]
struct Cli {
    /// Docket CSV export to load at startup.
    #[arg(short, long, env = "DOCKET_FILE")]
    file: Option<PathBuf>,

    /// Year to report on; with --file, runs once without the menu.
    #[arg(short, long, env = "DOCKET_YEAR")]
    year: Option<i32>,

    /// Directory the CSV and JSON exports are written to.
    #[arg(short, long, env = "DOCKET_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,
}

/// One trimmed line from `input`, or `None` once it is closed or unreadable.
fn read_input<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            warn!(error = %e, "cannot read input");
            None
        }
    }
}

/// Print `label` and read the answer.
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_input(input)
}

fn print_load_report(report: &LoadReport) {
    println!("Processing dataset... ({} rows loaded)", format_int(report.total_rows));
    for (field, column) in &report.resolved_columns {
        println!("  {:<18} <- {}", field.to_string(), column);
    }
    if report.bad_distribution_dates > 0 {
        println!(
            "Note: {} rows have no readable distribution date and are left out of every year.",
            format_int(report.bad_distribution_dates)
        );
    }
    if report.bad_clearance_dates > 0 {
        println!(
            "Note: {} clearance dates could not be read and are treated as open cases.",
            format_int(report.bad_clearance_dates)
        );
    }
    println!();
}

/// Option [1]: load (or replace) the session dataset.
fn handle_load<R: BufRead>(input: &mut R, session: &mut Session, default: Option<&Path>) {
    let hint = default.map(|p| format!(" [{}]", p.display())).unwrap_or_default();
    let Some(answer) = prompt(input, &format!("CSV file{}: ", hint)) else {
        return;
    };
    let path = match (answer.is_empty(), default) {
        (false, _) => PathBuf::from(answer),
        (true, Some(p)) => p.to_path_buf(),
        (true, None) => {
            println!("No file given.\n");
            return;
        }
    };
    match session.load(&path) {
        Ok(report) => print_load_report(&report),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}", e);
            eprintln!("Check that the CSV has the expected columns and date format.\n");
        }
    }
}

/// Ask for one of the dataset's years; the first year is the default.
fn select_year<R: BufRead>(input: &mut R, session: &Session) -> Option<i32> {
    let years = match session.dataset() {
        Ok(data) => data.years().to_vec(),
        Err(e) => {
            println!("Error: {}\n", e);
            return None;
        }
    };
    let Some(&first) = years.first() else {
        println!("The loaded dataset has no distribution years.\n");
        return None;
    };
    let list: Vec<String> = years.iter().map(i32::to_string).collect();
    println!("Available years: {}", list.join(", "));
    let answer = prompt(input, &format!("Select year [{}]: ", first))?;
    if answer.is_empty() {
        return Some(first);
    }
    match answer.parse::<i32>() {
        Ok(y) => Some(y),
        Err(_) => {
            println!("Invalid year: {}\n", answer);
            None
        }
    }
}

/// Option [2]: statistics table for a year, printed and exported as CSV.
fn handle_statistics(session: &Session, year: i32, out_dir: &Path) -> anyhow::Result<()> {
    let table = session.statistics(year)?;
    println!("Análise de Processos por Área de Ação - {}\n", year);
    output::preview_table_rows(&table.rows, table.rows.len());
    let path = output::export_statistics(out_dir, &table)
        .with_context(|| format!("exporting statistics to {}", out_dir.display()))?;
    info!(path = %path.display(), rows = table.rows.len(), "statistics exported");
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

/// Option [3]: chart bars and headline metrics, printed and exported as JSON.
fn handle_chart(session: &Session, year: i32, out_dir: &Path) -> anyhow::Result<()> {
    let chart = session.chart(year)?;
    println!("Distribuídos X Baixados X Pendentes - {}\n", year);
    println!(
        "Distribuídos: {} | Baixados: {} | Pendentes: {} | Taxa de Cong. (%): {}\n",
        format_int(chart.total_distributed),
        format_int(chart.total_cleared),
        format_int(chart.total_pending),
        format_number(chart.congestion_rate, 2)
    );
    output::preview_table_rows(&chart.bars, chart.bars.len());
    let path = output::export_chart(out_dir, &chart)
        .with_context(|| format!("exporting chart data to {}", out_dir.display()))?;
    info!(path = %path.display(), "chart summary exported");
    println!("(Chart data exported to {})\n", path.display());
    Ok(())
}

fn run_batch(cli: &Cli, file: &Path, year: i32) -> anyhow::Result<()> {
    let mut session = Session::new();
    let report = session
        .load(file)
        .with_context(|| format!("loading {}", file.display()))?;
    print_load_report(&report);
    handle_statistics(&session, year, &cli.out_dir)?;
    handle_chart(&session, year, &cli.out_dir)
}

/// Menu loop; returns when the user picks [0] or `input` is exhausted.
fn run_menu<R: BufRead>(cli: &Cli, input: &mut R) {
    let mut session = Session::new();
    if let Some(file) = &cli.file {
        match session.load(file) {
            Ok(report) => print_load_report(&report),
            Err(e) => eprintln!("Failed to load file: {}\n", e),
        }
    }
    loop {
        println!("Docket Statistics:");
        println!("[1] Load the file");
        println!("[2] Statistics table");
        println!("[3] Chart summary");
        println!("[0] Exit\n");
        let Some(choice) = prompt(input, "Enter choice: ") else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        let result = match choice.as_str() {
            "1" => {
                handle_load(input, &mut session, cli.file.as_deref());
                Ok(())
            }
            "2" => match cli.year.or_else(|| select_year(input, &session)) {
                Some(year) => handle_statistics(&session, year, &cli.out_dir),
                None => Ok(()),
            },
            "3" => match cli.year.or_else(|| select_year(input, &session)) {
                Some(year) => handle_chart(&session, year, &cli.out_dir),
                None => Ok(()),
            },
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 0, 1, 2 or 3.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            error!(error = %e, "request failed");
            eprintln!("Error: {:#}\n", e);
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    info!("docket_stats v{}", env!("CARGO_PKG_VERSION"));

    match (&cli.file, cli.year) {
        (Some(file), Some(year)) => run_batch(&cli, file, year),
        _ => {
            run_menu(&cli, &mut io::stdin().lock());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cli(out_dir: &Path) -> Cli {
        Cli { file: None, year: None, out_dir: out_dir.to_path_buf() }
    }

    #[test]
    fn read_input_distinguishes_blank_lines_from_eof() {
        let mut input: &[u8] = b"  2023 \n\n";
        assert_eq!(read_input(&mut input), Some("2023".to_string()));
        assert_eq!(read_input(&mut input), Some(String::new()));
        assert_eq!(read_input(&mut input), None);
    }

    #[test]
    fn menu_exits_on_closed_input() {
        let dir = tempfile::tempdir().unwrap();
        run_menu(&cli(dir.path()), &mut io::empty());
    }

    #[test]
    fn menu_exits_when_input_ends_mid_prompt() {
        let dir = tempfile::tempdir().unwrap();
        // Invalid choice, statistics without data, then a load prompt left unanswered.
        let mut input: &[u8] = b"9\n2\n1\n";
        run_menu(&cli(dir.path()), &mut input);
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn menu_loads_and_exports_from_scripted_input() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("processos.csv");
        fs::write(
            &csv,
            "processo_id,data_distribuicao,data_baixa,nome_area_acao\n1,2023-01-10,,Civil\n2,2023-02-11,2023-03-01,Civil\n",
        )
        .unwrap();
        let out_dir = dir.path().join("out");
        let script = format!("1\n{}\n2\n\n3\n2023\n0\n", csv.display());
        run_menu(&cli(&out_dir), &mut script.as_bytes());
        assert!(out_dir.join(output::export_file_name(2023)).is_file());
        assert!(out_dir.join(output::chart_file_name(2023)).is_file());
    }
}
