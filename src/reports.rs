use crate::error::StatsError;
use crate::types::{ChartBar, ChartSummary, Dataset, StatsRow, StatsTable, TOTAL_LABEL};
use crate::util::congestion_rate;
use std::collections::{HashMap, HashSet};
use std::iter;
use tracing::debug;

/// Per-category docket statistics for `year`, followed by a totals row.
///
/// Categories come from the cases distributed in `year`, in order of first
/// appearance. Clearances are taken from the whole dataset and counted by
/// distinct process id; a category that only has clearances in `year` does
/// not get a row of its own. Rows without an action area are ignored, and
/// clearances without a process id are not counted.
pub fn compute(data: &Dataset, year: i32) -> Result<StatsTable, StatsError> {
    #[derive(Default)]
    struct Acc {
        distributed: usize,
        pending: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Acc> = HashMap::new();
    for r in data.records() {
        if r.distribution_year() != Some(year) {
            continue;
        }
        let Some(area) = r.action_area.as_deref() else {
            continue;
        };
        let e = groups.entry(area).or_insert_with(|| {
            order.push(area);
            Acc::default()
        });
        e.distributed += 1;
        if r.is_open() {
            e.pending += 1;
        }
    }
    if order.is_empty() {
        return Err(StatsError::YearNotAvailable(year));
    }

    let mut cleared: HashMap<&str, HashSet<&str>> = HashMap::new();
    for r in data.records() {
        if r.clearance_year() != Some(year) {
            continue;
        }
        if let (Some(area), Some(id)) = (r.action_area.as_deref(), r.process_id.as_deref()) {
            cleared.entry(area).or_default().insert(id);
        }
    }

    let categories: Vec<StatsRow> = order
        .iter()
        .map(|area| {
            let acc = &groups[area];
            let cleared_count = cleared.get(area).map_or(0, HashSet::len);
            StatsRow {
                action_area: area.to_string(),
                distributed_count: acc.distributed,
                cleared_count,
                pending_count: acc.pending,
                congestion_rate: congestion_rate(acc.pending, cleared_count),
            }
        })
        .collect();
    let totals = totals_row(&categories);
    debug!(
        year,
        categories = categories.len(),
        distributed = totals.distributed_count,
        cleared = totals.cleared_count,
        pending = totals.pending_count,
        "statistics computed"
    );

    let rows = categories.into_iter().chain(iter::once(totals)).collect();
    Ok(StatsTable { year, rows })
}

/// Sum the category counts; the rate is recomputed from the sums, not
/// averaged across rows.
fn totals_row(categories: &[StatsRow]) -> StatsRow {
    let distributed_count = categories.iter().map(|r| r.distributed_count).sum();
    let cleared_count = categories.iter().map(|r| r.cleared_count).sum();
    let pending_count = categories.iter().map(|r| r.pending_count).sum();
    StatsRow {
        action_area: TOTAL_LABEL.to_string(),
        distributed_count,
        cleared_count,
        pending_count,
        congestion_rate: congestion_rate(pending_count, cleared_count),
    }
}

/// Bars and headline metrics for the chart view of a statistics table.
///
/// The headline congestion rate is the dataset-wide ratio, the same value
/// as the totals row.
pub fn chart_summary(table: &StatsTable) -> ChartSummary {
    let bars: Vec<ChartBar> = table
        .categories()
        .iter()
        .map(|r| ChartBar {
            action_area: r.action_area.clone(),
            distributed: r.distributed_count,
            cleared: r.cleared_count,
            pending: r.pending_count,
        })
        .collect();
    let total_distributed = bars.iter().map(|b| b.distributed).sum();
    let total_cleared = bars.iter().map(|b| b.cleared).sum();
    let total_pending = bars.iter().map(|b| b.pending).sum();
    ChartSummary {
        year: table.year,
        total_distributed,
        total_cleared,
        total_pending,
        congestion_rate: congestion_rate(total_pending, total_cleared),
        bars,
    }
}
