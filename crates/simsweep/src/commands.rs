//! Subcommand implementations: run a sweep, reshape a persisted table.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::eyre;
use simsweep_core::runner::SweepRunner;
use simsweep_core::table::{read_table, write_table};
use simsweep_core::{ResultGrid, RowMode, SweepOutcome, SweepProgress};
use tracing::{info, warn};

use crate::plan::SweepPlan;

/// How often the reporter thread logs progress
const PROGRESS_POLL: Duration = Duration::from_millis(500);

fn load_plan(path: &Path) -> color_eyre::Result<SweepPlan> {
    let text =
        fs::read_to_string(path).map_err(|e| eyre!("cannot read plan {}: {e}", path.display()))?;
    SweepPlan::from_yaml(&text).map_err(|e| eyre!("cannot parse plan {}: {e}", path.display()))
}

/// `simsweep run`: execute the plan, write the table, report the outcome.
pub fn run_sweep(
    plan_path: &Path,
    results_dir: Option<PathBuf>,
    max_processes: Option<usize>,
    strict: bool,
    summary_json: Option<&Path>,
) -> color_eyre::Result<ExitCode> {
    let mut plan = load_plan(plan_path)?;
    if let Some(dir) = results_dir {
        plan.results_dir = dir;
    }
    if let Some(cap) = max_processes {
        plan.max_processes = Some(cap);
    }

    let space = plan.space()?;
    let runner = SweepRunner::resolve(
        plan.sweep_config(),
        &plan.script,
        &plan.resolver(),
        plan.env(),
    )?;
    info!(executable = %runner.executable().display(), "resolved executable");

    let progress = SweepProgress::default();
    let (done_tx, done_rx) = mpsc::channel();
    let started = Instant::now();

    let outcome = thread::scope(|s| {
        let reporter = progress.clone();
        s.spawn(move || report_until_done(&done_rx, &reporter));
        let outcome = runner.run(&space, Some(&progress));
        drop(done_tx);
        outcome
    })?;
    let elapsed = started.elapsed();

    let table_path = plan.table_path();
    write_table(&table_path, &outcome.grid, &plan.columns)?;

    info!(
        table = %table_path.display(),
        trials = outcome.trials_run,
        rows = outcome.grid.rows(),
        elapsed_secs = elapsed.as_secs_f64(),
        "sweep finished"
    );
    if !outcome.is_clean() {
        warn!(
            failures = outcome.failures.len(),
            exit_code_total = outcome.exit_code_total,
            "sweep completed with trial failures"
        );
    }

    if let Some(path) = summary_json {
        write_summary(path, &plan, &outcome, elapsed)?;
    }

    if strict && !outcome.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Log a progress line every poll tick until the sweep hangs up.
///
/// The sweep side holds the sender and drops it when the run returns;
/// disconnection wakes the receiver at once rather than after a tick.
fn report_until_done(done: &mpsc::Receiver<()>, progress: &SweepProgress) {
    loop {
        match done.recv_timeout(PROGRESS_POLL) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let total = progress.total();
                if total > 0 {
                    info!(completed = progress.completed(), total, "sweep progress");
                }
            }
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn write_summary(
    path: &Path,
    plan: &SweepPlan,
    outcome: &SweepOutcome,
    elapsed: Duration,
) -> color_eyre::Result<()> {
    let summary = serde_json::json!({
        "script": plan.script,
        "table": plan.table_path(),
        "trials_run": outcome.trials_run,
        "rows": outcome.grid.rows(),
        "columns": plan.columns.labels(),
        "exit_code_total": outcome.exit_code_total,
        "failures": outcome.failures,
        "elapsed_secs": elapsed.as_secs_f64(),
    });
    fs::write(path, serde_json::to_string_pretty(&summary)?)
        .map_err(|e| eyre!("cannot write summary {}: {e}", path.display()))?;
    Ok(())
}

/// `simsweep shape`: read a table back and reshape it against its plan.
pub fn show_shape(plan_path: &Path, table_path: &Path) -> color_eyre::Result<ExitCode> {
    let plan = load_plan(plan_path)?;
    let space = plan.space()?;
    let grid = read_table(table_path, &plan.columns)?;
    let shaped = grid.reshape(&space, plan.runs, plan.row_mode)?;

    println!("Table: {}", table_path.display());
    println!("Rows:  {}   Columns: {}", grid.rows(), grid.columns());
    println!();
    println!("Axes:");
    let mut labels: Vec<String> = space.names().iter().map(ToString::to_string).collect();
    if plan.row_mode == RowMode::PerTrial {
        labels.push("run".to_string());
    }
    labels.push("column".to_string());
    for (label, extent) in labels.iter().zip(shaped.shape()) {
        println!("  {label:<12} {extent}");
    }
    println!();
    println!("Column means:");
    for (label, mean) in plan.columns.labels().iter().zip(column_means(&grid)) {
        println!("  {label:<12} {mean:.6}");
    }
    Ok(ExitCode::SUCCESS)
}

fn column_means(grid: &ResultGrid) -> Vec<f64> {
    let mut sums = vec![0.0; grid.columns()];
    for row in grid.rows_iter() {
        for (sum, value) in sums.iter_mut().zip(row) {
            *sum += value;
        }
    }
    let rows = grid.rows().max(1) as f64;
    sums.iter().map(|sum| sum / rows).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_stops_as_soon_as_the_sweep_hangs_up() {
        let progress = SweepProgress::default();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        drop(done_tx);

        let started = Instant::now();
        report_until_done(&done_rx, &progress);
        assert!(
            started.elapsed() < PROGRESS_POLL,
            "Disconnect must end the reporter without waiting out a poll tick"
        );
    }
}
