//! Tests for full sweeps driven through the engine with fake trial runners
//!
//! These tests verify that:
//! - Trial and row counts follow the axis cardinalities and run count
//! - Results land by stable index regardless of dispatch order
//! - Averaged rows equal the elementwise mean of their runs
//! - Soft failures stay isolated and the exit-code total is their sum
//! - The worked two-axis scenario comes out exactly

use crate::combinations::{self, Combination};
use crate::error::{SweepError, TrialFailureKind};
use crate::exec::{TaskResult, TrialRunner};
use crate::progress::SweepProgress;
use crate::runner::{SweepConfig, sweep_with_runner};
use crate::space::{ParamValue, Parameter, ParameterSpace, ResultColumns, RowMode};

/// Deterministic stand-in for the external program: column `j` of the
/// output is the sum of the numeric parameter values plus `j`.
struct SumRunner {
    columns: usize,
}

impl TrialRunner for SumRunner {
    fn run(&self, combination: &Combination) -> TaskResult {
        let sum: f64 = combination
            .values
            .iter()
            .filter_map(ParamValue::as_f64)
            .sum();
        TaskResult {
            index: combination.index,
            run: combination.run,
            values: (0..self.columns).map(|j| sum + j as f64).collect(),
            exit_code: 0,
            kind: None,
        }
    }
}

/// Sum runner with faults injected at chosen trial indices
struct FaultInjectingRunner {
    inner: SumRunner,
    garbage_at: Vec<usize>,
    exit_three_at: Vec<usize>,
}

impl TrialRunner for FaultInjectingRunner {
    fn run(&self, combination: &Combination) -> TaskResult {
        let mut result = self.inner.run(combination);
        if self.garbage_at.contains(&combination.index) {
            result.values = Vec::new();
            result.exit_code = 1;
            result.kind = Some(TrialFailureKind::BadToken {
                token: "Segmentation".into(),
            });
        } else if self.exit_three_at.contains(&combination.index) {
            result.exit_code = 3;
            result.kind = Some(TrialFailureKind::NonZeroExit);
        }
        result
    }
}

fn two_by_two() -> ParameterSpace {
    ParameterSpace::new(vec![
        Parameter::new("a", vec![ParamValue::Int(1), ParamValue::Int(2)]),
        Parameter::new("b", vec![ParamValue::Int(10), ParamValue::Int(20)]),
    ])
    .unwrap()
}

fn config(runs: usize, row_mode: RowMode, columns: usize) -> SweepConfig {
    SweepConfig {
        runs,
        row_mode,
        columns: ResultColumns::Count(columns),
        max_processes: Some(4),
        ..SweepConfig::default()
    }
}

/// The worked scenario: `{a: [1,2], b: [10,20]}`, two runs each, averaged,
/// program reporting a+b. Expected rows in index order: 11, 21, 12, 22.
#[test]
fn test_two_axis_averaged_scenario() {
    let outcome = sweep_with_runner(
        &SumRunner { columns: 1 },
        &two_by_two(),
        &config(2, RowMode::Averaged, 1),
        None,
    )
    .unwrap();

    assert_eq!(outcome.grid.rows(), 4);
    assert_eq!(outcome.grid.columns(), 1);
    assert_eq!(
        outcome.grid.data(),
        &[11.0, 21.0, 12.0, 22.0],
        "Averaging identical trials must reproduce a+b exactly per grid point"
    );
    assert_eq!(outcome.trials_run, 8);
    assert!(outcome.is_clean());
}

/// Per-trial mode keeps one row per (combination, run) pair, each row
/// correct for its own index even though dispatch order is shuffled
#[test]
fn test_per_trial_rows_keyed_by_index() {
    let space = two_by_two();
    let runs = 3;
    let outcome = sweep_with_runner(
        &SumRunner { columns: 2 },
        &space,
        &config(runs, RowMode::PerTrial, 2),
        None,
    )
    .unwrap();

    assert_eq!(outcome.grid.rows(), space.total_points() * runs);
    // Regenerate the grid-order combinations and check every row landed
    // where its index says, independent of completion order.
    for combination in combinations::generate(&space, runs) {
        let sum: f64 = combination
            .values
            .iter()
            .filter_map(ParamValue::as_f64)
            .sum();
        assert_eq!(
            outcome.grid.row(combination.index),
            Some(&[sum, sum + 1.0][..]),
            "Row {} must hold the vector for its own combination",
            combination.index
        );
    }
}

/// One garbled trial neither blocks other tasks nor poisons its row's mean
#[test]
fn test_failure_isolation_and_error_total() {
    let space = two_by_two();
    let runs = 3;
    // Grid point 0 (indices 0..3) loses one trial to garbage output;
    // index 5 (grid point 1) exits 3 but still reports a vector.
    let runner = FaultInjectingRunner {
        inner: SumRunner { columns: 1 },
        garbage_at: vec![1],
        exit_three_at: vec![5],
    };
    let outcome = sweep_with_runner(&runner, &space, &config(runs, RowMode::Averaged, 1), None)
        .unwrap();

    assert_eq!(
        outcome.grid.data(),
        &[11.0, 21.0, 12.0, 22.0],
        "Remaining trials of each point still average to a+b"
    );
    assert_eq!(
        outcome.exit_code_total, 4,
        "Exit-code total must be the sum (1 + 3), not the count"
    );
    assert_eq!(outcome.failures.len(), 2);
    let garbled = outcome.failures.iter().find(|f| f.index == 1).unwrap();
    assert_eq!(garbled.exit_code, 1);
    assert!(matches!(garbled.kind, TrialFailureKind::BadToken { .. }));
}

/// Progress counters end at the full trial count
#[test]
fn test_progress_reaches_total() {
    let progress = SweepProgress::default();
    let outcome = sweep_with_runner(
        &SumRunner { columns: 1 },
        &two_by_two(),
        &config(5, RowMode::PerTrial, 1),
        Some(&progress),
    )
    .unwrap();

    assert_eq!(progress.total(), 20);
    assert_eq!(progress.completed(), 20);
    assert!(progress.is_done());
    assert_eq!(outcome.trials_run, 20);
}

/// A single-worker pool still completes every trial
#[test]
fn test_single_worker_pool() {
    let outcome = sweep_with_runner(
        &SumRunner { columns: 1 },
        &two_by_two(),
        &SweepConfig {
            max_processes: Some(1),
            runs: 2,
            row_mode: RowMode::Averaged,
            columns: ResultColumns::Count(1),
            ..SweepConfig::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(outcome.grid.data(), &[11.0, 21.0, 12.0, 22.0]);
}

/// An empty parameter space is a configuration error, not a silent no-op
#[test]
fn test_empty_space_is_rejected() {
    let space = ParameterSpace::new(vec![]).unwrap();
    let result = sweep_with_runner(
        &SumRunner { columns: 1 },
        &space,
        &config(1, RowMode::Averaged, 1),
        None,
    );
    assert!(matches!(result, Err(SweepError::Config(_))));
}
