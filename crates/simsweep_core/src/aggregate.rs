//! Out-of-order fan-in of task results into the result grid.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TrialFailure;
use crate::exec::TaskResult;
use crate::grid::ResultGrid;
use crate::space::{ParameterSpace, RowMode};

/// Everything a finished sweep hands back to the caller.
///
/// The sweep itself never aborts on soft failures; the caller inspects the
/// cumulative exit-code total and the per-task detail and decides whether
/// the result is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// Aggregated result table, finalized (averaged rows already divided)
    pub grid: ResultGrid,
    /// Sum of all captured exit codes
    pub exit_code_total: i64,
    /// Per-task detail for every soft failure, in arrival order
    pub failures: Vec<TrialFailure>,
    /// Number of trials that reported back
    pub trials_run: usize,
}

impl SweepOutcome {
    /// True when every trial exited zero and parsed cleanly
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.exit_code_total == 0 && self.failures.is_empty()
    }
}

/// Single consumer folding task results into the grid, keyed by index.
///
/// In per-trial mode every flattened index owns its own row and is written
/// exactly once. In averaged mode the run axis is folded: arriving vectors
/// accumulate into row `index / runs`, and finalization divides each row by
/// the number of its trials whose output parsed. Trials whose output never
/// parsed are excluded from the mean rather than counted as zeros; a row
/// where every trial failed stays zero and shows up in the failure list.
pub struct Aggregator {
    grid: ResultGrid,
    mode: RowMode,
    runs: usize,
    /// Parse-success counts per base row (averaged mode only)
    successes: Vec<usize>,
    failures: Vec<TrialFailure>,
    exit_code_total: i64,
    received: usize,
}

impl Aggregator {
    #[must_use]
    pub fn new(space: &ParameterSpace, runs: usize, columns: usize, mode: RowMode) -> Self {
        let base_rows = space.total_points();
        let (rows, counters) = match mode {
            RowMode::PerTrial => (base_rows * runs, 0),
            RowMode::Averaged => (base_rows, base_rows),
        };
        Self {
            grid: ResultGrid::zeroed(rows, columns),
            mode,
            runs,
            successes: vec![0; counters],
            failures: Vec::new(),
            exit_code_total: 0,
            received: 0,
        }
    }

    /// Fold in one task result. Arrival order is free; placement is keyed
    /// entirely by the result's index. An index outside the grid is logged
    /// and dropped.
    pub fn accept(&mut self, result: TaskResult) {
        self.received += 1;
        self.exit_code_total += i64::from(result.exit_code);

        if let Some(kind) = &result.kind {
            warn!(
                index = result.index,
                run = result.run,
                exit_code = result.exit_code,
                output = ?result.values,
                "trial failed: {kind}"
            );
            self.failures.push(TrialFailure {
                index: result.index,
                run: result.run,
                exit_code: result.exit_code,
                kind: kind.clone(),
            });
        }

        if let Some(vector) = result.vector() {
            match self.mode {
                RowMode::PerTrial => {
                    if !self.grid.set_row(result.index, vector) {
                        warn!(index = result.index, "result index outside the grid, dropping row");
                    }
                }
                RowMode::Averaged => {
                    let base = result.index / self.runs;
                    if self.grid.add_row(base, vector) {
                        self.successes[base] += 1;
                    } else {
                        warn!(
                            index = result.index,
                            base, "result index outside the grid, dropping row"
                        );
                    }
                }
            }
        }
    }

    /// Finalize: divide averaged rows by their success counts.
    #[must_use]
    pub fn finish(mut self) -> SweepOutcome {
        if self.mode == RowMode::Averaged {
            for (base, &count) in self.successes.iter().enumerate() {
                if count > 0 {
                    self.grid.scale_row(base, 1.0 / count as f64);
                } else {
                    warn!(row = base, "no usable trials for row, leaving zeros");
                }
            }
        }
        SweepOutcome {
            grid: self.grid,
            exit_code_total: self.exit_code_total,
            failures: self.failures,
            trials_run: self.received,
        }
    }
}
