//! Sweep orchestration: validate, expand, dispatch, aggregate.
//!
//! [`SweepRunner`] is the process-backed entry point; [`sweep_with_runner`]
//! is the engine underneath it, generic over the trial runner so tests and
//! embedders can drive it without spawning processes.
//!
//! Concurrency model: a dedicated rayon pool sized to the configured worker
//! count runs one blocking trial per pool thread, so at most that many
//! external processes exist at once. Workers send results over a channel;
//! the calling thread is the sole consumer and the only mutator of the
//! grid, so nothing needs a lock. Completion order carries no meaning:
//! every result is placed by its stable index.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{Aggregator, SweepOutcome};
use crate::combinations;
use crate::error::SweepError;
use crate::exec::{ProcessRunner, TrialRunner};
use crate::progress::SweepProgress;
use crate::resolver::{EnvOverlay, ExecutableResolver, validate_launch};
use crate::space::{ParameterSpace, ResultColumns, RowMode};

/// Immutable sweep settings, fixed before any task is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Repeated trials per grid point
    pub runs: usize,
    /// Row granularity of the result table
    pub row_mode: RowMode,
    /// Declared output layout, enforced against every trial
    pub columns: ResultColumns,
    /// Concurrent process cap; `None` means one per available core
    #[serde(default)]
    pub max_processes: Option<usize>,
    /// Pass the run counter as `--<run_arg>=<run>` when set
    #[serde(default)]
    pub run_arg: Option<String>,
    /// Working directory for every trial and home of the result table
    #[serde(default = "default_result_dir")]
    pub result_dir: PathBuf,
}

fn default_result_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            runs: 1,
            row_mode: RowMode::Averaged,
            columns: ResultColumns::Count(1),
            max_processes: None,
            run_arg: None,
            result_dir: default_result_dir(),
        }
    }
}

impl SweepConfig {
    /// Effective worker count
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.max_processes
            .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    fn validate(&self) -> Result<(), SweepError> {
        if self.runs == 0 {
            return Err(SweepError::Config("runs must be at least 1".to_string()));
        }
        if self.columns.is_empty() {
            return Err(SweepError::Config(
                "at least one result column required".to_string(),
            ));
        }
        if self.max_processes == Some(0) {
            return Err(SweepError::Config(
                "max_processes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process-backed sweep engine bound to one resolved executable.
pub struct SweepRunner {
    config: SweepConfig,
    executable: PathBuf,
    env: EnvOverlay,
}

impl SweepRunner {
    /// Bind a validated config to an already-resolved executable.
    ///
    /// The launch pre-flight runs here, so a missing or non-executable
    /// program fails the sweep before a single task is dispatched instead
    /// of as a pile of identical per-task failures.
    pub fn new(
        config: SweepConfig,
        executable: PathBuf,
        env: EnvOverlay,
    ) -> Result<Self, SweepError> {
        config.validate()?;
        validate_launch(&executable)?;
        Ok(Self {
            config,
            executable,
            env,
        })
    }

    /// Resolve `script` through the given resolver, then bind to it.
    pub fn resolve(
        config: SweepConfig,
        script: &str,
        resolver: &dyn ExecutableResolver,
        env: EnvOverlay,
    ) -> Result<Self, SweepError> {
        let executable = resolver.resolve(script)?;
        Self::new(config, executable, env)
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run the full sweep over `space`.
    pub fn run(
        &self,
        space: &ParameterSpace,
        progress: Option<&SweepProgress>,
    ) -> Result<SweepOutcome, SweepError> {
        std::fs::create_dir_all(&self.config.result_dir).map_err(|e| {
            SweepError::Config(format!(
                "cannot create result dir {}: {e}",
                self.config.result_dir.display()
            ))
        })?;
        let runner = ProcessRunner::new(
            self.executable.clone(),
            self.env.clone(),
            self.config.result_dir.clone(),
            space,
            self.config.run_arg.clone(),
            self.config.columns.len(),
        );
        sweep_with_runner(&runner, space, &self.config, progress)
    }
}

/// Run a sweep over `space` with any trial runner.
///
/// Expands the combinations, shuffles the dispatch order, fans tasks out
/// over a bounded pool and folds the results back in as they complete.
pub fn sweep_with_runner<R: TrialRunner + Sync>(
    runner: &R,
    space: &ParameterSpace,
    config: &SweepConfig,
    progress: Option<&SweepProgress>,
) -> Result<SweepOutcome, SweepError> {
    config.validate()?;
    if space.is_empty() {
        return Err(SweepError::Config(
            "at least one sweep parameter required".to_string(),
        ));
    }

    let combinations = combinations::generate(space, config.runs);
    let total = combinations.len();
    if let Some(p) = progress {
        p.reset(total);
    }
    let order = combinations::shuffled(combinations);

    let workers = config.worker_count();
    info!(trials = total, workers, runs = config.runs, "starting sweep");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| SweepError::Config(format!("cannot build worker pool: {e}")))?;

    let mut aggregator = Aggregator::new(space, config.runs, config.columns.len(), config.row_mode);
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        s.spawn(move || {
            pool.install(|| {
                order.into_par_iter().for_each_with(tx, |tx, combination| {
                    let result = runner.run(&combination);
                    if let Some(p) = progress {
                        p.increment();
                    }
                    let _ = tx.send(result);
                });
            });
        });

        // Sole consumer, sole mutator of the grid. The loop ends when the
        // last worker drops its channel handle.
        for result in rx {
            aggregator.accept(result);
        }
    });

    let outcome = aggregator.finish();
    info!(
        trials = outcome.trials_run,
        failures = outcome.failures.len(),
        exit_code_total = outcome.exit_code_total,
        "sweep complete"
    );
    Ok(outcome)
}
