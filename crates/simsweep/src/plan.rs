//! On-disk sweep plan: the YAML file handed to `simsweep run`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use simsweep_core::resolver::{BuildDirResolver, BuildProfile, EnvOverlay};
use simsweep_core::{Parameter, ParameterSpace, ResultColumns, RowMode, SweepConfig, SweepError};

/// A complete sweep description in human-readable form.
///
/// Parameter declaration order in the file is axis order: it fixes the
/// `--name=value` argument order and the axis layout of the result table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Script name, resolved against the build directory
    pub script: String,
    /// Root of the external program's build tree
    pub build_dir: PathBuf,
    /// Which build output directory to search and link against
    #[serde(default = "default_profile")]
    pub profile: BuildProfile,
    /// Ordered sweep axes
    pub parameters: Vec<Parameter>,
    /// Repeated trials per grid point
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Declared output columns: a count or a list of names
    pub columns: ResultColumns,
    /// `averaged` (one row per grid point) or `per_trial`
    #[serde(default = "default_row_mode")]
    pub row_mode: RowMode,
    /// Pass the run counter to the program as `--<run_arg>=<run>` when set
    #[serde(default)]
    pub run_arg: Option<String>,
    /// Concurrent process cap; defaults to one per available core
    #[serde(default)]
    pub max_processes: Option<usize>,
    /// Where trials run and the result table lands
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Result file stem; the table is written to `<results_dir>/<output>.csv`
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_profile() -> BuildProfile {
    BuildProfile::Debug
}

fn default_runs() -> usize {
    10
}

fn default_row_mode() -> RowMode {
    RowMode::Averaged
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_output() -> String {
    "sweep".to_string()
}

impl SweepPlan {
    /// Load from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// The plan's parameter space, validated
    pub fn space(&self) -> Result<ParameterSpace, SweepError> {
        ParameterSpace::new(self.parameters.clone())
    }

    /// Engine configuration derived from the plan
    #[must_use]
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            runs: self.runs,
            row_mode: self.row_mode,
            columns: self.columns.clone(),
            max_processes: self.max_processes,
            run_arg: self.run_arg.clone(),
            result_dir: self.results_dir.clone(),
        }
    }

    /// Resolver rooted at the plan's build tree
    #[must_use]
    pub fn resolver(&self) -> BuildDirResolver {
        BuildDirResolver::new(&self.build_dir, self.profile)
    }

    /// Library search path overlay for the plan's build tree
    #[must_use]
    pub fn env(&self) -> EnvOverlay {
        EnvOverlay::library_paths(&self.build_dir, self.profile)
    }

    /// Where the result table is written
    #[must_use]
    pub fn table_path(&self) -> PathBuf {
        self.results_dir.join(format!("{}.csv", self.output))
    }
}
