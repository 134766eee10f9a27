//! Parameter sweep execution engine for external stochastic executables
//!
//! This crate coordinates sweeps of an external program across the Cartesian
//! product of named parameter values. It supports:
//! - Repeated trials per grid point with a synthetic run axis
//! - Bounded process-level parallelism with out-of-order result fan-in
//! - Per-trial averaging or one-row-per-trial result tables
//! - Soft per-task failure accounting (nonzero exit, unparseable output)
//! - Reshaping flat result tables back into one axis per swept parameter
//!
//! # Running a sweep
//!
//! ```ignore
//! use simsweep_core::{Parameter, ParameterSpace, ResultColumns, RowMode};
//! use simsweep_core::runner::{SweepConfig, SweepRunner};
//! use simsweep_core::resolver::EnvOverlay;
//!
//! let space = ParameterSpace::new(vec![
//!     Parameter::new("nodes", vec![10.into(), 20.into()]),
//!     Parameter::new("rate", vec![0.5.into(), 1.0.into()]),
//! ])?;
//!
//! let config = SweepConfig {
//!     runs: 50,
//!     row_mode: RowMode::Averaged,
//!     columns: ResultColumns::Names(vec!["throughput".into(), "loss".into()]),
//!     result_dir: "results".into(),
//!     ..SweepConfig::default()
//! };
//!
//! let runner = SweepRunner::new(config, "build/optimized/my-sim".into(), EnvOverlay::default())?;
//! let outcome = runner.run(&space, None)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod aggregate;
pub mod combinations;
pub mod error;
pub mod exec;
pub mod grid;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod table;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod space;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use aggregate::SweepOutcome;
pub use combinations::Combination;
pub use error::SweepError;
pub use grid::{ResultGrid, ShapedGrid};
pub use progress::SweepProgress;
pub use runner::{SweepConfig, SweepRunner};
pub use space::{ParamValue, Parameter, ParameterSpace, ResultColumns, RowMode};
