use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors locating the external executable
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No candidate under the search root matched the script name
    NotFound { script: String },
    /// Several candidates matched with no exact-name winner
    Ambiguous {
        script: String,
        candidates: Vec<PathBuf>,
    },
    /// Filesystem error while scanning for candidates
    Io(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { script } => {
                write!(f, "no executable matching {script:?} found")
            }
            ResolveError::Ambiguous { script, candidates } => {
                write!(
                    f,
                    "ambiguous executable {script:?}: {} candidates match ({})",
                    candidates.len(),
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            ResolveError::Io(msg) => write!(f, "executable search failed: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Errors spawning the resolved executable, detected before any task is dispatched
#[derive(Debug, Clone)]
pub enum LaunchError {
    /// The resolved path does not exist
    Missing(PathBuf),
    /// The resolved path is not a regular file with execute permission
    NotExecutable(PathBuf),
    /// Filesystem error while inspecting the resolved path
    Io { path: PathBuf, detail: String },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::Missing(path) => {
                write!(f, "executable {} does not exist", path.display())
            }
            LaunchError::NotExecutable(path) => {
                write!(f, "{} is not executable", path.display())
            }
            LaunchError::Io { path, detail } => {
                write!(f, "cannot inspect {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for LaunchError {}

/// Why a single trial's result is unusable (or suspect)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrialFailureKind {
    /// Process exited nonzero; its output still parsed and is kept
    NonZeroExit,
    /// A stdout token did not parse as a float
    BadToken { token: String },
    /// Stdout held the wrong number of float tokens
    WrongArity { expected: usize, found: usize },
    /// The process could not be spawned at all
    SpawnFailed { detail: String },
}

impl fmt::Display for TrialFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialFailureKind::NonZeroExit => write!(f, "nonzero exit code"),
            TrialFailureKind::BadToken { token } => {
                write!(f, "output token {token:?} is not a number")
            }
            TrialFailureKind::WrongArity { expected, found } => {
                write!(f, "expected {expected} output values, got {found}")
            }
            TrialFailureKind::SpawnFailed { detail } => write!(f, "spawn failed: {detail}"),
        }
    }
}

/// One recorded soft failure: the trial it came from plus its cause.
///
/// Soft failures never abort the sweep; they are collected and surfaced
/// together with the cumulative exit-code total once all tasks finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialFailure {
    /// Flattened combination index (run axis included)
    pub index: usize,
    /// Run counter within the combination's base grid point
    pub run: usize,
    /// Exit code as captured, synthetic 127 when the spawn itself failed
    pub exit_code: i32,
    pub kind: TrialFailureKind,
}

impl fmt::Display for TrialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trial {} (run {}, exit {}): {}",
            self.index, self.run, self.exit_code, self.kind
        )
    }
}

impl std::error::Error for TrialFailure {}

/// Row count does not match the parameter grid during reshape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub expected_rows: usize,
    pub found_rows: usize,
    /// Target shape, result-column axis included
    pub shape: Vec<usize>,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot reshape {} rows into grid {:?} (expected {} rows)",
            self.found_rows, self.shape, self.expected_rows
        )
    }
}

impl std::error::Error for ShapeError {}

/// Errors reading or writing the tabular result artifact
#[derive(Debug, Clone)]
pub enum TableError {
    Io(String),
    Csv(String),
    /// Header width differs from the declared result-column count
    HeaderMismatch { expected: usize, found: usize },
    /// A field failed to parse as a float
    BadNumber {
        row: usize,
        column: usize,
        token: String,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(msg) => write!(f, "table I/O failed: {msg}"),
            TableError::Csv(msg) => write!(f, "malformed table: {msg}"),
            TableError::HeaderMismatch { expected, found } => {
                write!(f, "table has {found} columns, expected {expected}")
            }
            TableError::BadNumber { row, column, token } => {
                write!(f, "row {row}, column {column}: {token:?} is not a number")
            }
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Io(err.to_string())
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::Csv(err.to_string())
    }
}

/// Top-level error for the engine entry points
#[derive(Debug, Clone)]
pub enum SweepError {
    /// Invalid sweep configuration or parameter space
    Config(String),
    Resolve(ResolveError),
    Launch(LaunchError),
    Shape(ShapeError),
    Table(TableError),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "configuration error: {msg}"),
            SweepError::Resolve(e) => write!(f, "{e}"),
            SweepError::Launch(e) => write!(f, "{e}"),
            SweepError::Shape(e) => write!(f, "{e}"),
            SweepError::Table(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Resolve(e) => Some(e),
            SweepError::Launch(e) => Some(e),
            SweepError::Shape(e) => Some(e),
            SweepError::Table(e) => Some(e),
            SweepError::Config(_) => None,
        }
    }
}

impl From<ResolveError> for SweepError {
    fn from(err: ResolveError) -> Self {
        SweepError::Resolve(err)
    }
}

impl From<LaunchError> for SweepError {
    fn from(err: LaunchError) -> Self {
        SweepError::Launch(err)
    }
}

impl From<ShapeError> for SweepError {
    fn from(err: ShapeError) -> Self {
        SweepError::Shape(err)
    }
}

impl From<TableError> for SweepError {
    fn from(err: TableError) -> Self {
        SweepError::Table(err)
    }
}
