//! Parameter space and result layout types for sweep definitions.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// One admissible value for a swept parameter.
///
/// `Display` renders the exact token passed to the external program in its
/// `--name=value` argument, so an `Int` never grows a trailing `.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value, if it has one
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// One sweep axis: a parameter name and its ordered admissible values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of admissible values (this axis's cardinality)
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }
}

/// Ordered collection of sweep axes.
///
/// Declaration order is axis order: it fixes both the `--name=value` argument
/// order handed to the external program and the axis order used when
/// reshaping flat results back into an N-dimensional grid. The same space
/// (names, order, cardinalities) must therefore be supplied when a persisted
/// table is reshaped later; a different space misaligns the data.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
}

impl ParameterSpace {
    /// Create a space from axes in declaration order.
    ///
    /// Fails if a name repeats or any axis has no values.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, SweepError> {
        let mut seen = FxHashSet::default();
        for param in &parameters {
            if param.name.is_empty() {
                return Err(SweepError::Config("parameter name is empty".to_string()));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(SweepError::Config(format!(
                    "duplicate parameter name {:?}",
                    param.name
                )));
            }
            if param.values.is_empty() {
                return Err(SweepError::Config(format!(
                    "parameter {:?} has no values",
                    param.name
                )));
            }
        }
        Ok(Self { parameters })
    }

    /// Axes in declaration order
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of axes
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter names in axis order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Per-axis cardinalities in axis order
    #[must_use]
    pub fn cardinalities(&self) -> Vec<usize> {
        self.parameters.iter().map(Parameter::cardinality).collect()
    }

    /// Size of the Cartesian product over all axes (run axis excluded)
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.parameters.iter().map(Parameter::cardinality).product()
    }
}

/// Declared layout of the external program's output vector.
///
/// The column count is fixed for the whole sweep and enforced against every
/// task's output, never inferred per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultColumns {
    /// Just a width; columns are labeled positionally `0..N-1`
    Count(usize),
    /// Explicit column names; the width is the list's length
    Names(Vec<String>),
}

impl ResultColumns {
    /// Declared column count
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ResultColumns::Count(n) => *n,
            ResultColumns::Names(names) => names.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header labels: the declared names, or positional indices
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        match self {
            ResultColumns::Count(n) => (0..*n).map(|i| i.to_string()).collect(),
            ResultColumns::Names(names) => names.clone(),
        }
    }
}

/// Row granularity of the result table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    /// One row per (combination, run) pair
    PerTrial,
    /// One row per combination, the elementwise mean of its runs
    Averaged,
}
