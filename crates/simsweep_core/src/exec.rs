//! Trial execution: one external-process invocation per combination.
//!
//! Parameter values are serialized as `--name=value` tokens in axis order
//! and passed as separate argv entries, never concatenated into a shell
//! string. Stdout is drained fully and tokenized on whitespace into floats;
//! the token count must equal the declared result-column count. The exit
//! code is captured verbatim.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::combinations::Combination;
use crate::error::TrialFailureKind;
use crate::resolver::EnvOverlay;
use crate::space::ParameterSpace;

/// Captured outcome of one trial, keyed by the combination's stable index.
///
/// Produced by exactly one worker and consumed exactly once by the
/// aggregator, in whatever order trials happen to finish.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub index: usize,
    pub run: usize,
    /// Parsed output vector; empty when the output failed to parse
    pub values: Vec<f64>,
    /// Exit code as captured (negated signal number on Unix kills)
    pub exit_code: i32,
    /// Set when something about the trial went wrong
    pub kind: Option<TrialFailureKind>,
}

impl TaskResult {
    /// The usable result vector, if the output parsed.
    ///
    /// A nonzero exit with well-formed output still yields its vector, the
    /// way a stochastic program can both report results and complain.
    #[must_use]
    pub fn vector(&self) -> Option<&[f64]> {
        match &self.kind {
            None | Some(TrialFailureKind::NonZeroExit) => Some(&self.values),
            Some(_) => None,
        }
    }
}

/// Executes one trial for a combination.
///
/// The process-backed implementation is [`ProcessRunner`]; tests substitute
/// fakes that compute the vector in-process.
pub trait TrialRunner {
    fn run(&self, combination: &Combination) -> TaskResult;
}

/// Runs trials by spawning the external executable, one process per trial.
///
/// Every spawn gets the same environment overlay and working directory; the
/// only thing that varies between trials is the argument list.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: PathBuf,
    env: EnvOverlay,
    working_dir: PathBuf,
    /// Parameter names in axis order, aligned with combination values
    names: Vec<String>,
    /// When set, the run counter is passed as `--<run_arg>=<run>`
    run_arg: Option<String>,
    columns: usize,
}

impl ProcessRunner {
    pub fn new(
        executable: PathBuf,
        env: EnvOverlay,
        working_dir: PathBuf,
        space: &ParameterSpace,
        run_arg: Option<String>,
        columns: usize,
    ) -> Self {
        Self {
            executable,
            env,
            working_dir,
            names: space.names().iter().map(ToString::to_string).collect(),
            run_arg,
            columns,
        }
    }

    /// Argument tokens for one combination, in axis order
    fn arg_tokens(&self, combination: &Combination) -> Vec<String> {
        let mut args: Vec<String> = self
            .names
            .iter()
            .zip(&combination.values)
            .map(|(name, value)| format!("--{name}={value}"))
            .collect();
        if let Some(run_arg) = &self.run_arg {
            args.push(format!("--{run_arg}={}", combination.run));
        }
        args
    }
}

impl TrialRunner for ProcessRunner {
    fn run(&self, combination: &Combination) -> TaskResult {
        let mut cmd = Command::new(&self.executable);
        cmd.args(self.arg_tokens(combination))
            .current_dir(&self.working_dir);
        for (name, value) in self.env.entries() {
            cmd.env(name, value);
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                // The launch pre-flight catches the common causes up front;
                // anything that slips through fails this trial alone.
                return TaskResult {
                    index: combination.index,
                    run: combination.run,
                    values: Vec::new(),
                    exit_code: 127,
                    kind: Some(TrialFailureKind::SpawnFailed {
                        detail: e.to_string(),
                    }),
                };
            }
        };

        let exit_code = exit_code_of(&output.status);
        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_stdout(&stdout, self.columns) {
            Ok(values) => TaskResult {
                index: combination.index,
                run: combination.run,
                values,
                exit_code,
                kind: (exit_code != 0).then_some(TrialFailureKind::NonZeroExit),
            },
            Err(kind) => TaskResult {
                index: combination.index,
                run: combination.run,
                values: Vec::new(),
                exit_code,
                kind: Some(kind),
            },
        }
    }
}

/// Tokenize stdout on whitespace into exactly `columns` floats
fn parse_stdout(stdout: &str, columns: usize) -> Result<Vec<f64>, TrialFailureKind> {
    let mut values = Vec::with_capacity(columns);
    for token in stdout.split_whitespace() {
        match token.parse::<f64>() {
            Ok(value) => values.push(value),
            Err(_) => {
                return Err(TrialFailureKind::BadToken {
                    token: token.to_string(),
                });
            }
        }
    }
    if values.len() != columns {
        return Err(TrialFailureKind::WrongArity {
            expected: columns,
            found: values.len(),
        });
    }
    Ok(values)
}

#[cfg(unix)]
fn exit_code_of(status: &ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|s| -s))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code_of(status: &ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
