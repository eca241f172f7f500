use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failure classification for one evaluation-tool invocation.
///
/// Callers that only care about the accepted/rejected split use
/// [`crate::eval::EvalTool::scores`], which collapses every variant to the
/// absent-scores sentinel after logging the cause.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("input file {path} is not readable: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch evaluation tool {program}: {source}")]
    ToolLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for evaluation tool: {0}")]
    ToolWait(#[source] std::io::Error),

    #[error("evaluation tool exited with {status}: {stderr}")]
    ToolExit { status: ExitStatus, stderr: String },

    #[error("evaluation tool timed out after {0:?}")]
    Timeout(Duration),

    #[error("metric '{0}' missing from tool output")]
    MissingMetric(&'static str),

    #[error("metric '{label}' is not a finite number: {value}")]
    BadNumber { label: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown user")]
    UnknownUser,

    #[error("invalid password")]
    BadPassword,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("session is expired or unknown")]
    InvalidSession,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("unknown task {0}")]
    UnknownTask(i64),

    #[error("there was a problem evaluating your results file")]
    Evaluation(#[source] EvalError),

    #[error("failed to store results file: {0}")]
    Media(#[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported config version {found} (supported: {supported})")]
    Version { found: u32, supported: u32 },
}
