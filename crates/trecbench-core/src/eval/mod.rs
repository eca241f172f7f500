//! External evaluation-tool invocation.
//!
//! Metric computation is delegated to a pre-existing binary (`trec_eval` by
//! default) invoked as `<tool> <qrels> <results>`. The tool's stdout is
//! scraped for the three labelled metric lines; everything else about the
//! run is opaque to us. The child is bounded by a hard timeout and killed
//! on expiry so a wedged tool cannot stall the caller indefinitely.

mod parse;

use crate::errors::EvalError;
use crate::model::RunScores;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const STDOUT_CAP: usize = 1 << 20;
const STDERR_CAP: usize = 4096;

/// Handle on the external evaluation tool.
///
/// Program path, extra arguments, working directory and timeout are all
/// injectable, so tests can point this at a scripted stand-in instead of a
/// real `trec_eval` build.
#[derive(Debug, Clone)]
pub struct EvalTool {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl EvalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Extra arguments inserted before the two file paths.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool over one qrels/results pair and extract MAP, P@10 and
    /// P@20 from its output.
    ///
    /// Pure with respect to the two files' contents: no state is kept across
    /// calls and nothing is written, so identical inputs produce identical
    /// outcomes (modulo the tool's own determinism).
    pub fn evaluate(&self, judgements: &Path, results: &Path) -> Result<RunScores, EvalError> {
        readable_file(judgements)?;
        readable_file(results)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(judgements)
            .arg(results)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| EvalError::ToolLaunch {
            program: self.program.clone(),
            source: e,
        })?;

        let status = match wait_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EvalError::Timeout(self.timeout));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EvalError::ToolWait(e));
            }
        };

        if !status.success() {
            let stderr = read_capped(child.stderr.take(), STDERR_CAP);
            return Err(EvalError::ToolExit { status, stderr });
        }

        let stdout = read_capped(child.stdout.take(), STDOUT_CAP);
        parse::scores_from_output(&stdout)
    }

    /// Sentinel-tuple form of [`evaluate`](Self::evaluate): `(map, p10, p20)`
    /// on success, `(None, None, None)` on any failure. The classified cause
    /// is logged but not surfaced, matching the contract submission handling
    /// branches on.
    pub fn scores(
        &self,
        judgements: &Path,
        results: &Path,
    ) -> (Option<f64>, Option<f64>, Option<f64>) {
        match self.evaluate(judgements, results) {
            Ok(s) => (Some(s.map), Some(s.p10), Some(s.p20)),
            Err(err) => {
                tracing::warn!(
                    tool = %self.program.display(),
                    error = %err,
                    "evaluation failed"
                );
                (None, None, None)
            }
        }
    }
}

fn readable_file(path: &Path) -> Result<(), EvalError> {
    let input_err = |source| EvalError::InputFile {
        path: path.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(path).map_err(input_err)?;
    if !meta.is_file() {
        return Err(input_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    std::fs::File::open(path).map_err(input_err)?;
    Ok(())
}

/// Poll-based wait so we can enforce the timeout without extra dependencies.
fn wait_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let start = std::time::Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status)),
            None => {
                if start.elapsed() >= timeout {
                    return Ok(None);
                }
                std::thread::sleep(poll_interval);
            }
        }
    }
}

// Cap reads so a misbehaving tool cannot balloon memory.
fn read_capped<R: Read>(pipe: Option<R>, cap: usize) -> String {
    let mut buf = String::new();
    if let Some(pipe) = pipe {
        let _ = pipe.take(cap as u64).read_to_string(&mut buf);
    }
    buf
}
