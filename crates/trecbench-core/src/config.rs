use crate::errors::ConfigError;
use crate::eval::EvalTool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Overrides the configured tool program; used by tests and deployments
/// that install trec_eval outside PATH.
pub const EVAL_BIN_ENV: &str = "TRECBENCH_EVAL_BIN";

const SAMPLE: &str = "\
version: 1
data_dir: .trecbench
media_dir: .trecbench/media
session_ttl_days: 14
eval_tool:
  program: trec_eval
  args: []
  timeout_secs: 30
";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    pub data_dir: PathBuf,
    pub media_dir: PathBuf,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    pub eval_tool: EvalToolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalToolConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_session_ttl_days() -> i64 {
    14
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("trecbench.db")
    }

    /// Where the CLI caches the current login token.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("session")
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    /// Build the evaluation-tool handle, honouring the env override.
    pub fn tool(&self) -> EvalTool {
        let program = match std::env::var_os(EVAL_BIN_ENV) {
            Some(p) => PathBuf::from(p),
            None => self.eval_tool.program.clone(),
        };
        EvalTool::new(program)
            .with_args(self.eval_tool.args.iter().cloned())
            .with_timeout(Duration::from_secs(self.eval_tool.timeout_secs))
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let cfg: Config = serde_yaml::from_str(&raw)?;
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError::Version {
            found: cfg.version,
            supported: SUPPORTED_CONFIG_VERSION,
        });
    }
    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trecbench.yaml");
        write_sample_config(&path).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.version, SUPPORTED_CONFIG_VERSION);
        assert_eq!(cfg.eval_tool.program, PathBuf::from("trec_eval"));
        assert_eq!(cfg.eval_tool.timeout_secs, 30);
        assert_eq!(cfg.session_ttl_days, 14);
        assert_eq!(cfg.db_path(), PathBuf::from(".trecbench/trecbench.db"));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trecbench.yaml");
        std::fs::write(
            &path,
            "version: 99\ndata_dir: d\nmedia_dir: m\neval_tool:\n  program: trec_eval\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn defaults_fill_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trecbench.yaml");
        std::fs::write(
            &path,
            "version: 1\ndata_dir: d\nmedia_dir: m\neval_tool:\n  program: /opt/trec_eval\n",
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(cfg.eval_tool.args.is_empty());
        assert_eq!(cfg.eval_tool.timeout_secs, 30);
    }
}
