use super::super::args::CommonArgs;
use anyhow::Context;
use trecbench_core::auth::{self, SessionContext};
use trecbench_core::config::{load_config, Config};
use trecbench_core::storage::Store;

pub fn load(common: &CommonArgs) -> anyhow::Result<Config> {
    load_config(&common.config)
        .with_context(|| format!("run `trecbench init` to create {}", common.config.display()))
}

pub fn open_store(cfg: &Config) -> anyhow::Result<Store> {
    std::fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("failed to create {}", cfg.data_dir.display()))?;
    let store = Store::open(&cfg.db_path())?;
    store.init_schema()?;
    Ok(store)
}

/// Resolve the cached login token, failing with a hint when absent.
pub fn require_session(cfg: &Config, store: &Store) -> anyhow::Result<SessionContext> {
    let token_file = cfg.session_file();
    let token = std::fs::read_to_string(&token_file)
        .map(|t| t.trim().to_string())
        .context("not logged in; run `trecbench login`")?;
    auth::resolve(store, &token).context("session expired; run `trecbench login` again")
}

pub fn save_session_token(cfg: &Config, token: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cfg.data_dir)?;
    std::fs::write(cfg.session_file(), token)?;
    Ok(())
}

pub fn clear_session_token(cfg: &Config) {
    let _ = std::fs::remove_file(cfg.session_file());
}

/// Ask for the password unless it was passed as a flag.
pub fn read_password(flag: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(p) = flag {
        return Ok(p);
    }
    let mut prompt = dialoguer::Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub fn print_field_errors(errors: &[trecbench_core::validate::FieldError]) {
    for e in errors {
        eprintln!("invalid {e}");
    }
}
