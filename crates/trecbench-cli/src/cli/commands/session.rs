use super::super::args::CommonArgs;
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::auth;

pub async fn logout(args: CommonArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args)?;
    let store = helpers::open_store(&cfg)?;

    if let Ok(token) = std::fs::read_to_string(cfg.session_file()) {
        auth::logout(&store, token.trim())?;
    }
    helpers::clear_session_token(&cfg);
    eprintln!("logged out");
    Ok(SUCCESS)
}

pub async fn whoami(args: CommonArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args)?;
    let store = helpers::open_store(&cfg)?;

    match helpers::require_session(&cfg, &store) {
        Ok(session) => {
            let r = &session.researcher;
            println!(
                "{} ({}){}",
                r.username,
                if r.display_name.is_empty() {
                    "no display name"
                } else {
                    &r.display_name
                },
                if r.is_admin { " [admin]" } else { "" }
            );
            Ok(SUCCESS)
        }
        Err(e) => {
            eprintln!("{e:#}");
            Ok(FAILURE)
        }
    }
}
