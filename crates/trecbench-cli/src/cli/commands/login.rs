use super::super::args::LoginArgs;
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::auth;
use trecbench_core::errors::AuthError;

pub async fn run(args: LoginArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;

    let password = helpers::read_password(args.password, false)?;
    match auth::login(&store, &args.username, &password, cfg.session_ttl()) {
        Ok(ctx) => {
            helpers::save_session_token(&cfg, &ctx.token)?;
            eprintln!("logged in as {}", ctx.researcher.username);
            Ok(SUCCESS)
        }
        Err(AuthError::AccountDisabled) => {
            eprintln!("your account is disabled");
            Ok(FAILURE)
        }
        // One message for both, as the login page showed.
        Err(AuthError::UnknownUser | AuthError::BadPassword) => {
            eprintln!("invalid login details supplied");
            Ok(FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
