use super::super::args::RegisterArgs;
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::auth;
use trecbench_core::errors::AuthError;
use trecbench_core::validate::{validate_registration, RegistrationForm};

pub async fn run(args: RegisterArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;

    // The first account may bootstrap itself as admin; afterwards admin
    // creation needs an admin session.
    let is_admin = if args.admin {
        if store.researcher_count()? == 0 {
            true
        } else {
            let session = match helpers::require_session(&cfg, &store) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{e:#}");
                    return Ok(FAILURE);
                }
            };
            if !session.researcher.is_admin {
                eprintln!("only an administrator can create administrator accounts");
                return Ok(FAILURE);
            }
            true
        }
    } else {
        false
    };

    let password = helpers::read_password(args.password, true)?;
    let form = RegistrationForm {
        username: args.username,
        password,
        email: args.email,
        display_name: args.display_name,
        organisation: args.organisation,
        website: args.website,
    };
    let registration = match validate_registration(&form) {
        Ok(v) => v,
        Err(errors) => {
            helpers::print_field_errors(&errors);
            return Ok(FAILURE);
        }
    };

    match auth::register(&store, &registration, is_admin) {
        Ok(researcher) => {
            // Mirror the web flow: a fresh registration is logged in.
            let ctx = auth::login(
                &store,
                &researcher.username,
                &registration.password,
                cfg.session_ttl(),
            )?;
            helpers::save_session_token(&cfg, &ctx.token)?;
            eprintln!(
                "registered and logged in as {}{}",
                researcher.username,
                if researcher.is_admin { " (admin)" } else { "" }
            );
            Ok(SUCCESS)
        }
        Err(AuthError::UsernameTaken) => {
            eprintln!("username is already taken");
            Ok(FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
