use super::super::args::{ProfileArgs, ProfileSub};
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::storage::ProfileUpdate;

pub async fn run(args: ProfileArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;
    let session = match helpers::require_session(&cfg, &store) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e:#}");
            return Ok(FAILURE);
        }
    };

    match args.cmd {
        ProfileSub::Show => {
            let r = &session.researcher;
            println!("username:     {}", r.username);
            println!("display name: {}", r.display_name);
            println!("email:        {}", r.email);
            println!("organisation: {}", r.organisation);
            println!("website:      {}", r.website);
            println!("admin:        {}", r.is_admin);
            println!("registered:   {}", r.created_at.to_rfc3339());
            let runs = store.runs_for_researcher(r.id)?;
            println!("runs:         {}", runs.len());
            for run in runs {
                println!(
                    "  [{}] task={} {} map={}",
                    run.id,
                    run.task_id,
                    run.name,
                    run.map.map_or_else(|| "-".into(), |v| format!("{v:.4}")),
                );
            }
        }
        ProfileSub::Update {
            email,
            display_name,
            organisation,
            website,
        } => {
            store.update_profile(
                session.researcher.id,
                &ProfileUpdate {
                    email,
                    display_name,
                    organisation,
                    website,
                },
            )?;
            eprintln!("profile updated");
        }
    }
    Ok(SUCCESS)
}
