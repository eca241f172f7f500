use super::super::args::{TrackArgs, TrackSub};
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::storage::NewTrack;

pub async fn run(args: TrackArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;

    match args.cmd {
        TrackSub::Add {
            title,
            url,
            description,
            genre,
        } => {
            let session = match helpers::require_session(&cfg, &store) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{e:#}");
                    return Ok(FAILURE);
                }
            };
            if !session.researcher.is_admin {
                eprintln!("only an administrator can add tracks");
                return Ok(FAILURE);
            }
            if title.trim().is_empty() {
                eprintln!("invalid title: required");
                return Ok(FAILURE);
            }
            let track = store.create_track(&NewTrack {
                title,
                track_url: url,
                description,
                genre,
            })?;
            eprintln!("track added: id={} title={}", track.id, track.title);
        }
        TrackSub::List => {
            for track in store.list_tracks()? {
                println!("[{}] {} ({})", track.id, track.title, track.genre);
                if !track.description.is_empty() {
                    println!("    {}", track.description);
                }
                for task in store.tasks_for_track(track.id)? {
                    println!("    task [{}] {} {}", task.id, task.title, task.year);
                }
            }
        }
    }
    Ok(SUCCESS)
}
