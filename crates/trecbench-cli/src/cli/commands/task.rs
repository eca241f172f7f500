use super::super::args::{TaskArgs, TaskSub};
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::media::MediaStore;
use trecbench_core::storage::NewTask;

pub async fn run(args: TaskArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;

    match args.cmd {
        TaskSub::Add {
            track,
            title,
            url,
            description,
            year,
            judgements,
        } => {
            let session = match helpers::require_session(&cfg, &store) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{e:#}");
                    return Ok(FAILURE);
                }
            };
            if !session.researcher.is_admin {
                eprintln!("only an administrator can add tasks");
                return Ok(FAILURE);
            }
            if store.track_by_id(track)?.is_none() {
                eprintln!("unknown track {track}");
                return Ok(FAILURE);
            }
            if !judgements.is_file() {
                eprintln!("invalid judgements: file does not exist");
                return Ok(FAILURE);
            }

            let stored = MediaStore::new(&cfg.media_dir).store_judgement(&judgements)?;
            let task = store.create_task(&NewTask {
                track_id: track,
                title,
                task_url: url,
                description,
                year,
                judgement_file: stored,
            })?;
            eprintln!("task added: id={} track={}", task.id, task.track_id);
        }
        TaskSub::List { track } => {
            let tasks = match track {
                Some(track_id) => store.tasks_for_track(track_id)?,
                None => store.list_tasks()?,
            };
            for task in tasks {
                println!(
                    "[{}] track={} {} {}",
                    task.id, task.track_id, task.title, task.year
                );
            }
        }
    }
    Ok(SUCCESS)
}
