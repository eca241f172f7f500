use super::super::args::{OutputFormat, ResultsArgs};
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};

pub async fn run(args: ResultsArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;

    let Some(task) = store.task_by_id(args.task)? else {
        eprintln!("unknown task {}", args.task);
        return Ok(FAILURE);
    };
    let runs = store.runs_for_task(task.id)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
        OutputFormat::Text => {
            println!("results for task [{}] {} {}", task.id, task.title, task.year);
            println!(
                "{:<6} {:<24} {:<10} {:>8} {:>8} {:>8}",
                "run", "name", "type", "map", "P@10", "P@20"
            );
            for run in &runs {
                println!(
                    "{:<6} {:<24} {:<10} {:>8} {:>8} {:>8}",
                    run.id,
                    run.name,
                    run.run_type.to_string(),
                    fmt_score(run.map),
                    fmt_score(run.p10),
                    fmt_score(run.p20),
                );
            }
            tracing::debug!(task = task.id, runs = runs.len(), "results board rendered");
        }
    }
    Ok(SUCCESS)
}

fn fmt_score(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{v:.4}"),
        None => "-".into(),
    }
}
