use super::super::args::SubmitArgs;
use super::helpers;
use crate::exit_codes::{FAILURE, SUCCESS};
use trecbench_core::errors::SubmitError;
use trecbench_core::media::MediaStore;
use trecbench_core::submit::SubmissionService;
use trecbench_core::validate::{validate_run, RunForm};

pub async fn run(args: SubmitArgs) -> anyhow::Result<i32> {
    let cfg = helpers::load(&args.common)?;
    let store = helpers::open_store(&cfg)?;
    let session = match helpers::require_session(&cfg, &store) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e:#}");
            return Ok(FAILURE);
        }
    };

    let form = RunForm {
        name: args.name,
        description: args.description,
        run_type: args.run_type.into(),
        query_type: args.query_type.into(),
        feedback_type: args.feedback_type.into(),
        results_file: args.results_file,
    };
    let valid = match validate_run(&form) {
        Ok(v) => v,
        Err(errors) => {
            helpers::print_field_errors(&errors);
            return Ok(FAILURE);
        }
    };

    let service = SubmissionService::new(
        store,
        MediaStore::new(&cfg.media_dir),
        cfg.tool(),
    );
    match service.submit(&session, args.task, &valid) {
        Ok(run) => {
            println!("run {} ({}) evaluated:", run.id, run.name);
            println!("  map  {:.4}", run.map.unwrap_or_default());
            println!("  P@10 {:.4}", run.p10.unwrap_or_default());
            println!("  P@20 {:.4}", run.p20.unwrap_or_default());
            Ok(SUCCESS)
        }
        Err(err @ (SubmitError::Evaluation(_) | SubmitError::UnknownTask(_))) => {
            eprintln!("{err}");
            Ok(FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
