use super::super::args::CommonArgs;
use super::helpers;
use crate::exit_codes::SUCCESS;
use trecbench_core::config::{load_config, write_sample_config};
use trecbench_core::media::MediaStore;

pub async fn run(args: CommonArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        println!("Skipped {} (exists)", args.config.display());
    } else {
        write_sample_config(&args.config)?;
        println!("Wrote {}", args.config.display());
    }

    let cfg = load_config(&args.config)?;
    let _store = helpers::open_store(&cfg)?;
    MediaStore::new(&cfg.media_dir).ensure_layout()?;

    println!("Database ready at {}", cfg.db_path().display());
    println!("Media store ready at {}", cfg.media_dir.display());
    Ok(SUCCESS)
}
