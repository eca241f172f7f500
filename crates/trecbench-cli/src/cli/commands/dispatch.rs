use super::super::args::{Cli, Command};
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => super::init::run(args).await,
        Command::Register(args) => super::register::run(args).await,
        Command::Login(args) => super::login::run(args).await,
        Command::Logout(args) => super::session::logout(args).await,
        Command::Whoami(args) => super::session::whoami(args).await,
        Command::Profile(args) => super::profile::run(args).await,
        Command::Track(args) => super::track::run(args).await,
        Command::Task(args) => super::task::run(args).await,
        Command::Submit(args) => super::submit::run(args).await,
        Command::Results(args) => super::results::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
