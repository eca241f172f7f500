use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trecbench_core::model::{FeedbackType, QueryType, RunType};

#[derive(Parser)]
#[command(
    name = "trecbench",
    version,
    about = "Manage TREC-style evaluation submissions and score them with an external trec_eval binary"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample config and initialise the database and media layout
    Init(CommonArgs),
    /// Create a researcher account (and log in)
    Register(RegisterArgs),
    Login(LoginArgs),
    Logout(CommonArgs),
    /// Show the currently logged-in researcher
    Whoami(CommonArgs),
    /// Show or update the researcher profile
    Profile(ProfileArgs),
    /// Administer tracks
    Track(TrackArgs),
    /// Administer tasks
    Task(TaskArgs),
    /// Submit a results file for evaluation
    Submit(SubmitArgs),
    /// Show the results board for a task
    Results(ResultsArgs),
    Version,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    /// Path to the trecbench config file
    #[arg(long, env = "TRECBENCH_CONFIG", default_value = "trecbench.yaml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long)]
    pub username: String,

    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub display_name: String,

    #[arg(long, default_value = "")]
    pub organisation: String,

    #[arg(long, default_value = "")]
    pub website: String,

    /// Create an administrator. Unrestricted only while no accounts exist;
    /// afterwards requires an admin session.
    #[arg(long)]
    pub admin: bool,
}

#[derive(Args)]
pub struct LoginArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long)]
    pub username: String,

    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub cmd: ProfileSub,
}

#[derive(Subcommand)]
pub enum ProfileSub {
    Show,
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        organisation: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
}

#[derive(Args)]
pub struct TrackArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub cmd: TrackSub,
}

#[derive(Subcommand)]
pub enum TrackSub {
    /// Add a track (admin only)
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        genre: String,
    },
    /// List tracks with their tasks
    List,
}

#[derive(Args)]
pub struct TaskArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub cmd: TaskSub,
}

#[derive(Subcommand)]
pub enum TaskSub {
    /// Add a task with its qrels file (admin only)
    Add {
        #[arg(long)]
        track: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        year: String,
        /// Ground-truth judgement (qrels) file, copied into the media store
        judgements: PathBuf,
    },
    /// List tasks, optionally for one track
    List {
        #[arg(long)]
        track: Option<i64>,
    },
}

#[derive(Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long)]
    pub task: i64,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, value_enum, default_value_t = RunTypeArg::Automatic)]
    pub run_type: RunTypeArg,

    #[arg(long, value_enum, default_value_t = QueryTypeArg::Title)]
    pub query_type: QueryTypeArg,

    #[arg(long, value_enum, default_value_t = FeedbackTypeArg::None)]
    pub feedback_type: FeedbackTypeArg,

    /// Ranked-results file to evaluate
    pub results_file: PathBuf,
}

#[derive(Args)]
pub struct ResultsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long)]
    pub task: i64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RunTypeArg {
    Automatic,
    Manual,
}

impl From<RunTypeArg> for RunType {
    fn from(v: RunTypeArg) -> Self {
        match v {
            RunTypeArg::Automatic => RunType::Automatic,
            RunTypeArg::Manual => RunType::Manual,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum QueryTypeArg {
    Title,
    Description,
    Both,
}

impl From<QueryTypeArg> for QueryType {
    fn from(v: QueryTypeArg) -> Self {
        match v {
            QueryTypeArg::Title => QueryType::Title,
            QueryTypeArg::Description => QueryType::Description,
            QueryTypeArg::Both => QueryType::Both,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FeedbackTypeArg {
    None,
    Pseudo,
    Relevance,
}

impl From<FeedbackTypeArg> for FeedbackType {
    fn from(v: FeedbackTypeArg) -> Self {
        match v {
            FeedbackTypeArg::None => FeedbackType::None,
            FeedbackTypeArg::Pseudo => FeedbackType::Pseudo,
            FeedbackTypeArg::Relevance => FeedbackType::Relevance,
        }
    }
}
