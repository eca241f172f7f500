use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Researcher {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub organisation: String,
    pub website: String,
    pub is_admin: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub track_url: String,
    pub description: String,
    pub genre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub track_id: i64,
    pub title: String,
    pub task_url: String,
    pub description: String,
    pub year: String,
    /// Path to the ground-truth qrels file under the media store.
    pub judgement_file: PathBuf,
}

/// One researcher's submitted ranked-results file for a task.
///
/// The three metric fields are all present (finalized) or all absent
/// (provisional); no other combination is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    pub researcher_id: i64,
    pub task_id: i64,
    pub name: String,
    pub description: String,
    pub results_file: PathBuf,
    pub results_sha256: String,
    pub map: Option<f64>,
    pub p10: Option<f64>,
    pub p20: Option<f64>,
    pub run_type: RunType,
    pub query_type: QueryType,
    pub feedback_type: FeedbackType,
    pub submitted_at: DateTime<Utc>,
}

impl Run {
    /// The finalized scores, if evaluation completed.
    pub fn scores(&self) -> Option<RunScores> {
        match (self.map, self.p10, self.p20) {
            (Some(map), Some(p10), Some(p20)) => Some(RunScores { map, p10, p20 }),
            _ => None,
        }
    }
}

/// The three metrics extracted from one evaluation-tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunScores {
    pub map: f64,
    pub p10: f64,
    pub p20: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunType {
    Automatic,
    Manual,
}

impl RunType {
    pub fn code(self) -> &'static str {
        match self {
            RunType::Automatic => "A",
            RunType::Manual => "M",
        }
    }

    /// Lenient parse for storage codes; unknown codes fall back to Automatic.
    pub fn parse(code: &str) -> Self {
        match code {
            "M" => RunType::Manual,
            _ => RunType::Automatic,
        }
    }
}

impl FromStr for RunType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" | "auto" | "a" => Ok(RunType::Automatic),
            "manual" | "m" => Ok(RunType::Manual),
            other => Err(format!("unknown run type '{other}'")),
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunType::Automatic => write!(f, "automatic"),
            RunType::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Title,
    Description,
    Both,
}

impl QueryType {
    pub fn code(self) -> &'static str {
        match self {
            QueryType::Title => "T",
            QueryType::Description => "D",
            QueryType::Both => "B",
        }
    }

    pub fn parse(code: &str) -> Self {
        match code {
            "D" => QueryType::Description,
            "B" => QueryType::Both,
            _ => QueryType::Title,
        }
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" | "t" => Ok(QueryType::Title),
            "description" | "desc" | "d" => Ok(QueryType::Description),
            "both" | "b" => Ok(QueryType::Both),
            other => Err(format!("unknown query type '{other}'")),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Title => write!(f, "title"),
            QueryType::Description => write!(f, "description"),
            QueryType::Both => write!(f, "both"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackType {
    None,
    Pseudo,
    Relevance,
}

impl FeedbackType {
    pub fn code(self) -> &'static str {
        match self {
            FeedbackType::None => "NONE",
            FeedbackType::Pseudo => "PRF",
            FeedbackType::Relevance => "RF",
        }
    }

    pub fn parse(code: &str) -> Self {
        match code {
            "PRF" => FeedbackType::Pseudo,
            "RF" => FeedbackType::Relevance,
            _ => FeedbackType::None,
        }
    }
}

impl FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FeedbackType::None),
            "pseudo" | "prf" => Ok(FeedbackType::Pseudo),
            "relevance" | "rf" => Ok(FeedbackType::Relevance),
            other => Err(format!("unknown feedback type '{other}'")),
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackType::None => write!(f, "none"),
            FeedbackType::Pseudo => write!(f, "pseudo"),
            FeedbackType::Relevance => write!(f, "relevance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_codes_round_trip() {
        for rt in [RunType::Automatic, RunType::Manual] {
            assert_eq!(RunType::parse(rt.code()), rt);
        }
        for qt in [QueryType::Title, QueryType::Description, QueryType::Both] {
            assert_eq!(QueryType::parse(qt.code()), qt);
        }
        for ft in [
            FeedbackType::None,
            FeedbackType::Pseudo,
            FeedbackType::Relevance,
        ] {
            assert_eq!(FeedbackType::parse(ft.code()), ft);
        }
    }

    #[test]
    fn enum_names_parse_and_display() {
        assert_eq!("manual".parse::<RunType>().unwrap(), RunType::Manual);
        assert_eq!("desc".parse::<QueryType>().unwrap(), QueryType::Description);
        assert_eq!("prf".parse::<FeedbackType>().unwrap(), FeedbackType::Pseudo);
        assert!("bogus".parse::<RunType>().is_err());
        assert_eq!(RunType::Automatic.to_string(), "automatic");
        assert_eq!(FeedbackType::Relevance.to_string(), "relevance");
    }

    #[test]
    fn run_scores_all_or_none() {
        let run = Run {
            id: 1,
            researcher_id: 1,
            task_id: 1,
            name: "baseline".into(),
            description: String::new(),
            results_file: PathBuf::from("results.txt"),
            results_sha256: String::new(),
            map: Some(0.42),
            p10: Some(0.5),
            p20: Some(0.25),
            run_type: RunType::Automatic,
            query_type: QueryType::Title,
            feedback_type: FeedbackType::None,
            submitted_at: Utc::now(),
        };
        assert!(run.scores().is_some());

        let provisional = Run {
            map: None,
            p10: None,
            p20: None,
            ..run
        };
        assert!(provisional.scores().is_none());
    }
}
