use crate::model::{
    FeedbackType, QueryType, Researcher, Run, RunScores, RunType, Task, Track,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone)]
pub struct NewResearcher {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub display_name: String,
    pub organisation: String,
    pub website: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub organisation: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub track_url: String,
    pub description: String,
    pub genre: String,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub track_id: i64,
    pub title: String,
    pub task_url: String,
    pub description: String,
    pub year: String,
    pub judgement_file: PathBuf,
}

/// A run before evaluation: no scores, no stored results path yet.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub researcher_id: i64,
    pub task_id: i64,
    pub name: String,
    pub description: String,
    pub run_type: RunType,
    pub query_type: QueryType,
    pub feedback_type: FeedbackType,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub token: String,
    pub researcher_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(super::schema::DDL)?;
        Ok(())
    }

    // ----- researchers -----

    pub fn create_researcher(&self, new: &NewResearcher) -> anyhow::Result<Researcher> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO researchers
               (username, password_hash, email, display_name, organisation, website,
                is_admin, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
            params![
                new.username,
                new.password_hash,
                new.email,
                new.display_name,
                new.organisation,
                new.website,
                new.is_admin,
                Utc::now().to_rfc3339(),
            ],
        )
        .context("failed to insert researcher")?;
        let id = conn.last_insert_rowid();
        fetch_researcher(&conn, id)?.context("researcher missing after insert")
    }

    pub fn researcher_by_id(&self, id: i64) -> anyhow::Result<Option<Researcher>> {
        let conn = self.conn.lock().unwrap();
        fetch_researcher(&conn, id)
    }

    pub fn researcher_by_username(&self, username: &str) -> anyhow::Result<Option<Researcher>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{RESEARCHER_SELECT} WHERE username = ?1"),
                params![username],
                researcher_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Researcher plus stored password hash, for login verification.
    pub fn credentials_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<(Researcher, String)>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, username, email, display_name, organisation, website,
                        is_admin, active, created_at, password_hash
                 FROM researchers WHERE username = ?1",
                params![username],
                |row| {
                    let researcher = researcher_from_row(row)?;
                    let hash: String = row.get(9)?;
                    Ok((researcher, hash))
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn researcher_count(&self) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        let n = conn.query_row("SELECT COUNT(*) FROM researchers", [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE researchers SET
               email = COALESCE(?2, email),
               display_name = COALESCE(?3, display_name),
               organisation = COALESCE(?4, organisation),
               website = COALESCE(?5, website)
             WHERE id = ?1",
            params![
                id,
                update.email,
                update.display_name,
                update.organisation,
                update.website
            ],
        )?;
        anyhow::ensure!(changed == 1, "no researcher with id {id}");
        Ok(())
    }

    pub fn set_researcher_active(&self, id: i64, active: bool) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE researchers SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(())
    }

    // ----- sessions -----

    pub fn insert_session(&self, session: &SessionRow) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions (token, researcher_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.researcher_id,
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )
        .context("failed to insert session")?;
        Ok(())
    }

    pub fn session_by_token(&self, token: &str) -> anyhow::Result<Option<SessionRow>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT token, researcher_id, created_at, expires_at
                 FROM sessions WHERE token = ?1",
                params![token],
                |row| {
                    Ok(SessionRow {
                        token: row.get(0)?,
                        researcher_id: row.get(1)?,
                        created_at: ts(2, row.get(2)?)?,
                        expires_at: ts(3, row.get(3)?)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn delete_session(&self, token: &str) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![now.to_rfc3339()],
        )?;
        Ok(n)
    }

    // ----- tracks -----

    pub fn create_track(&self, new: &NewTrack) -> anyhow::Result<Track> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tracks (title, track_url, description, genre)
             VALUES (?1, ?2, ?3, ?4)",
            params![new.title, new.track_url, new.description, new.genre],
        )
        .context("failed to insert track")?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("{TRACK_SELECT} WHERE id = ?1"),
            params![id],
            track_from_row,
        )
        .context("track missing after insert")
    }

    pub fn track_by_id(&self, id: i64) -> anyhow::Result<Option<Track>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{TRACK_SELECT} WHERE id = ?1"),
                params![id],
                track_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_tracks(&self) -> anyhow::Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{TRACK_SELECT} ORDER BY title"))?;
        let rows = stmt.query_map([], track_from_row)?;
        collect(rows)
    }

    // ----- tasks -----

    pub fn create_task(&self, new: &NewTask) -> anyhow::Result<Task> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tasks (track_id, title, task_url, description, year, judgement_file)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.track_id,
                new.title,
                new.task_url,
                new.description,
                new.year,
                path_str(&new.judgement_file),
            ],
        )
        .context("failed to insert task")?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("{TASK_SELECT} WHERE id = ?1"),
            params![id],
            task_from_row,
        )
        .context("task missing after insert")
    }

    pub fn task_by_id(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{TASK_SELECT} WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn tasks_for_track(&self, track_id: i64) -> anyhow::Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("{TASK_SELECT} WHERE track_id = ?1 ORDER BY id"))?;
        let rows = stmt.query_map(params![track_id], task_from_row)?;
        collect(rows)
    }

    pub fn list_tasks(&self) -> anyhow::Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{TASK_SELECT} ORDER BY track_id, id"))?;
        let rows = stmt.query_map([], task_from_row)?;
        collect(rows)
    }

    // ----- runs -----

    /// Insert a run with no scores and no stored results path yet. The
    /// caller either finalizes it with all three scores or deletes it.
    pub fn insert_provisional_run(&self, new: &NewRun) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs
               (researcher_id, task_id, name, description,
                run_type, query_type, feedback_type, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.researcher_id,
                new.task_id,
                new.name,
                new.description,
                new.run_type.code(),
                new.query_type.code(),
                new.feedback_type.code(),
                new.submitted_at.to_rfc3339(),
            ],
        )
        .context("failed to insert run")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_run_results_file(
        &self,
        id: i64,
        path: &Path,
        sha256: &str,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE runs SET results_file = ?2, results_sha256 = ?3 WHERE id = ?1",
            params![id, path_str(path), sha256],
        )?;
        anyhow::ensure!(changed == 1, "no run with id {id}");
        Ok(())
    }

    /// Write all three scores at once; the schema CHECK refuses anything
    /// partial.
    pub fn finalize_run_scores(&self, id: i64, scores: RunScores) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE runs SET map = ?2, p10 = ?3, p20 = ?4 WHERE id = ?1",
            params![id, scores.map, scores.p10, scores.p20],
        )?;
        anyhow::ensure!(changed == 1, "no run with id {id}");
        Ok(())
    }

    pub fn delete_run(&self, id: i64) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM runs WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn run_by_id(&self, id: i64) -> anyhow::Result<Option<Run>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!("{RUN_SELECT} WHERE id = ?1"),
                params![id],
                run_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Results board ordering: scored runs first, best MAP on top.
    pub fn runs_for_task(&self, task_id: i64) -> anyhow::Result<Vec<Run>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{RUN_SELECT} WHERE task_id = ?1 ORDER BY map IS NULL, map DESC, id"
        ))?;
        let rows = stmt.query_map(params![task_id], run_from_row)?;
        collect(rows)
    }

    pub fn runs_for_researcher(&self, researcher_id: i64) -> anyhow::Result<Vec<Run>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("{RUN_SELECT} WHERE researcher_id = ?1 ORDER BY id DESC"))?;
        let rows = stmt.query_map(params![researcher_id], run_from_row)?;
        collect(rows)
    }
}

const RESEARCHER_SELECT: &str = "SELECT id, username, email, display_name, organisation, \
                                 website, is_admin, active, created_at FROM researchers";
const TRACK_SELECT: &str = "SELECT id, title, track_url, description, genre FROM tracks";
const TASK_SELECT: &str =
    "SELECT id, track_id, title, task_url, description, year, judgement_file FROM tasks";
const RUN_SELECT: &str = "SELECT id, researcher_id, task_id, name, description, results_file, \
                          results_sha256, map, p10, p20, run_type, query_type, feedback_type, \
                          submitted_at FROM runs";

fn fetch_researcher(conn: &Connection, id: i64) -> anyhow::Result<Option<Researcher>> {
    let row = conn
        .query_row(
            &format!("{RESEARCHER_SELECT} WHERE id = ?1"),
            params![id],
            researcher_from_row,
        )
        .optional()?;
    Ok(row)
}

fn researcher_from_row(row: &Row<'_>) -> rusqlite::Result<Researcher> {
    Ok(Researcher {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        organisation: row.get(4)?,
        website: row.get(5)?,
        is_admin: row.get(6)?,
        active: row.get(7)?,
        created_at: ts(8, row.get(8)?)?,
    })
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        title: row.get(1)?,
        track_url: row.get(2)?,
        description: row.get(3)?,
        genre: row.get(4)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        track_id: row.get(1)?,
        title: row.get(2)?,
        task_url: row.get(3)?,
        description: row.get(4)?,
        year: row.get(5)?,
        judgement_file: PathBuf::from(row.get::<_, String>(6)?),
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: row.get(0)?,
        researcher_id: row.get(1)?,
        task_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        results_file: PathBuf::from(row.get::<_, String>(5)?),
        results_sha256: row.get(6)?,
        map: row.get(7)?,
        p10: row.get(8)?,
        p20: row.get(9)?,
        run_type: RunType::parse(&row.get::<_, String>(10)?),
        query_type: QueryType::parse(&row.get::<_, String>(11)?),
        feedback_type: FeedbackType::parse(&row.get::<_, String>(12)?),
        submitted_at: ts(13, row.get(13)?)?,
    })
}

fn ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> anyhow::Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedbackType, QueryType, RunType};

    fn store() -> Store {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    fn researcher(store: &Store, username: &str) -> Researcher {
        store
            .create_researcher(&NewResearcher {
                username: username.into(),
                password_hash: "x".into(),
                email: String::new(),
                display_name: String::new(),
                organisation: String::new(),
                website: String::new(),
                is_admin: false,
            })
            .unwrap()
    }

    #[test]
    fn duplicate_usernames_are_rejected() {
        let store = store();
        researcher(&store, "ann");
        let dup = store.create_researcher(&NewResearcher {
            username: "ann".into(),
            password_hash: "y".into(),
            email: String::new(),
            display_name: String::new(),
            organisation: String::new(),
            website: String::new(),
            is_admin: false,
        });
        assert!(dup.is_err());
    }

    #[test]
    fn profile_update_merges_fields() {
        let store = store();
        let r = researcher(&store, "ann");
        store
            .update_profile(
                r.id,
                &ProfileUpdate {
                    organisation: Some("UofG".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let r = store.researcher_by_id(r.id).unwrap().unwrap();
        assert_eq!(r.organisation, "UofG");
        assert_eq!(r.email, "");
    }

    #[test]
    fn tracks_and_tasks() {
        let store = store();
        let track = store
            .create_track(&NewTrack {
                title: "Web".into(),
                track_url: String::new(),
                description: String::new(),
                genre: "web".into(),
            })
            .unwrap();
        let task = store
            .create_task(&NewTask {
                track_id: track.id,
                title: "Ad hoc".into(),
                task_url: String::new(),
                description: String::new(),
                year: "2014".into(),
                judgement_file: PathBuf::from("/media/judgements/qrels.txt"),
            })
            .unwrap();
        assert_eq!(store.list_tracks().unwrap().len(), 1);
        let tasks = store.tasks_for_track(track.id).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(
            tasks[0].judgement_file,
            PathBuf::from("/media/judgements/qrels.txt")
        );
    }

    #[test]
    fn run_lifecycle_finalize() {
        let store = store();
        let r = researcher(&store, "ann");
        let track = store
            .create_track(&NewTrack {
                title: "Web".into(),
                track_url: String::new(),
                description: String::new(),
                genre: String::new(),
            })
            .unwrap();
        let task = store
            .create_task(&NewTask {
                track_id: track.id,
                title: String::new(),
                task_url: String::new(),
                description: String::new(),
                year: String::new(),
                judgement_file: PathBuf::from("qrels.txt"),
            })
            .unwrap();

        let run_id = store
            .insert_provisional_run(&NewRun {
                researcher_id: r.id,
                task_id: task.id,
                name: "baseline".into(),
                description: String::new(),
                run_type: RunType::Automatic,
                query_type: QueryType::Title,
                feedback_type: FeedbackType::None,
                submitted_at: Utc::now(),
            })
            .unwrap();

        let provisional = store.run_by_id(run_id).unwrap().unwrap();
        assert!(provisional.scores().is_none());

        store
            .set_run_results_file(run_id, Path::new("results.txt"), "abc123")
            .unwrap();
        store
            .finalize_run_scores(
                run_id,
                RunScores {
                    map: 0.42,
                    p10: 0.5,
                    p20: 0.25,
                },
            )
            .unwrap();

        let run = store.run_by_id(run_id).unwrap().unwrap();
        let scores = run.scores().unwrap();
        assert_eq!(scores.map, 0.42);
        assert_eq!(run.results_sha256, "abc123");
        assert_eq!(run.run_type, RunType::Automatic);

        let mine = store.runs_for_researcher(r.id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, run_id);
    }

    #[test]
    fn run_lifecycle_discard() {
        let store = store();
        let r = researcher(&store, "ann");
        let track = store
            .create_track(&NewTrack {
                title: "Web".into(),
                track_url: String::new(),
                description: String::new(),
                genre: String::new(),
            })
            .unwrap();
        let task = store
            .create_task(&NewTask {
                track_id: track.id,
                title: String::new(),
                task_url: String::new(),
                description: String::new(),
                year: String::new(),
                judgement_file: PathBuf::from("qrels.txt"),
            })
            .unwrap();
        let run_id = store
            .insert_provisional_run(&NewRun {
                researcher_id: r.id,
                task_id: task.id,
                name: "broken".into(),
                description: String::new(),
                run_type: RunType::Manual,
                query_type: QueryType::Both,
                feedback_type: FeedbackType::Pseudo,
                submitted_at: Utc::now(),
            })
            .unwrap();

        store.delete_run(run_id).unwrap();
        assert!(store.run_by_id(run_id).unwrap().is_none());
        assert!(store.runs_for_task(task.id).unwrap().is_empty());
    }

    #[test]
    fn results_board_orders_by_map() {
        let store = store();
        let r = researcher(&store, "ann");
        let track = store
            .create_track(&NewTrack {
                title: "Web".into(),
                track_url: String::new(),
                description: String::new(),
                genre: String::new(),
            })
            .unwrap();
        let task = store
            .create_task(&NewTask {
                track_id: track.id,
                title: String::new(),
                task_url: String::new(),
                description: String::new(),
                year: String::new(),
                judgement_file: PathBuf::from("qrels.txt"),
            })
            .unwrap();

        for (name, map) in [("low", 0.2), ("high", 0.8), ("mid", 0.5)] {
            let id = store
                .insert_provisional_run(&NewRun {
                    researcher_id: r.id,
                    task_id: task.id,
                    name: name.into(),
                    description: String::new(),
                    run_type: RunType::Automatic,
                    query_type: QueryType::Title,
                    feedback_type: FeedbackType::None,
                    submitted_at: Utc::now(),
                })
                .unwrap();
            store
                .finalize_run_scores(
                    id,
                    RunScores {
                        map,
                        p10: map,
                        p20: map,
                    },
                )
                .unwrap();
        }

        let names: Vec<String> = store
            .runs_for_task(task.id)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn sessions_expire_and_purge() {
        let store = store();
        let r = researcher(&store, "ann");
        let now = Utc::now();
        store
            .insert_session(&SessionRow {
                token: "t1".into(),
                researcher_id: r.id,
                created_at: now - chrono::Duration::days(30),
                expires_at: now - chrono::Duration::days(16),
            })
            .unwrap();
        store
            .insert_session(&SessionRow {
                token: "t2".into(),
                researcher_id: r.id,
                created_at: now,
                expires_at: now + chrono::Duration::days(14),
            })
            .unwrap();

        assert_eq!(store.purge_expired_sessions(now).unwrap(), 1);
        assert!(store.session_by_token("t1").unwrap().is_none());
        assert!(store.session_by_token("t2").unwrap().is_some());
    }
}
