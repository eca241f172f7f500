pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS researchers (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  password_hash TEXT NOT NULL,
  email TEXT NOT NULL DEFAULT '',
  display_name TEXT NOT NULL DEFAULT '',
  organisation TEXT NOT NULL DEFAULT '',
  website TEXT NOT NULL DEFAULT '',
  is_admin INTEGER NOT NULL DEFAULT 0,
  active INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
  token TEXT PRIMARY KEY,
  researcher_id INTEGER NOT NULL REFERENCES researchers(id),
  created_at TEXT NOT NULL,
  expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tracks (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL UNIQUE,
  track_url TEXT NOT NULL DEFAULT '',
  description TEXT NOT NULL DEFAULT '',
  genre TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS tasks (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  track_id INTEGER NOT NULL REFERENCES tracks(id),
  title TEXT NOT NULL DEFAULT '',
  task_url TEXT NOT NULL DEFAULT '',
  description TEXT NOT NULL DEFAULT '',
  year TEXT NOT NULL DEFAULT '',
  judgement_file TEXT NOT NULL
);

-- Scores are all present or all absent; a partially scored run is a bug
-- and the schema refuses to store one.
CREATE TABLE IF NOT EXISTS runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  researcher_id INTEGER NOT NULL REFERENCES researchers(id),
  task_id INTEGER NOT NULL REFERENCES tasks(id),
  name TEXT NOT NULL DEFAULT '',
  description TEXT NOT NULL DEFAULT '',
  results_file TEXT NOT NULL DEFAULT '',
  results_sha256 TEXT NOT NULL DEFAULT '',
  map REAL,
  p10 REAL,
  p20 REAL,
  run_type TEXT NOT NULL,
  query_type TEXT NOT NULL,
  feedback_type TEXT NOT NULL,
  submitted_at TEXT NOT NULL,
  CHECK ((map IS NULL AND p10 IS NULL AND p20 IS NULL)
      OR (map IS NOT NULL AND p10 IS NOT NULL AND p20 IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS idx_sessions_researcher ON sessions(researcher_id);
CREATE INDEX IF NOT EXISTS idx_tasks_track ON tasks(track_id);
CREATE INDEX IF NOT EXISTS idx_runs_task ON runs(task_id);
CREATE INDEX IF NOT EXISTS idx_runs_researcher ON runs(researcher_id);
"#;
