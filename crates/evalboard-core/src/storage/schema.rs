pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS evaluations (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  status TEXT NOT NULL DEFAULT 'pending',
  score REAL,
  test_cases INTEGER NOT NULL DEFAULT 0,
  last_run TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_evaluations_updated_at ON evaluations(updated_at);
CREATE INDEX IF NOT EXISTS idx_evaluations_status ON evaluations(status);
"#;
