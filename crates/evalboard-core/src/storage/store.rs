use crate::model::{
    parse_db_timestamp, round1, to_db_timestamp, EvaluationRow, EvaluationStatus, NewEvaluation,
};
use crate::performance::{PerformancePoint, RecentTrend};
use crate::query::{ListQuery, Summary};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const EVALUATION_COLUMNS: &str =
    "id, name, description, status, score, test_cases, last_run, created_at, updated_at";

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

/// Fields needed to place one evaluation in a category bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySample {
    pub name: String,
    pub score: Option<f64>,
    pub status: EvaluationStatus,
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

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("sqlite connection mutex poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)
            .context("failed to apply schema")?;
        Ok(())
    }

    pub fn insert_evaluation(&self, e: &NewEvaluation) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO evaluations(name, description, status, score, test_cases, last_run, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                e.name,
                e.description,
                e.status.as_str(),
                e.score,
                e.test_cases,
                e.last_run.as_ref().map(to_db_timestamp),
                to_db_timestamp(&e.created_at),
                to_db_timestamp(&e.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// One page of evaluations plus the row count for the same filter.
    pub fn list_evaluations(&self, q: &ListQuery) -> anyhow::Result<(Vec<EvaluationRow>, u64)> {
        let conn = self.lock()?;

        let mut filter_params: Vec<Value> = Vec::new();
        let where_clause = match &q.status {
            Some(status) => {
                filter_params.push(Value::Text(status.clone()));
                "WHERE status = ?"
            }
            None => "",
        };

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM evaluations {where_clause}"),
            params_from_iter(filter_params.iter()),
            |r| r.get(0),
        )?;

        // column and direction come from closed enums, never from the request
        let sql = format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations {where_clause}
             ORDER BY {col} {dir}, id {dir}
             LIMIT ? OFFSET ?",
            col = q.sort.column(),
            dir = q.order.sql(),
        );

        let mut page_params = filter_params;
        page_params.push(Value::Integer(i64::from(q.limit)));
        page_params.push(Value::Integer(q.offset() as i64));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(page_params.iter()), evaluation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((rows, total as u64))
    }

    /// Whole-table figures, independent of any list filter.
    pub fn summary(&self) -> anyhow::Result<Summary> {
        let conn = self.lock()?;
        let (total, avg, active): (i64, Option<f64>, i64) = conn.query_row(
            "SELECT COUNT(*), AVG(score), COUNT(*) FILTER (WHERE status = 'running')
             FROM evaluations",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;

        Ok(Summary {
            total_evaluations: total as u64,
            average_score: avg.map(round1).unwrap_or(0.0),
            active_tests: active as u64,
        })
    }

    pub fn get_evaluation(&self, id: i64) -> anyhow::Result<Option<EvaluationRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE id = ?1"),
                params![id],
                evaluation_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Moves an evaluation into the running state in a single statement:
    /// status, last_run, updated_at and score change together or not at all.
    /// Returns `None` when no row has this id.
    pub fn mark_running(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<EvaluationRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "UPDATE evaluations
                     SET status = 'running', last_run = ?1, updated_at = ?1, score = NULL
                     WHERE id = ?2
                     RETURNING {EVALUATION_COLUMNS}"
                ),
                params![to_db_timestamp(&now), id],
                evaluation_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Per-day aggregates over rows updated at or after `since`, oldest day first.
    pub fn daily_rollup(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<PerformancePoint>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT
                date(updated_at) AS day,
                COUNT(*),
                AVG(score),
                MAX(score),
                MIN(score),
                COUNT(*) FILTER (WHERE status = 'completed'),
                COUNT(*) FILTER (WHERE status = 'running'),
                COUNT(*) FILTER (WHERE score >= 95),
                COUNT(*) FILTER (WHERE score >= 85 AND score < 95),
                COUNT(*) FILTER (WHERE score < 85)
             FROM evaluations
             WHERE updated_at >= ?1
             GROUP BY day
             ORDER BY day ASC",
        )?;

        let points = stmt
            .query_map(params![to_db_timestamp(&since)], |row| {
                let day: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                    })?;
                Ok(PerformancePoint {
                    date,
                    total_evaluations: row.get::<_, i64>(1)? as u64,
                    avg_score: round1(row.get::<_, Option<f64>>(2)?.unwrap_or(0.0)),
                    max_score: round1(row.get::<_, Option<f64>>(3)?.unwrap_or(0.0)),
                    min_score: round1(row.get::<_, Option<f64>>(4)?.unwrap_or(0.0)),
                    completed_tests: row.get::<_, i64>(5)? as u64,
                    active_tests: row.get::<_, i64>(6)? as u64,
                    excellent_tests: row.get::<_, i64>(7)? as u64,
                    good_tests: row.get::<_, i64>(8)? as u64,
                    poor_tests: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }

    pub fn category_samples(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<CategorySample>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, score, status FROM evaluations WHERE updated_at >= ?1 ORDER BY id",
        )?;
        let samples = stmt
            .query_map(params![to_db_timestamp(&since)], |row| {
                Ok(CategorySample {
                    name: row.get(0)?,
                    score: row.get(1)?,
                    status: EvaluationStatus::parse(&row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(samples)
    }

    /// Most recently updated completed evaluations with a score, rank 1 first.
    pub fn recent_completed(&self, limit: u32) -> anyhow::Result<Vec<RecentTrend>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, score, status, updated_at,
                    ROW_NUMBER() OVER (ORDER BY updated_at DESC, id DESC) AS recency
             FROM evaluations
             WHERE status = 'completed' AND score IS NOT NULL
             ORDER BY updated_at DESC, id DESC
             LIMIT ?1",
        )?;
        let trends = stmt
            .query_map(params![limit], |row| {
                Ok(RecentTrend {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    score: row.get(2)?,
                    status: EvaluationStatus::parse(&row.get::<_, String>(3)?),
                    updated_at: timestamp_at(row, 4)?,
                    rank: row.get::<_, i64>(5)? as u32,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(trends)
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM evaluations", [], |r| r.get(0))?;
        Ok(n as u64)
    }
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_db_timestamp(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

fn evaluation_from_row(row: &Row<'_>) -> rusqlite::Result<EvaluationRow> {
    Ok(EvaluationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: EvaluationStatus::parse(&row.get::<_, String>(3)?),
        score: row.get(4)?,
        test_cases: row.get(5)?,
        last_run: optional_timestamp_at(row, 6)?,
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}
