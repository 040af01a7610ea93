use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format for every timestamp column. Lexicographic order matches
/// chronological order and SQLite's `date()` understands it.
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display format for `lastRun` on the wire (e.g. `2024-03-01 14:05 PM`).
pub const LAST_RUN_FORMAT: &str = "%Y-%m-%d %H:%M %p";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvaluationStatus {
    Pending,
    Running,
    Completed,
    /// The column has no check constraint; anything else is carried verbatim.
    Other(String),
}

impl EvaluationStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => EvaluationStatus::Pending,
            "running" => EvaluationStatus::Running,
            "completed" => EvaluationStatus::Completed,
            other => EvaluationStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Running => "running",
            EvaluationStatus::Completed => "completed",
            EvaluationStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for EvaluationStatus {
    fn from(s: String) -> Self {
        EvaluationStatus::parse(&s)
    }
}

impl From<EvaluationStatus> for String {
    fn from(s: EvaluationStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the `evaluations` table, with typed timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: EvaluationStatus,
    pub score: Option<f64>,
    pub test_cases: i64,
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRow {
    pub fn to_record(&self) -> Evaluation {
        Evaluation {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            score: self.score,
            test_cases: self.test_cases,
            last_run: self.last_run.as_ref().map(format_last_run),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Evaluation as served by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: EvaluationStatus,
    pub score: Option<f64>,
    pub test_cases: i64,
    pub last_run: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload used by fixtures and demo seeding. There is no creation
/// endpoint.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub name: String,
    pub description: String,
    pub status: EvaluationStatus,
    pub score: Option<f64>,
    pub test_cases: i64,
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewEvaluation {
    pub fn new(name: &str, status: EvaluationStatus, at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            status,
            score: None,
            test_cases: 0,
            last_run: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn test_cases(mut self, n: i64) -> Self {
        self.test_cases = n;
        self
    }

    pub fn last_run(mut self, at: DateTime<Utc>) -> Self {
        self.last_run = Some(at);
        self
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }
}

/// Body of `POST /evaluations/:id/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAccepted {
    pub message: String,
    pub evaluation: Evaluation,
}

/// Error body shared by every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub fn format_last_run(ts: &DateTime<Utc>) -> String {
    ts.format(LAST_RUN_FORMAT).to_string()
}

pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

pub fn parse_db_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DB_TIMESTAMP_FORMAT).map(|n| n.and_utc())
}

/// Round to one decimal place, the precision of every aggregate score.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_roundtrips_free_text() {
        assert_eq!(EvaluationStatus::parse("running"), EvaluationStatus::Running);
        let odd = EvaluationStatus::parse("queued");
        assert_eq!(odd, EvaluationStatus::Other("queued".into()));
        assert_eq!(odd.as_str(), "queued");

        let json = serde_json::to_string(&EvaluationStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn last_run_uses_24h_clock_with_meridiem() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 59).unwrap();
        assert_eq!(format_last_run(&ts), "2024-03-01 14:05 PM");

        let morning = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(format_last_run(&morning), "2024-03-01 09:00 AM");
    }

    #[test]
    fn db_timestamps_parse_back() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 1).unwrap();
        let s = to_db_timestamp(&ts);
        assert_eq!(s, "2024-12-31 23:59:01");
        assert_eq!(parse_db_timestamp(&s).unwrap(), ts);
    }

    #[test]
    fn record_serializes_camel_case() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let row = EvaluationRow {
            id: 7,
            name: "Fraud Sweep".into(),
            description: "d".into(),
            status: EvaluationStatus::Completed,
            score: Some(91.5),
            test_cases: 40,
            last_run: Some(at),
            created_at: at,
            updated_at: at,
        };
        let v = serde_json::to_value(row.to_record()).unwrap();
        assert_eq!(v["testCases"], 40);
        assert_eq!(v["lastRun"], "2024-01-02 03:04 AM");
        assert_eq!(v["status"], "completed");
        assert!(v.get("updatedAt").is_some());
    }
}
