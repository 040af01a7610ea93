use crate::model::Evaluation;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Query string of `GET /evaluations`, exactly as the client sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// First value for `key` in a decoded query string. Later repeats are ignored.
pub fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

impl RawListParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let get = |key| first_param(pairs, key).map(str::to_string);
        Self {
            page: get("page"),
            limit: get("limit"),
            status: get("status"),
            sort: get("sort"),
            order: get("order"),
        }
    }
}

/// Sortable columns. Anything else resolves to `UpdatedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Name,
    Status,
    Score,
    TestCases,
    CreatedAt,
    #[default]
    UpdatedAt,
    LastRun,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "name" => Some(SortField::Name),
            "status" => Some(SortField::Status),
            "score" => Some(SortField::Score),
            "test_cases" => Some(SortField::TestCases),
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "last_run" => Some(SortField::LastRun),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Status => "status",
            SortField::Score => "score",
            SortField::TestCases => "test_cases",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::LastRun => "last_run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the literal `asc` sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated list request. Construction never fails: malformed input falls
/// back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            status: None,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    pub fn from_raw(raw: &RawListParams, max_page_size: u32) -> Self {
        let page = parse_positive(raw.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(raw.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(max_page_size.max(1));
        let status = raw
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let sort = raw
            .sort
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or_default();
        let order = raw
            .order
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default();

        Self {
            page,
            limit,
            status,
            sort,
            order,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(query: &ListQuery, total: u64) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            total,
            total_pages: total.div_ceil(u64::from(query.limit)),
        }
    }
}

/// Table-wide figures. Never scoped to the list filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_evaluations: u64,
    pub average_score: f64,
    pub active_tests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPage {
    pub evaluations: Vec<Evaluation>,
    pub pagination: Pagination,
    pub summary: Summary,
}
