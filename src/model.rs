// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON report model (PRs, issues, reviews, commits, totals) written by the aggregator
// role: model/types
// outputs: Serializable structs with stable field names; records are read-only views over remote data
// invariants: Derived deltas (cycle_time_days, time_to_close_days) are None unless both endpoints were present; additive fields only
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// An enriched pull request authored by the target user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PullRequestRecord {
  pub repo: String,
  pub number: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merged_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<String>,
  pub additions: i64,
  pub deletions: i64,
  pub changed_files: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub commits: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merge_commit_sha: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  /// Days from creation to merge (or close when never merged).
  pub cycle_time_days: Option<f64>,
  /// Set when the detail lookup failed and the record degraded to search-item data.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fetch_error: Option<String>,
}

/// An issue authored by (or assigned to) the target user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IssueRecord {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repo: Option<String>,
  pub number: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<String>,
  pub labels: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  pub time_to_close_days: Option<f64>,
  pub is_incident: bool,
}

/// A pull request the target user reviewed. Slim: no detail enrichment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReviewRecord {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repo: Option<String>,
  pub number: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AssociatedPr {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub number: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
}

/// An enriched commit; `sha` is the dedup key across author/committer queries.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommitRecord {
  pub repo: String,
  pub sha: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  pub additions: i64,
  pub deletions: i64,
  pub total_changes: i64,
  pub files_changed: i64,
  pub associated_prs: Vec<AssociatedPr>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fetch_error: Option<String>,
}

/// Aggregate counters and averages over the collected records. Averages are
/// None (not zero) when no record carried the underlying delta.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Totals {
  pub prs_created: usize,
  pub prs_merged: usize,
  pub lines_added: i64,
  pub lines_deleted: i64,
  pub files_changed: i64,
  pub avg_cycle_time_days: Option<f64>,
  pub repos_contributed: Vec<String>,
  pub issues_created: usize,
  pub avg_issue_close_time_days: Option<f64>,
  pub incident_issues_count: usize,
  pub avg_incident_mttr_days: Option<f64>,
  pub prs_reviewed: usize,
  pub commits_count: usize,
  pub commit_lines_changed: i64,
  pub commit_additions: i64,
  pub commit_deletions: i64,
}

/// The terminal entity: one report per invocation, immutable once built.
#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateReport {
  pub user: String,
  pub start_date: String,
  pub end_date: String,
  pub generated_at: String,
  pub pull_requests: Vec<PullRequestRecord>,
  pub issues: Vec<IssueRecord>,
  pub issues_assigned: Vec<IssueRecord>,
  pub reviews: Vec<ReviewRecord>,
  pub commits: Vec<CommitRecord>,
  pub aggregates: Totals,
}
