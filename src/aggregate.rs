// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold collected activity records into Totals and assemble the final AggregateReport
// role: metrics/aggregation
// inputs: Activity collections, user handle, window bounds
// outputs: One immutable AggregateReport; averages are None (not zero) over empty samples
// invariants:
// - Averages exclude null deltas; they never coerce missing values to zero
// - Issue-close and incident averages run over authored + assigned issues together
// - repos_contributed is sorted and deduplicated, sourced from PRs and commits
// errors: None; aggregation is total over its inputs
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeSet;

use chrono::{SecondsFormat, Utc};

use crate::fetch::Activity;
use crate::model::{AggregateReport, IssueRecord, Totals};
use crate::util::mean_rounded;

/// Assemble the report for one run. Consumes the activity; records land in
/// the report in the order the searches returned them.
pub fn build_report(user: &str, start: &str, end: &str, activity: Activity) -> AggregateReport {
  let aggregates = totals(&activity);

  AggregateReport {
    user: user.to_string(),
    start_date: start.to_string(),
    end_date: end.to_string(),
    generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    pull_requests: activity.pull_requests,
    issues: activity.issues,
    issues_assigned: activity.issues_assigned,
    reviews: activity.reviews,
    commits: activity.commits,
    aggregates,
  }
}

fn totals(activity: &Activity) -> Totals {
  let prs = &activity.pull_requests;
  let commits = &activity.commits;

  let cycle_times: Vec<f64> = prs.iter().filter_map(|p| p.cycle_time_days).collect();

  // Close-time samples pool authored and assigned issues; an issue appearing
  // in both collections counts twice, as does its incident flag.
  let all_issues = || activity.issues.iter().chain(activity.issues_assigned.iter());

  let close_times: Vec<f64> = all_issues().filter_map(|i| i.time_to_close_days).collect();

  let incidents: Vec<&IssueRecord> = all_issues().filter(|i| i.is_incident).collect();
  let incident_ttrs: Vec<f64> = incidents.iter().filter_map(|i| i.time_to_close_days).collect();

  let repos: BTreeSet<String> = prs
    .iter()
    .map(|p| p.repo.clone())
    .chain(commits.iter().map(|c| c.repo.clone()))
    .filter(|r| !r.is_empty())
    .collect();

  Totals {
    prs_created: prs.len(),
    prs_merged: prs.iter().filter(|p| p.merged_at.is_some()).count(),
    lines_added: prs.iter().map(|p| p.additions).sum(),
    lines_deleted: prs.iter().map(|p| p.deletions).sum(),
    files_changed: prs.iter().map(|p| p.changed_files).sum(),
    avg_cycle_time_days: mean_rounded(&cycle_times),
    repos_contributed: repos.into_iter().collect(),
    issues_created: activity.issues.len(),
    avg_issue_close_time_days: mean_rounded(&close_times),
    incident_issues_count: incidents.len(),
    avg_incident_mttr_days: mean_rounded(&incident_ttrs),
    prs_reviewed: activity.reviews.len(),
    commits_count: commits.len(),
    commit_lines_changed: commits.iter().map(|c| c.total_changes).sum(),
    commit_additions: commits.iter().map(|c| c.additions).sum(),
    commit_deletions: commits.iter().map(|c| c.deletions).sum(),
  }
}
