// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Search-and-enrich pipelines per activity category (PRs, issues, reviews, commits)
// role: pipeline/collection
// inputs: GithubClient, FetchConfig (user + window + throttle), IncidentVocabulary
// outputs: Typed record collections, in the order the search endpoint returned them
// side_effects: Network calls; courtesy sleeps between per-item detail fetches
// invariants:
// - Commit shas are deduplicated across author/committer queries before any detail fetch
// - Per-item enrichment failures degrade to partial records with fetch_error set; never abort the batch
// - Items whose repo identifier cannot be resolved are skipped, nothing else is
// errors: Search request failures propagate; detail/association failures are contained per item
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::classify::{self, IncidentVocabulary};
use crate::github::GithubClient;
use crate::model::{AssociatedPr, CommitRecord, IssueRecord, PullRequestRecord, ReviewRecord};
use crate::paginate::Paginator;
use crate::util::days_between;

const ACCEPT_COMMIT_SEARCH: &str = "application/vnd.github.text-match+json";
const ACCEPT_COMMIT_PULLS: &str = "application/vnd.github.groot-preview+json";

#[derive(Debug, Clone)]
pub struct FetchConfig {
  pub user: String,
  pub start: String,
  pub end: String,
  pub throttle: Duration,
}

/// Everything one run collects, prior to aggregation.
#[derive(Debug, Default)]
pub struct Activity {
  pub pull_requests: Vec<PullRequestRecord>,
  pub issues: Vec<IssueRecord>,
  pub issues_assigned: Vec<IssueRecord>,
  pub reviews: Vec<ReviewRecord>,
  pub commits: Vec<CommitRecord>,
}

pub struct Fetcher<'a> {
  client: &'a GithubClient,
  pages: Paginator<'a>,
  cfg: &'a FetchConfig,
  vocab: &'a IncidentVocabulary,
}

impl<'a> Fetcher<'a> {
  pub fn new(client: &'a GithubClient, cfg: &'a FetchConfig, vocab: &'a IncidentVocabulary) -> Self {
    Self {
      client,
      pages: Paginator::new(client, cfg.throttle),
      cfg,
      vocab,
    }
  }

  pub fn collect(&self) -> Result<Activity> {
    Ok(Activity {
      pull_requests: self.pull_requests()?,
      issues: self.issues_authored()?,
      issues_assigned: self.issues_assigned()?,
      reviews: self.reviews()?,
      commits: self.commits()?,
    })
  }

  fn range(&self) -> String {
    format!("{}..{}", self.cfg.start, self.cfg.end)
  }

  /// PRs authored in the window, each enriched with a detail lookup for the
  /// line/file counts the search payload omits.
  pub fn pull_requests(&self) -> Result<Vec<PullRequestRecord>> {
    let q = format!("is:pr author:{} created:{}", self.cfg.user, self.range());
    let items = self.pages.search("/search/issues", &q, &[])?;

    let mut out: Vec<PullRequestRecord> = Vec::with_capacity(items.len());

    for item in &items {
      let wire: SearchItemWire = decode(item);

      let repo = wire.repository_url.as_deref().and_then(repo_from_repository_url);
      let (Some(repo), Some(number)) = (repo, wire.number) else {
        continue;
      };

      let record = match self.client.get(&format!("/repos/{}/pulls/{}", repo, number), &[], &[]) {
        Ok(resp) => {
          let d: PrDetailWire = decode(&resp.body);
          let cycle = days_between(
            d.created_at.as_deref(),
            d.merged_at.as_deref().or(d.closed_at.as_deref()),
          );

          PullRequestRecord {
            repo,
            number: d.number.unwrap_or(number),
            title: d.title.or(wire.title),
            state: d.state.or(wire.state),
            created_at: d.created_at,
            merged_at: d.merged_at,
            closed_at: d.closed_at,
            additions: d.additions.unwrap_or(0),
            deletions: d.deletions.unwrap_or(0),
            changed_files: d.changed_files.unwrap_or(0),
            commits: d.commits,
            merge_commit_sha: d.merge_commit_sha,
            html_url: d.html_url.or(wire.html_url),
            cycle_time_days: cycle,
            fetch_error: None,
          }
        }
        Err(err) => {
          eprintln!("[github] PR {}#{} detail fetch failed: {:#}", repo, number, err);

          let cycle = days_between(wire.created_at.as_deref(), wire.closed_at.as_deref());

          PullRequestRecord {
            repo,
            number,
            title: wire.title,
            state: wire.state,
            created_at: wire.created_at,
            merged_at: None,
            closed_at: wire.closed_at,
            additions: 0,
            deletions: 0,
            changed_files: 0,
            commits: None,
            merge_commit_sha: None,
            html_url: wire.html_url,
            cycle_time_days: cycle,
            fetch_error: Some(format!("{:#}", err)),
          }
        }
      };

      out.push(record);
      std::thread::sleep(self.cfg.throttle);
    }

    Ok(out)
  }

  pub fn issues_authored(&self) -> Result<Vec<IssueRecord>> {
    let q = format!("is:issue author:{} created:{}", self.cfg.user, self.range());
    self.issues_with_query(&q)
  }

  /// Issues assigned to the user and closed in the window; widens the MTTR
  /// sample beyond authored issues.
  pub fn issues_assigned(&self) -> Result<Vec<IssueRecord>> {
    let q = format!("is:issue assignee:{} closed:{}", self.cfg.user, self.range());
    self.issues_with_query(&q)
  }

  fn issues_with_query(&self, q: &str) -> Result<Vec<IssueRecord>> {
    let items = self.pages.search("/search/issues", q, &[])?;

    let records = items
      .iter()
      .filter_map(|item| {
        let wire: SearchItemWire = decode(item);
        let number = wire.number?;

        let labels: Vec<String> = wire.labels.iter().filter_map(|l| l.name()).collect();
        let time_to_close = days_between(wire.created_at.as_deref(), wire.closed_at.as_deref());
        let is_incident = classify::is_incident(wire.title.as_deref().unwrap_or(""), &labels, self.vocab);

        Some(IssueRecord {
          repo: wire.repository_url.as_deref().and_then(repo_from_repository_url),
          number,
          title: wire.title,
          state: wire.state,
          created_at: wire.created_at,
          closed_at: wire.closed_at,
          labels,
          html_url: wire.html_url,
          time_to_close_days: time_to_close,
          is_incident,
        })
      })
      .collect();

    Ok(records)
  }

  /// PRs the user reviewed; slim records, no detail enrichment.
  pub fn reviews(&self) -> Result<Vec<ReviewRecord>> {
    let q = format!("is:pr reviewed-by:{} updated:{}", self.cfg.user, self.range());
    let items = self.pages.search("/search/issues", &q, &[])?;

    let records = items
      .iter()
      .filter_map(|item| {
        let wire: SearchItemWire = decode(item);
        let number = wire.number?;

        Some(ReviewRecord {
          repo: wire.repository_url.as_deref().and_then(repo_from_repository_url),
          number,
          title: wire.title,
          state: wire.state,
          created_at: wire.created_at,
          updated_at: wire.updated_at,
          html_url: wire.html_url,
        })
      })
      .collect();

    Ok(records)
  }

  /// Commits found via both the author and committer search queries,
  /// deduplicated by sha before enrichment so nothing is double-fetched or
  /// double-counted.
  pub fn commits(&self) -> Result<Vec<CommitRecord>> {
    let accept = [("accept", ACCEPT_COMMIT_SEARCH.to_string())];

    let author_q = format!("author:{} author-date:{}", self.cfg.user, self.range());
    let committer_q = format!("committer:{} committer-date:{}", self.cfg.user, self.range());

    let mut raw = self.pages.search("/search/commits", &author_q, &accept)?;
    raw.extend(self.pages.search("/search/commits", &committer_q, &accept)?);

    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<CommitRecord> = Vec::new();

    for item in &raw {
      let wire: CommitItemWire = decode(item);

      let Some(sha) = wire.sha.clone().filter(|s| !s.is_empty()) else {
        continue;
      };
      if !seen.insert(sha.clone()) {
        continue;
      }

      let repo = wire
        .repository
        .as_ref()
        .and_then(|r| r.full_name.clone())
        .or_else(|| wire.html_url.as_deref().and_then(repo_from_commit_url));

      // Unresolvable repo identifier: skip the single item.
      let Some(repo) = repo else {
        continue;
      };

      let record = match self.client.get(&format!("/repos/{}/commits/{}", repo, sha), &[], &[]) {
        Ok(resp) => {
          let d: CommitDetailWire = decode(&resp.body);

          let stats = d.stats.unwrap_or_default();
          let additions = stats.additions.unwrap_or(0);
          let deletions = stats.deletions.unwrap_or(0);
          let total = stats.total.unwrap_or(additions + deletions);

          let meta = d.commit.unwrap_or_default();
          let date = meta.author.and_then(|a| a.date).or_else(|| meta.committer.and_then(|c| c.date));
          let message = meta.message.or_else(|| wire.commit.as_ref().and_then(|c| c.message.clone()));

          CommitRecord {
            sha: d.sha.unwrap_or_else(|| sha.clone()),
            repo: repo.clone(),
            date,
            message,
            html_url: d.html_url.or_else(|| wire.html_url.clone()),
            additions,
            deletions,
            total_changes: total,
            files_changed: d.files.map(|f| f.len() as i64).unwrap_or(0),
            associated_prs: self.pulls_for_commit(&repo, &sha),
            fetch_error: None,
          }
        }
        Err(err) => {
          eprintln!("[github] commit {}@{} detail fetch failed: {:#}", repo, sha, err);

          CommitRecord {
            sha: sha.clone(),
            repo,
            date: None,
            message: wire.commit.as_ref().and_then(|c| c.message.clone()),
            html_url: wire.html_url.clone(),
            additions: 0,
            deletions: 0,
            total_changes: 0,
            files_changed: 0,
            associated_prs: Vec::new(),
            fetch_error: Some(format!("{:#}", err)),
          }
        }
      };

      out.push(record);
      std::thread::sleep(self.cfg.throttle);
    }

    Ok(out)
  }

  /// Reverse commit→PR association. Best-effort: failures yield an empty
  /// list, not a dropped record.
  fn pulls_for_commit(&self, repo: &str, sha: &str) -> Vec<AssociatedPr> {
    let overrides = [("accept", ACCEPT_COMMIT_PULLS.to_string())];
    let path = format!("/repos/{}/commits/{}/pulls", repo, sha);

    match self.pages.list(&path, &[], &overrides) {
      Ok(items) => items
        .iter()
        .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
        .collect(),
      Err(err) => {
        eprintln!("[github] commit {}@{} PR association lookup failed: {:#}", repo, sha, err);
        Vec::new()
      }
    }
  }
}

// --- Tolerant wire shapes ---
// Search/detail payloads parse field-by-field with defaults; a missing or
// oddly typed field never fails the whole item.

fn decode<T: DeserializeOwned + Default>(v: &serde_json::Value) -> T {
  serde_json::from_value(v.clone()).unwrap_or_default()
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchItemWire {
  number: Option<i64>,
  title: Option<String>,
  state: Option<String>,
  created_at: Option<String>,
  updated_at: Option<String>,
  closed_at: Option<String>,
  html_url: Option<String>,
  repository_url: Option<String>,
  labels: Vec<LabelWire>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelWire {
  Named { name: String },
  Bare(String),
  Other(serde_json::Value),
}

impl LabelWire {
  fn name(&self) -> Option<String> {
    match self {
      LabelWire::Named { name } => Some(name.clone()),
      LabelWire::Bare(name) => Some(name.clone()),
      LabelWire::Other(_) => None,
    }
  }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PrDetailWire {
  number: Option<i64>,
  title: Option<String>,
  state: Option<String>,
  created_at: Option<String>,
  merged_at: Option<String>,
  closed_at: Option<String>,
  additions: Option<i64>,
  deletions: Option<i64>,
  changed_files: Option<i64>,
  commits: Option<i64>,
  merge_commit_sha: Option<String>,
  html_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CommitItemWire {
  sha: Option<String>,
  html_url: Option<String>,
  repository: Option<RepoWire>,
  commit: Option<CommitInfoWire>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RepoWire {
  full_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CommitInfoWire {
  message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CommitDetailWire {
  sha: Option<String>,
  html_url: Option<String>,
  stats: Option<StatsWire>,
  files: Option<Vec<serde_json::Value>>,
  commit: Option<CommitMetaWire>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StatsWire {
  additions: Option<i64>,
  deletions: Option<i64>,
  total: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CommitMetaWire {
  author: Option<GitActorWire>,
  committer: Option<GitActorWire>,
  message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GitActorWire {
  date: Option<String>,
}

/// `repository_url` looks like `https://api.github.com/repos/{owner}/{repo}`;
/// take the last two path segments.
fn repo_from_repository_url(url: &str) -> Option<String> {
  let mut parts = url.trim_end_matches('/').rsplit('/');
  let repo = parts.next()?;
  let owner = parts.next()?;

  if owner.is_empty() || repo.is_empty() {
    return None;
  }

  Some(format!("{}/{}", owner, repo))
}

/// Fallback repo resolution from a commit permalink,
/// `https://github.com/{owner}/{repo}/commit/{sha}`.
fn repo_from_commit_url(url: &str) -> Option<String> {
  let rest = url.strip_prefix("https://github.com/")?;
  let mut segments = rest.split('/');
  let owner = segments.next()?;
  let repo = segments.next()?;

  if owner.is_empty() || repo.is_empty() {
    return None;
  }

  Some(format!("{}/{}", owner, repo))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::github::testing::{RoutedTransport, failing, ok};
  use crate::github::{DEFAULT_API_ROOT, GithubClient};
  use std::rc::Rc;

  fn cfg() -> FetchConfig {
    FetchConfig {
      user: "alice".into(),
      start: "2025-01-01".into(),
      end: "2025-06-30".into(),
      throttle: Duration::ZERO,
    }
  }

  fn client_for(transport: Rc<RoutedTransport>) -> GithubClient {
    GithubClient::with_transport(DEFAULT_API_ROOT, None, Box::new(transport), Duration::ZERO)
  }

  fn search_pr_item(repo: &str, number: i64) -> serde_json::Value {
    serde_json::json!({
      "number": number,
      "title": format!("PR {}", number),
      "state": "closed",
      "created_at": "2025-02-01T00:00:00Z",
      "closed_at": "2025-02-03T00:00:00Z",
      "html_url": format!("https://github.com/{}/pull/{}", repo, number),
      "repository_url": format!("https://api.github.com/repos/{}", repo),
      "pull_request": { "url": format!("https://api.github.com/repos/{}/pulls/{}", repo, number) }
    })
  }

  fn empty_search_route(url: &str, _query: &[(&str, String)]) -> Option<crate::github::ApiResponse> {
    url.ends_with("/search/issues").then(|| ok(serde_json::json!({"items": []})))
  }

  #[test]
  fn repo_name_helpers_resolve_and_reject() {
    assert_eq!(
      repo_from_repository_url("https://api.github.com/repos/acme/widget"),
      Some("acme/widget".into())
    );
    assert_eq!(
      repo_from_repository_url("https://api.github.com/repos/acme/widget/"),
      Some("acme/widget".into())
    );

    assert_eq!(
      repo_from_commit_url("https://github.com/acme/widget/commit/abc123"),
      Some("acme/widget".into())
    );
    assert_eq!(repo_from_commit_url("https://gitlab.com/acme/widget/commit/abc"), None);
  }

  #[test]
  fn pull_requests_enrich_from_detail_lookup() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, query| {
          if url.ends_with("/search/issues") {
            let q = query.iter().find(|(k, _)| *k == "q").map(|(_, v)| v.clone()).unwrap_or_default();
            assert_eq!(q, "is:pr author:alice created:2025-01-01..2025-06-30");
            return Some(ok(serde_json::json!({"items": [search_pr_item("acme/widget", 7)]})));
          }
          None
        })
        .route(|url, _| {
          url.ends_with("/repos/acme/widget/pulls/7").then(|| {
            ok(serde_json::json!({
              "number": 7,
              "title": "Add feature",
              "state": "closed",
              "created_at": "2025-02-01T00:00:00Z",
              "merged_at": "2025-02-03T00:00:00Z",
              "closed_at": "2025-02-03T00:00:00Z",
              "additions": 10,
              "deletions": 2,
              "changed_files": 3,
              "commits": 2,
              "merge_commit_sha": "cafe1234",
              "html_url": "https://github.com/acme/widget/pull/7"
            }))
          })
        }),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let prs = fetcher.pull_requests().unwrap();
    assert_eq!(prs.len(), 1);

    let pr = &prs[0];
    assert_eq!(pr.repo, "acme/widget");
    assert_eq!(pr.additions, 10);
    assert_eq!(pr.deletions, 2);
    assert_eq!(pr.changed_files, 3);
    assert_eq!(pr.cycle_time_days, Some(2.0));
    assert!(pr.fetch_error.is_none());
  }

  #[test]
  fn pull_request_detail_failure_degrades_to_partial_record() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, _| {
          url.ends_with("/search/issues").then(|| {
            ok(serde_json::json!({"items": [
              search_pr_item("acme/widget", 1),
              search_pr_item("acme/widget", 2),
            ]}))
          })
        })
        .route(|url, _| url.ends_with("/pulls/1").then(|| failing(500, "boom")))
        .route(|url, _| {
          url.ends_with("/pulls/2").then(|| {
            ok(serde_json::json!({
              "number": 2, "created_at": "2025-02-01T00:00:00Z", "additions": 5, "deletions": 1
            }))
          })
        }),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let prs = fetcher.pull_requests().unwrap();
    assert_eq!(prs.len(), 2, "one failing detail fetch must not abort the batch");

    let degraded = &prs[0];
    assert_eq!(degraded.additions, 0);
    assert!(degraded.fetch_error.as_deref().unwrap().contains("500"));
    // Search-item timestamps still yield a close-based cycle time.
    assert_eq!(degraded.cycle_time_days, Some(2.0));

    assert_eq!(prs[1].additions, 5);
    assert!(prs[1].fetch_error.is_none());
  }

  #[test]
  fn pull_request_without_repo_identifier_is_skipped() {
    let transport = Rc::new(RoutedTransport::new().route(|url, _| {
      url.ends_with("/search/issues").then(|| {
        ok(serde_json::json!({"items": [
          {"number": 3, "title": "no repository_url"}
        ]}))
      })
    }));
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    assert!(fetcher.pull_requests().unwrap().is_empty());
  }

  #[test]
  fn issues_map_labels_deltas_and_incident_flag() {
    let transport = Rc::new(RoutedTransport::new().route(|url, _| {
      url.ends_with("/search/issues").then(|| {
        ok(serde_json::json!({"items": [
          {
            "number": 11,
            "title": "P0 outage in checkout",
            "state": "closed",
            "created_at": "2025-03-01T00:00:00Z",
            "closed_at": "2025-03-02T00:00:00Z",
            "repository_url": "https://api.github.com/repos/acme/widget",
            "labels": []
          },
          {
            "number": 12,
            "title": "fix typo",
            "state": "open",
            "created_at": "2025-03-05T00:00:00Z",
            "closed_at": null,
            "repository_url": "https://api.github.com/repos/acme/widget",
            "labels": [{"name": "docs"}, {"name": "SEV2"}]
          }
        ]}))
      })
    }));
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let issues = fetcher.issues_authored().unwrap();
    assert_eq!(issues.len(), 2);

    assert!(issues[0].is_incident, "title keyword classifies without labels");
    assert_eq!(issues[0].time_to_close_days, Some(1.0));

    assert!(issues[1].is_incident, "label marker classifies regardless of title");
    assert_eq!(issues[1].labels, vec!["docs".to_string(), "SEV2".to_string()]);
    assert_eq!(issues[1].time_to_close_days, None);
  }

  #[test]
  fn commits_dedupe_by_sha_across_both_queries() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, query| {
          if !url.ends_with("/search/commits") {
            return None;
          }
          let q = query.iter().find(|(k, _)| *k == "q").map(|(_, v)| v.clone()).unwrap_or_default();
          let items = if q.starts_with("author:") {
            serde_json::json!([
              {"sha": "aaa", "repository": {"full_name": "acme/widget"}},
              {"sha": "bbb", "repository": {"full_name": "acme/widget"}}
            ])
          } else {
            serde_json::json!([
              {"sha": "bbb", "repository": {"full_name": "acme/widget"}},
              {"sha": "ccc", "repository": {"full_name": "acme/widget"}}
            ])
          };
          Some(ok(serde_json::json!({"items": items})))
        })
        .route(|url, _| {
          if !url.contains("/repos/acme/widget/commits/") {
            return None;
          }
          if url.ends_with("/pulls") {
            return Some(ok(serde_json::json!([])));
          }
          Some(ok(serde_json::json!({
            "stats": {"additions": 4, "deletions": 1, "total": 5},
            "files": [{}, {}],
            "commit": {"author": {"date": "2025-04-01T10:00:00Z"}, "message": "tidy"}
          })))
        }),
    );
    let client = client_for(transport.clone());
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let commits = fetcher.commits().unwrap();
    let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["aaa", "bbb", "ccc"]);

    // One detail fetch per unique sha, never per raw search hit.
    let detail_calls = transport
      .calls
      .borrow()
      .iter()
      .filter(|u| u.contains("/commits/") && !u.ends_with("/pulls"))
      .count();
    assert_eq!(detail_calls, 3);

    assert_eq!(commits[0].additions, 4);
    assert_eq!(commits[0].files_changed, 2);
    assert_eq!(commits[0].total_changes, 5);
  }

  #[test]
  fn commit_repo_falls_back_to_html_url_and_skips_when_unresolvable() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, _| {
          url.ends_with("/search/commits").then(|| {
            ok(serde_json::json!({"items": [
              {"sha": "ddd", "html_url": "https://github.com/acme/widget/commit/ddd"},
              {"sha": "eee"}
            ]}))
          })
        })
        .route(|url, _| {
          if url.ends_with("/pulls") {
            return Some(ok(serde_json::json!([])));
          }
          url.contains("/repos/acme/widget/commits/ddd").then(|| ok(serde_json::json!({"stats": {}})))
        }),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let commits = fetcher.commits().unwrap();
    assert_eq!(commits.len(), 1, "the unresolvable item is skipped silently");
    assert_eq!(commits[0].repo, "acme/widget");
  }

  #[test]
  fn commit_association_failure_yields_empty_list_not_a_drop() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, _| {
          url.ends_with("/search/commits").then(|| {
            ok(serde_json::json!({"items": [
              {"sha": "fff", "repository": {"full_name": "acme/widget"}}
            ]}))
          })
        })
        .route(|url, _| url.ends_with("/commits/fff/pulls").then(|| failing(502, "bad gateway")))
        .route(|url, _| {
          url.ends_with("/commits/fff").then(|| {
            ok(serde_json::json!({
              "stats": {"additions": 1, "deletions": 1},
              "commit": {"committer": {"date": "2025-05-01T00:00:00Z"}}
            }))
          })
        }),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let commits = fetcher.commits().unwrap();
    assert_eq!(commits.len(), 1);
    assert!(commits[0].associated_prs.is_empty());
    assert!(commits[0].fetch_error.is_none());
    assert_eq!(commits[0].total_changes, 2, "total defaults to additions+deletions");
    assert_eq!(commits[0].date.as_deref(), Some("2025-05-01T00:00:00Z"));
  }

  #[test]
  fn commit_detail_failure_degrades_with_error_marker() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(|url, _| {
          url.ends_with("/search/commits").then(|| {
            ok(serde_json::json!({"items": [
              {"sha": "abc", "repository": {"full_name": "acme/widget"}, "commit": {"message": "wip"}}
            ]}))
          })
        })
        .route(|url, _| url.contains("/commits/abc").then(|| failing(500, "boom"))),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let commits = fetcher.commits().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].additions, 0);
    assert_eq!(commits[0].message.as_deref(), Some("wip"));
    assert!(commits[0].fetch_error.is_some());
  }

  #[test]
  fn reviews_stay_slim() {
    let transport = Rc::new(RoutedTransport::new().route(|url, query| {
      if !url.ends_with("/search/issues") {
        return None;
      }
      let q = query.iter().find(|(k, _)| *k == "q").map(|(_, v)| v.clone()).unwrap_or_default();
      assert!(q.starts_with("is:pr reviewed-by:alice updated:"));
      Some(ok(serde_json::json!({"items": [{
        "number": 9,
        "title": "Review me",
        "state": "open",
        "created_at": "2025-02-10T00:00:00Z",
        "updated_at": "2025-02-11T00:00:00Z",
        "html_url": "https://github.com/acme/widget/pull/9",
        "repository_url": "https://api.github.com/repos/acme/widget"
      }]})))
    }));
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let reviews = fetcher.reviews().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].repo.as_deref(), Some("acme/widget"));
    assert_eq!(reviews[0].updated_at.as_deref(), Some("2025-02-11T00:00:00Z"));
  }

  #[test]
  fn collect_runs_all_categories() {
    let transport = Rc::new(
      RoutedTransport::new()
        .route(empty_search_route)
        .route(|url, _| url.ends_with("/search/commits").then(|| ok(serde_json::json!({"items": []})))),
    );
    let client = client_for(transport);
    let cfg = cfg();
    let vocab = IncidentVocabulary::default();
    let fetcher = Fetcher::new(&client, &cfg, &vocab);

    let activity = fetcher.collect().unwrap();
    assert!(activity.pull_requests.is_empty());
    assert!(activity.issues.is_empty());
    assert!(activity.issues_assigned.is_empty());
    assert!(activity.reviews.is_empty());
    assert!(activity.commits.is_empty());
  }
}
