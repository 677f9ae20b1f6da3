// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive repeated GETs across paged endpoints, via page counters (search) or link-header cursors (lists)
// role: client/pagination
// inputs: GithubClient, endpoint path, query string/pairs, optional header overrides
// outputs: Collected raw JSON items across pages, bounded by the search caps
// side_effects: Sleeps the inter-page throttle between requests
// invariants:
// - Every iteration strictly advances (next page number or next cursor URL); never loops forever
// - Stops at an undersized page, a missing "next" relation, or the 10-page/1000-item cap, whichever is first
// errors: Request failures propagate; a non-list body terminates the walk cleanly
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use once_cell::sync::Lazy;

use crate::github::GithubClient;

pub const PER_PAGE: usize = 100;
/// Provider-side search caps: GitHub search serves at most 1000 results.
pub const MAX_SEARCH_PAGES: usize = 10;
pub const MAX_SEARCH_RESULTS: usize = 1000;

/// Courtesy delay between page requests; not a correctness requirement.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(150);

/// Extract `rel` → URL pairs from a `Link` response header, e.g.
/// `<https://api.github.com/x?page=2>; rel="next", <...>; rel="last"`.
pub fn parse_link_header(value: &str) -> HashMap<String, String> {
  static RE_LINK: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r#"<([^>]+)>[^,]*?rel="([^"]+)""#).unwrap());

  RE_LINK
    .captures_iter(value)
    .map(|c| (c[2].to_string(), c[1].to_string()))
    .collect()
}

pub struct Paginator<'a> {
  client: &'a GithubClient,
  throttle: Duration,
}

impl<'a> Paginator<'a> {
  pub fn new(client: &'a GithubClient, throttle: Duration) -> Self {
    Self { client, throttle }
  }

  /// Page-counter strategy for `{"items": [...]}` search endpoints. Keeps
  /// requesting while pages come back full-sized, up to the search caps.
  pub fn search(&self, path: &str, q: &str, overrides: &[(&str, String)]) -> Result<Vec<serde_json::Value>> {
    let mut collected: Vec<serde_json::Value> = Vec::new();
    let mut page = 1usize;

    loop {
      let query = [
        ("q", q.to_string()),
        ("per_page", PER_PAGE.to_string()),
        ("page", page.to_string()),
      ];
      let resp = self.client.get(path, &query, overrides)?;

      let items = resp
        .body
        .get("items")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
      let got = items.len();
      collected.extend(items);

      if got < PER_PAGE || collected.len() >= MAX_SEARCH_RESULTS || page >= MAX_SEARCH_PAGES {
        break;
      }

      page += 1;
      std::thread::sleep(self.throttle);
    }

    Ok(collected)
  }

  /// Link-header cursor strategy for plain-array endpoints: follow the
  /// `rel="next"` URL until it disappears or the caps are reached.
  pub fn list(&self, path: &str, query: &[(&str, String)], overrides: &[(&str, String)]) -> Result<Vec<serde_json::Value>> {
    let mut collected: Vec<serde_json::Value> = Vec::new();
    let mut pages = 0usize;

    let mut first_query: Vec<(&str, String)> = query.to_vec();
    first_query.push(("per_page", PER_PAGE.to_string()));

    let mut next_url: Option<String> = None;

    loop {
      pages += 1;

      // The "next" URL carries its own query string; only the first request
      // sends ours.
      let resp = match &next_url {
        None => self.client.get(path, &first_query, overrides)?,
        Some(url) => self.client.get(url, &[], overrides)?,
      };

      let items = resp.body.as_array().cloned().unwrap_or_default();
      if items.is_empty() {
        break;
      }
      collected.extend(items);

      next_url = resp
        .header("link")
        .map(parse_link_header)
        .and_then(|links| links.get("next").cloned());

      if next_url.is_none() || pages >= MAX_SEARCH_PAGES || collected.len() >= MAX_SEARCH_RESULTS {
        break;
      }

      std::thread::sleep(self.throttle);
    }

    Ok(collected)
  }
}
