// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Rate-limited authenticated GET client for the GitHub REST API
// role: client/http
// inputs: API paths or absolute URLs, query pairs, per-call header overrides; token from config
// outputs: Parsed JSON bodies plus lowercased response headers
// side_effects: Network calls; blocks the calling thread during rate-limit backoff (clamped)
// invariants:
// - Rate-limit rejections are retried exactly once, after sleeping until the reset hint (clamped to max_backoff)
// - Any other non-2xx status propagates immediately; no retry, no backoff
// - Per-call header overrides replace defaults of the same name
// errors: Transport and HTTP failures surface as anyhow errors with the URL and status
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;

pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

const ACCEPT_DEFAULT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "github-contrib-report";

/// Maximum time to block waiting for a rate-limit window to reset.
pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// One HTTP response, decoupled from the transport that produced it.
/// Header names are lowercased; non-JSON bodies parse to `Value::Null`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: serde_json::Value,
}

impl ApiResponse {
  pub fn header(&self, name: &str) -> Option<&str> {
    let name = name.to_ascii_lowercase();
    self.headers.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

// --- Trait seam for the HTTP layer ---
// Lets pagination and pipeline tests run against canned responses.
pub trait Transport {
  fn get(&self, url: &str, query: &[(&str, String)], headers: &[(&str, String)]) -> Result<ApiResponse>;
}

pub struct HttpTransport {
  agent: ureq::Agent,
}

impl HttpTransport {
  pub fn new() -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .timeout_global(Some(Duration::from_secs(30)))
      .build()
      .into();

    Self { agent }
  }
}

impl Transport for HttpTransport {
  fn get(&self, url: &str, query: &[(&str, String)], headers: &[(&str, String)]) -> Result<ApiResponse> {
    let mut req = self.agent.get(url);

    for (k, v) in query {
      req = req.query(*k, v);
    }

    for (k, v) in headers {
      req = req.header(*k, v);
    }

    let mut resp = req.call().with_context(|| format!("GET {}", url))?;
    let status = resp.status().as_u16();

    let response_headers: Vec<(String, String)> = resp
      .headers()
      .iter()
      .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.as_str().to_ascii_lowercase(), s.to_string())))
      .collect();

    let text = resp
      .body_mut()
      .read_to_string()
      .with_context(|| format!("reading body of GET {}", url))?;
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

    Ok(ApiResponse {
      status,
      headers: response_headers,
      body,
    })
  }
}

/// Seconds to sleep before the single rate-limit retry: until the reset
/// instant plus a 2s grace, never negative, clamped to `max_wait`.
pub fn rate_limit_backoff(reset_epoch: i64, now_epoch: i64, max_wait: Duration) -> Duration {
  let wait = (reset_epoch - now_epoch + 2).max(0) as u64;

  Duration::from_secs(wait).min(max_wait)
}

fn looks_rate_limited(resp: &ApiResponse) -> bool {
  if resp.status == 429 {
    return true;
  }

  if resp.status != 403 {
    return false;
  }

  let exhausted = resp.header("x-ratelimit-remaining").map(|v| v.trim() == "0").unwrap_or(false);
  let message_says_so = resp.body.to_string().to_lowercase().contains("rate limit");

  exhausted || message_says_so
}

pub struct GithubClient {
  transport: Box<dyn Transport>,
  api_root: String,
  token: Option<String>,
  max_backoff: Duration,
}

impl GithubClient {
  pub fn new(api_root: &str, token: Option<String>) -> Self {
    Self::with_transport(api_root, token, Box::new(HttpTransport::new()), MAX_RATE_LIMIT_WAIT)
  }

  pub fn with_transport(
    api_root: &str,
    token: Option<String>,
    transport: Box<dyn Transport>,
    max_backoff: Duration,
  ) -> Self {
    Self {
      transport,
      api_root: api_root.trim_end_matches('/').to_string(),
      token,
      max_backoff,
    }
  }

  fn base_headers(&self) -> Vec<(&'static str, String)> {
    let mut headers = vec![("accept", ACCEPT_DEFAULT.to_string()), ("user-agent", USER_AGENT.to_string())];

    if let Some(token) = &self.token {
      headers.push(("authorization", format!("Bearer {}", token)));
    }

    headers
  }

  fn resolve_url(&self, path_or_url: &str) -> String {
    if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
      return path_or_url.to_string();
    }

    format!("{}{}", self.api_root, path_or_url)
  }

  /// Authenticated GET with the single-retry rate-limit policy. `overrides`
  /// replace default headers of the same name (some endpoints need preview
  /// Accept values).
  pub fn get(&self, path_or_url: &str, query: &[(&str, String)], overrides: &[(&str, String)]) -> Result<ApiResponse> {
    let url = self.resolve_url(path_or_url);

    let mut headers: Vec<(&str, String)> = self.base_headers();
    for (name, value) in overrides {
      headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
      headers.push((*name, value.clone()));
    }

    let resp = self.transport.get(&url, query, &headers)?;

    if resp.is_success() {
      return Ok(resp);
    }

    if looks_rate_limited(&resp) {
      if let Some(reset) = resp.header("x-ratelimit-reset").and_then(|v| v.trim().parse::<i64>().ok()) {
        let wait = rate_limit_backoff(reset, Utc::now().timestamp(), self.max_backoff);
        std::thread::sleep(wait);

        let retried = self.transport.get(&url, query, &headers)?;

        if retried.is_success() {
          return Ok(retried);
        }

        bail!("GET {} failed after rate-limit retry: HTTP {}", url, retried.status);
      }
    }

    bail!("GET {} failed: HTTP {} {}", url, resp.status, snippet(&resp.body))
  }
}

fn snippet(body: &serde_json::Value) -> String {
  let text = body
    .get("message")
    .and_then(|m| m.as_str())
    .map(|s| s.to_string())
    .unwrap_or_else(|| body.to_string());

  text.chars().take(200).collect()
}
