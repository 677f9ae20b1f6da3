// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: CLI surface and normalization into one explicit EffectiveConfig
// role: cli/config
// inputs: argv via clap; GITHUB_TOKEN / GH_TOKEN env vars
// outputs: EffectiveConfig carrying user, window, output path, throttle, api root, token
// invariants:
// - --start/--end come as a pair or not at all; the default window is Jan 1..Jun 30 of the current UTC year
// - The token is read here once and carried in the config; nothing deeper touches the environment
// errors: Invalid window selections fail normalization with a usage-style message
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::github::DEFAULT_API_ROOT;

#[derive(Parser, Debug)]
#[command(
    name = "github-contrib-report",
    version,
    about = "Summarize a GitHub user's PRs, issues, reviews, and commits as a JSON metrics report",
    long_about = None
)]
pub struct Cli {
  /// GitHub login to report on
  #[arg(long)]
  pub user: String,

  /// Window start, YYYY-MM-DD (inclusive); must be paired with --end
  #[arg(long, alias = "since")]
  pub start: Option<String>,

  /// Window end, YYYY-MM-DD (inclusive); must be paired with --start
  #[arg(long, alias = "until")]
  pub end: Option<String>,

  /// Report file path; parent directories are created as needed
  #[arg(long)]
  pub out: PathBuf,

  /// Delay between paged/detail requests, in milliseconds
  #[arg(long, default_value_t = 150)]
  pub throttle_ms: u64,

  /// API base URL override (hidden; tests only)
  #[arg(long, hide = true, default_value = DEFAULT_API_ROOT)]
  pub api_root: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub user: String,
  pub start: String, // YYYY-MM-DD, inclusive
  pub end: String,
  pub out: PathBuf,
  pub throttle_ms: u64,
  pub api_root: String,
  pub token: Option<String>,
}

impl EffectiveConfig {
  pub fn throttle(&self) -> Duration {
    Duration::from_millis(self.throttle_ms)
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.user.trim().is_empty() {
    bail!("--user must not be empty");
  }

  // Validate window selection
  let (start, end) = match (&cli.start, &cli.end) {
    (Some(s), Some(e)) => {
      let start = parse_date(s)?;
      let end = parse_date(e)?;
      if start > end {
        bail!("--start {} is after --end {}", s, e);
      }
      (s.clone(), e.clone())
    }
    (None, None) => default_window(Utc::now().year()),
    _ => bail!("Provide both --start and --end, or neither"),
  };

  Ok(EffectiveConfig {
    user: cli.user,
    start,
    end,
    out: cli.out,
    throttle_ms: cli.throttle_ms,
    api_root: cli.api_root,
    token: token_from_env(),
  })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
  match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    Ok(d) => Ok(d),
    Err(_) => bail!("invalid date {:?}; expected YYYY-MM-DD", s),
  }
}

/// First half of the given year; the window used when none is requested.
fn default_window(year: i32) -> (String, String) {
  (format!("{year}-01-01"), format!("{year}-06-30"))
}

/// GITHUB_TOKEN, then GH_TOKEN; whitespace-only values count as absent.
/// Unauthenticated runs work, just with much tighter rate limits.
fn token_from_env() -> Option<String> {
  ["GITHUB_TOKEN", "GH_TOKEN"]
    .iter()
    .filter_map(|name| std::env::var(name).ok())
    .map(|v| v.trim().to_string())
    .find(|v| !v.is_empty())
}
