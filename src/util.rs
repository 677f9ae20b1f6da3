// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Time parsing/delta helpers shared by metrics, plus man page rendering
// role: utilities/helpers
// inputs: RFC3339 timestamp strings; clap CommandFactory
// outputs: Parsed UTC instants, day deltas rounded to 2 decimals, troff man page text
// invariants:
// - days_between is None unless both endpoints parse; never clamped to zero
// - round2 is plain half-away-from-zero rounding at 2 decimal places
// errors: Parse failures yield None; man rendering bubbles IO errors
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use clap::CommandFactory;

/// Parse an RFC3339 timestamp (the shape GitHub emits, e.g. `2025-02-01T00:00:00Z`)
/// into a UTC instant. Returns None on any parse failure.
pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

pub fn round2(x: f64) -> f64 {
  (x * 100.0).round() / 100.0
}

/// Days from `start` to `end`, rounded to 2 decimals. None when either
/// timestamp is absent or unparseable.
pub fn days_between(start: Option<&str>, end: Option<&str>) -> Option<f64> {
  let s = parse_rfc3339(start?)?;
  let e = parse_rfc3339(end?)?;
  let seconds = (e - s).num_seconds() as f64;

  Some(round2(seconds / 86_400.0))
}

/// Arithmetic mean of the given deltas, rounded to 2 decimals. None for an
/// empty slice; callers filter out missing deltas before calling.
pub fn mean_rounded(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }

  Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
