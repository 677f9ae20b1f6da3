// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serialize the finished report to pretty JSON on disk
// role: output/render
// inputs: AggregateReport, destination path
// outputs: One pretty-printed JSON file; returns the path written
// side_effects: Creates missing parent directories; the write is the last step of a run
// errors: Serialization and filesystem failures surface with the destination path attached
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::AggregateReport;

/// Write the report as pretty JSON. Parent directories are created on
/// demand; the path is returned for the final status line.
pub fn write_report(report: &AggregateReport, out: &Path) -> Result<String> {
  if let Some(parent) = out.parent() {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
  }

  let mut bytes = serde_json::to_vec_pretty(report).context("serializing report")?;
  bytes.push(b'\n');

  fs::write(out, bytes).with_context(|| format!("writing {}", out.display()))?;

  Ok(out.display().to_string())
}
