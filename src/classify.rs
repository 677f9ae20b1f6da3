// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pure incident classification over an explicit keyword/marker vocabulary
// role: metrics/classifier
// inputs: Issue title and label names; an IncidentVocabulary
// outputs: Boolean incident flag
// invariants:
// - Pure function of its inputs; no hidden state
// - Case-insensitive substring matching on both titles and labels
// errors: None; classification cannot fail
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;

/// Keyword/marker sets that flag an issue as a production incident.
///
/// Matching is substring-based and deliberately recall-biased: a label
/// containing "caps1tone" matches the "s1" marker. That over-matching is
/// inherited behavior and kept on purpose; narrow the vocabulary, not the
/// matcher, if precision becomes a problem.
#[derive(Debug, Clone)]
pub struct IncidentVocabulary {
  pub title_keywords: Vec<String>,
  pub label_markers: Vec<String>,
}

static DEFAULT_VOCABULARY: Lazy<IncidentVocabulary> = Lazy::new(|| IncidentVocabulary {
  title_keywords: ["incident", "outage", "sev", "p1", "p0", "security incident"]
    .iter()
    .map(|s| s.to_string())
    .collect(),
  label_markers: ["incident", "sev", "severity", "p0", "p1", "s1", "s2", "outage", "hotfix"]
    .iter()
    .map(|s| s.to_string())
    .collect(),
});

impl Default for IncidentVocabulary {
  fn default() -> Self {
    DEFAULT_VOCABULARY.clone()
  }
}

/// True when the title or any label name contains one of the vocabulary
/// entries (case-insensitive substring match).
pub fn is_incident(title: &str, labels: &[String], vocab: &IncidentVocabulary) -> bool {
  let title = title.to_lowercase();

  if vocab.title_keywords.iter().any(|k| title.contains(k.as_str())) {
    return true;
  }

  labels.iter().any(|label| {
    let name = label.to_lowercase();
    vocab.label_markers.iter().any(|m| name.contains(m.as_str()))
  })
}
