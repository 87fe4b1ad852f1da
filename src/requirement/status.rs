//! Requirement outcome types and the orchestration report.
//!
//! Failure is represented in data, not control flow: every requirement run
//! produces a [`RequirementResult`], the ordered collection of which is the
//! [`OrchestrationReport`], the single source of truth for a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// How a single requirement ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Tool present (or acquired) and meets the version constraint.
    Satisfied,
    /// Probing and acquisition both failed.
    Failed,
    /// Never attempted: skipped by flag, or an earlier requirement failed
    /// under fail-fast.
    Skipped,
}

/// The result of one requirement's `ensure()`.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementResult {
    pub name: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequirementResult {
    pub fn satisfied(name: impl Into<String>, resolved_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Satisfied,
            resolved_path: Some(resolved_path),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: &crate::error::KindlingError) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Failed,
            resolved_path: None,
            error: Some(error.to_string()),
        }
    }

    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Skipped,
            resolved_path: None,
            error: None,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.outcome == Outcome::Satisfied
    }
}

/// Ordered record of each requirement's outcome for one run.
///
/// Results appear in declaration order regardless of how execution was
/// scheduled.
#[derive(Debug, Serialize)]
pub struct OrchestrationReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<RequirementResult>,
}

impl OrchestrationReport {
    pub fn new(results: Vec<RequirementResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            results,
        }
    }

    /// Whether any requirement genuinely failed (skips don't count).
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.outcome == Outcome::Failed)
    }

    /// Process exit code: non-zero iff something failed.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_failures())
    }

    /// Name/path pairs for every satisfied requirement, in order.
    pub fn satisfied_entries(&self) -> Vec<(String, PathBuf)> {
        self.results
            .iter()
            .filter(|r| r.is_satisfied())
            .filter_map(|r| Some((r.name.clone(), r.resolved_path.clone()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KindlingError;

    #[test]
    fn satisfied_result_carries_path() {
        let result = RequirementResult::satisfied("build-tool", PathBuf::from("/usr/bin/cmake"));
        assert!(result.is_satisfied());
        assert_eq!(result.resolved_path, Some(PathBuf::from("/usr/bin/cmake")));
        assert!(result.error.is_none());
    }

    #[test]
    fn failed_result_carries_error_text() {
        let err = KindlingError::Network {
            url: "https://example.com".into(),
            message: "timed out".into(),
        };
        let result = RequirementResult::failed("graphics-sdk", &err);
        assert_eq!(result.outcome, Outcome::Failed);
        assert!(result.error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn skipped_is_distinct_from_failed() {
        let result = RequirementResult::skipped("physics-sdk");
        assert_eq!(result.outcome, Outcome::Skipped);
        assert!(!result.is_satisfied());
        assert!(result.error.is_none());
    }

    #[test]
    fn report_without_failures_exits_zero() {
        let report = OrchestrationReport::new(vec![
            RequirementResult::satisfied("a", PathBuf::from("/a")),
            RequirementResult::skipped("b"),
        ]);
        assert!(!report.has_failures());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn report_with_failure_exits_nonzero() {
        let err = KindlingError::UnsupportedPlatform { os: "plan9".into() };
        let report = OrchestrationReport::new(vec![
            RequirementResult::satisfied("a", PathBuf::from("/a")),
            RequirementResult::failed("b", &err),
        ]);
        assert!(report.has_failures());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn satisfied_entries_preserve_order() {
        let err = KindlingError::UnsupportedPlatform { os: "plan9".into() };
        let report = OrchestrationReport::new(vec![
            RequirementResult::satisfied("first", PathBuf::from("/1")),
            RequirementResult::failed("middle", &err),
            RequirementResult::satisfied("last", PathBuf::from("/2")),
        ]);

        let entries = report.satisfied_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "first");
        assert_eq!(entries[1].0, "last");
    }

    #[test]
    fn report_serializes_outcomes_lowercase() {
        let report = OrchestrationReport::new(vec![RequirementResult::skipped("x")]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"skipped\""));
    }
}
