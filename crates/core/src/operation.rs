//! Catalog of the long-running backend operations.
//!
//! Five operations share the submit/poll orchestration shape. Each kind
//! carries its endpoint paths, its poll policy, and its stage plan, so
//! call sites differ only in the [`OperationKind`] they pass in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::PollPolicy;
use crate::stage::StagePlan;

/// A long-running operation kind understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ArticleGeneration,
    Rewrite,
    CompetitorAnalysis,
    SeoAudit,
    KeywordAnalytics,
}

/// All operation kinds, for iteration in tests and tooling.
pub const ALL_OPERATIONS: &[OperationKind] = &[
    OperationKind::ArticleGeneration,
    OperationKind::Rewrite,
    OperationKind::CompetitorAnalysis,
    OperationKind::SeoAudit,
    OperationKind::KeywordAnalytics,
];

const ARTICLE_STAGES: StagePlan = StagePlan::new(&[
    "analyzing",
    "structuring",
    "writing",
    "optimizing",
    "finalizing",
]);
const REWRITE_STAGES: StagePlan = StagePlan::new(&["rewriting", "finalizing"]);
const COMPETITOR_STAGES: StagePlan =
    StagePlan::new(&["fetching", "comparing", "scoring", "finalizing"]);
const AUDIT_STAGES: StagePlan = StagePlan::new(&["fetching", "scanning", "scoring", "finalizing"]);
const KEYWORD_STAGES: StagePlan = StagePlan::new(&["collecting", "analyzing", "finalizing"]);

impl OperationKind {
    /// Short name used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::ArticleGeneration => "article_generation",
            OperationKind::Rewrite => "rewrite",
            OperationKind::CompetitorAnalysis => "competitor_analysis",
            OperationKind::SeoAudit => "seo_audit",
            OperationKind::KeywordAnalytics => "keyword_analytics",
        }
    }

    /// Path of the creation endpoint (`POST`).
    pub fn submit_path(self) -> &'static str {
        match self {
            OperationKind::ArticleGeneration => "/api/articles/generate",
            OperationKind::Rewrite => "/api/rewrite",
            OperationKind::CompetitorAnalysis => "/api/competition/analyze",
            OperationKind::SeoAudit => "/api/seo-audit",
            OperationKind::KeywordAnalytics => "/api/keyword-analytics/analyze",
        }
    }

    /// Path of the status endpoint (`GET`) for a given job id.
    ///
    /// Status lives under the operation's base segment, not under the
    /// action verb -- `/api/competition/analyze` is polled at
    /// `/api/competition/status/{id}`.
    pub fn status_path(self, job_id: &str) -> String {
        match self {
            OperationKind::ArticleGeneration => {
                format!("/api/articles/generate/status/{job_id}")
            }
            OperationKind::Rewrite => format!("/api/rewrite/status/{job_id}"),
            OperationKind::CompetitorAnalysis => format!("/api/competition/status/{job_id}"),
            OperationKind::SeoAudit => format!("/api/seo-audit/status/{job_id}"),
            OperationKind::KeywordAnalytics => {
                format!("/api/keyword-analytics/status/{job_id}")
            }
        }
    }

    /// Poll policy preset for this operation.
    ///
    /// Intervals and budgets reflect each operation's expected duration:
    /// rewrites finish in seconds, article generation can take minutes.
    pub fn poll_policy(self) -> PollPolicy {
        match self {
            OperationKind::ArticleGeneration => PollPolicy {
                initial_delay: Duration::from_secs(2),
                poll_interval: Duration::from_secs(2),
                miss_threshold: 3,
                max_ticks: 90,
            },
            OperationKind::Rewrite => PollPolicy {
                initial_delay: Duration::from_millis(1500),
                poll_interval: Duration::from_millis(1500),
                miss_threshold: 3,
                max_ticks: 40,
            },
            OperationKind::CompetitorAnalysis => PollPolicy {
                initial_delay: Duration::from_secs(2),
                poll_interval: Duration::from_secs(2),
                miss_threshold: 3,
                max_ticks: 60,
            },
            OperationKind::SeoAudit => PollPolicy {
                initial_delay: Duration::from_secs(2),
                poll_interval: Duration::from_secs(2),
                miss_threshold: 3,
                max_ticks: 60,
            },
            OperationKind::KeywordAnalytics => PollPolicy {
                initial_delay: Duration::from_secs(2),
                poll_interval: Duration::from_secs(2),
                miss_threshold: 3,
                max_ticks: 45,
            },
        }
    }

    /// Stage plan used for progress display.
    pub fn stage_plan(self) -> StagePlan {
        match self {
            OperationKind::ArticleGeneration => ARTICLE_STAGES,
            OperationKind::Rewrite => REWRITE_STAGES,
            OperationKind::CompetitorAnalysis => COMPETITOR_STAGES,
            OperationKind::SeoAudit => AUDIT_STAGES,
            OperationKind::KeywordAnalytics => KEYWORD_STAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_paths_use_operation_base_segment() {
        assert_eq!(
            OperationKind::CompetitorAnalysis.status_path("abc"),
            "/api/competition/status/abc"
        );
        assert_eq!(
            OperationKind::KeywordAnalytics.status_path("abc"),
            "/api/keyword-analytics/status/abc"
        );
        assert_eq!(
            OperationKind::ArticleGeneration.status_path("abc"),
            "/api/articles/generate/status/abc"
        );
    }

    #[test]
    fn all_policies_are_valid() {
        for op in ALL_OPERATIONS {
            op.poll_policy()
                .validate()
                .unwrap_or_else(|e| panic!("{}: {e}", op.name()));
        }
    }

    #[test]
    fn policies_bound_total_wait_to_minutes() {
        for op in ALL_OPERATIONS {
            let policy = op.poll_policy();
            let worst = policy.initial_delay + policy.poll_interval * policy.max_ticks;
            assert!(
                worst <= Duration::from_secs(5 * 60),
                "{} would wait {worst:?}",
                op.name()
            );
            assert!(worst >= Duration::from_secs(30));
        }
    }

    #[test]
    fn every_plan_ends_in_finalizing() {
        for op in ALL_OPERATIONS {
            let plan = op.stage_plan();
            assert_eq!(plan.label(plan.final_index()), "finalizing");
        }
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OperationKind::SeoAudit).unwrap(),
            "\"seo_audit\""
        );
    }
}
