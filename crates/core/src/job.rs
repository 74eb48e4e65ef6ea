//! Job status model: the minimal record shape exchanged with the backend.
//!
//! A job is one backend-tracked long-running operation identified by an
//! opaque id. The status endpoint returns a [`JobSnapshot`] per poll;
//! everything else about the job (inputs, owner, timing) stays on the
//! backend side.

use serde::{Deserialize, Serialize};

/// Opaque job identifier assigned by the backend at submission time.
pub type JobId = String;

/// Backend-reported execution status.
///
/// The backend may never emit `queued` explicitly; absence of a terminal
/// status is treated as "in progress" either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this status ends polling permanently.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One response from `GET /<operation>/status/{job_id}`.
///
/// `result` is only meaningful when `status == completed` and is opaque
/// to the orchestrator; `error` only when `status == failed`. `stage` is
/// a coarse display-only progress index and is never authoritative for
/// completion.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub stage: Option<u32>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::from_str::<JobStatus>("\"completed\"").unwrap(),
            JobStatus::Completed
        );
        assert_eq!(
            serde_json::from_str::<JobStatus>("\"queued\"").unwrap(),
            JobStatus::Queued
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn snapshot_parses_minimal_body() {
        let snap: JobSnapshot = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(snap.status, JobStatus::Processing);
        assert_eq!(snap.stage, None);
        assert!(snap.result.is_none());
        assert!(snap.error.is_none());
    }

    #[test]
    fn snapshot_parses_completed_with_result() {
        let snap: JobSnapshot =
            serde_json::from_str(r#"{"status":"completed","result":{"id":"art-1"}}"#).unwrap();
        assert_eq!(snap.status, JobStatus::Completed);
        assert_eq!(snap.result.unwrap()["id"], "art-1");
    }
}
