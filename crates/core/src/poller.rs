//! Poller state machine.
//!
//! Every transition is a pure function of (current state, poll outcome,
//! policy), so the orchestration guarantees -- no polls after a terminal
//! state, miss-budget exhaustion, tick-budget timeout -- are testable
//! without timers or network I/O. The I/O shell in `copydesk-client`
//! owns the loop that produces one [`PollOutcome`] per tick and feeds it
//! through [`advance`].

use crate::job::{JobId, JobSnapshot, JobStatus};
use crate::policy::PollPolicy;

/// Message used when the consecutive-miss budget is exhausted: the job
/// was likely never created, not merely slow.
pub const MISS_BUDGET_MESSAGE: &str =
    "The job could not be found on the server. Check your connection and try again.";

/// Message used when the tick budget is exhausted. Kept distinct from
/// backend-reported failures so callers can tell the two apart.
pub const TIMEOUT_MESSAGE: &str = "The operation is taking too long. Please try again later.";

/// Fallback for a `failed` status with no error body.
pub const GENERIC_FAILURE_MESSAGE: &str = "The operation failed.";

/// Classified result of a single status query.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The status endpoint returned a parseable job record.
    Snapshot(JobSnapshot),
    /// The job id was not visible to the status endpoint (404) or the
    /// query failed in transport. Both count against the same miss
    /// budget.
    TransientMiss,
}

/// Poller lifecycle state.
///
/// `Completed`, `Failed`, `TimedOut`, and `Cancelled` are terminal and
/// absorb all further outcomes. `Idle` is the initial state and is
/// reachable again only by explicit reset.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerState {
    /// No job submitted yet, or explicitly reset.
    Idle,
    /// Submission succeeded; first status query not yet issued.
    Submitted { job_id: JobId },
    /// Actively polling.
    Polling {
        job_id: JobId,
        /// Status queries issued so far for this job.
        ticks_used: u32,
        /// Consecutive misses since the last successful poll.
        consecutive_misses: u32,
    },
    /// Backend reported completion; `result` is the operation payload.
    Completed { result: serde_json::Value },
    /// Backend reported failure, the submission failed, or the miss
    /// budget was exhausted.
    Failed { message: String },
    /// Tick budget exhausted without a terminal status.
    TimedOut { message: String },
    /// The caller discarded interest; nothing further is delivered.
    Cancelled,
}

impl PollerState {
    /// Whether this state ends polling permanently.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerState::Completed { .. }
                | PollerState::Failed { .. }
                | PollerState::TimedOut { .. }
                | PollerState::Cancelled
        )
    }

    /// The job id polling is (or would be) running against, if any.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            PollerState::Submitted { job_id } | PollerState::Polling { job_id, .. } => {
                Some(job_id)
            }
            _ => None,
        }
    }
}

/// Apply one poll outcome to the current state.
///
/// Terminal states and `Idle` are returned unchanged -- a late-classified
/// outcome for a finished job must not resurrect it.
pub fn advance(state: PollerState, outcome: PollOutcome, policy: &PollPolicy) -> PollerState {
    let (job_id, ticks_used, consecutive_misses) = match state {
        PollerState::Submitted { job_id } => (job_id, 0, 0),
        PollerState::Polling {
            job_id,
            ticks_used,
            consecutive_misses,
        } => (job_id, ticks_used, consecutive_misses),
        other => return other,
    };

    let tick = ticks_used + 1;

    match outcome {
        PollOutcome::Snapshot(snapshot) => match snapshot.status {
            JobStatus::Completed => PollerState::Completed {
                result: snapshot.result.unwrap_or(serde_json::Value::Null),
            },
            JobStatus::Failed => PollerState::Failed {
                message: snapshot
                    .error
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            },
            JobStatus::Queued | JobStatus::Processing => {
                if tick >= policy.max_ticks {
                    PollerState::TimedOut {
                        message: TIMEOUT_MESSAGE.to_string(),
                    }
                } else {
                    PollerState::Polling {
                        job_id,
                        ticks_used: tick,
                        consecutive_misses: 0,
                    }
                }
            }
        },
        PollOutcome::TransientMiss => {
            let misses = consecutive_misses + 1;
            if misses >= policy.miss_threshold {
                PollerState::Failed {
                    message: MISS_BUDGET_MESSAGE.to_string(),
                }
            } else if tick >= policy.max_ticks {
                PollerState::TimedOut {
                    message: TIMEOUT_MESSAGE.to_string(),
                }
            } else {
                PollerState::Polling {
                    job_id,
                    ticks_used: tick,
                    consecutive_misses: misses,
                }
            }
        }
    }
}

/// Cancel from any non-terminal state. Terminal states are unchanged --
/// an outcome already delivered is never retracted.
pub fn cancel(state: PollerState) -> PollerState {
    if state.is_terminal() {
        state
    } else {
        PollerState::Cancelled
    }
}
