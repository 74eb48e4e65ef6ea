//! Job orchestrator: one outstanding backend job per instance.
//!
//! Owns the submit-then-poll lifecycle for a single operation kind:
//! submits the job, runs one cooperative poll loop against the status
//! endpoint, publishes observable state over a [`watch`] channel, and
//! tears everything down on cancellation or drop. Multiple orchestrator
//! instances are fully independent -- timers and tokens are per
//! instance, never process-wide.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use copydesk_core::error::CoreError;
use copydesk_core::job::JobId;
use copydesk_core::operation::OperationKind;
use copydesk_core::policy::PollPolicy;
use copydesk_core::poller::{advance, PollOutcome, PollerState};
use copydesk_core::requests::OperationRequest;
use copydesk_core::stage::StageTracker;

use crate::api::{JobApi, JobApiError};

/// Consumer-facing orchestrator state, published on every change.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorState {
    /// No job submitted yet, or explicitly reset.
    Idle,
    /// A job is in flight; `stage_label` names the displayed phase.
    Running {
        stage_index: usize,
        stage_label: &'static str,
    },
    /// The job completed; `result` is the operation-specific payload.
    Succeeded { result: serde_json::Value },
    /// Submission was rejected, the backend reported failure, or the
    /// job never became visible to the status endpoint.
    Failed { message: String },
    /// No terminal status within the polling budget.
    TimedOut { message: String },
    /// The caller cancelled; no further states will be published.
    Cancelled,
}

impl OrchestratorState {
    /// Whether this state ends the current job permanently.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Succeeded { .. }
                | OrchestratorState::Failed { .. }
                | OrchestratorState::TimedOut { .. }
                | OrchestratorState::Cancelled
        )
    }
}

/// Errors returned directly from orchestrator calls.
///
/// Terminal job outcomes are delivered through the state channel, not
/// here; these cover misuse and submission failures.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A previous job has not reached a terminal state yet.
    #[error("A job is already in progress; cancel it or wait for it to finish")]
    Busy,

    /// The request failed client-side validation; nothing was submitted.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The creation call failed. The same message is published as the
    /// `Failed` state.
    #[error("Submission failed: {0}")]
    Submit(String),
}

/// Orchestrates a single outstanding job for one operation kind.
pub struct JobOrchestrator {
    api: Arc<JobApi>,
    operation: OperationKind,
    policy: PollPolicy,
    state_tx: watch::Sender<OrchestratorState>,
    inner: tokio::sync::Mutex<Inner>,
    /// Cancelled when the orchestrator is dropped; every poll loop's
    /// token is a child of this one.
    master: CancellationToken,
}

/// Bookkeeping for the currently live poll loop.
struct Inner {
    poll_cancel: CancellationToken,
}

impl JobOrchestrator {
    /// Create an orchestrator using the operation's poll policy preset.
    pub fn new(api: Arc<JobApi>, operation: OperationKind) -> Self {
        // Presets are validated by the catalog's own tests.
        Self::build(api, operation, operation.poll_policy())
    }

    /// Create an orchestrator with an explicit policy.
    pub fn with_policy(
        api: Arc<JobApi>,
        operation: OperationKind,
        policy: PollPolicy,
    ) -> Result<Self, CoreError> {
        policy.validate()?;
        Ok(Self::build(api, operation, policy))
    }

    fn build(api: Arc<JobApi>, operation: OperationKind, policy: PollPolicy) -> Self {
        let (state_tx, _) = watch::channel(OrchestratorState::Idle);
        let master = CancellationToken::new();
        Self {
            api,
            operation,
            policy,
            state_tx,
            inner: tokio::sync::Mutex::new(Inner {
                poll_cancel: master.child_token(),
            }),
            master,
        }
    }

    /// Subscribe to state changes. The receiver immediately holds the
    /// current state.
    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state_tx.subscribe()
    }

    /// The current state.
    pub fn state(&self) -> OrchestratorState {
        self.state_tx.borrow().clone()
    }

    /// Validate and submit a request, then start polling its job.
    ///
    /// Returns the backend-assigned job id. Refuses with
    /// [`OrchestratorError::Busy`] while a previous job is unresolved;
    /// from a terminal state a new `start` implicitly begins a fresh
    /// job. A failed creation call publishes `Failed` with the
    /// creation error verbatim and never polls.
    pub async fn start<R: OperationRequest>(
        &self,
        request: &R,
    ) -> Result<JobId, OrchestratorError> {
        debug_assert_eq!(R::KIND, self.operation);
        let mut inner = self.inner.lock().await;

        if matches!(&*self.state_tx.borrow(), OrchestratorState::Running { .. }) {
            return Err(OrchestratorError::Busy);
        }

        request.validate().map_err(CoreError::from)?;
        let body = serde_json::to_value(request)
            .map_err(|e| OrchestratorError::Submit(e.to_string()))?;

        // Never more than one live poll loop per instance: retire the
        // previous loop's token before minting the next.
        inner.poll_cancel.cancel();
        let cancel = self.master.child_token();
        inner.poll_cancel = cancel.clone();

        let plan = self.operation.stage_plan();
        self.state_tx.send_replace(OrchestratorState::Running {
            stage_index: 0,
            stage_label: plan.label(0),
        });

        tracing::info!(operation = self.operation.name(), "Submitting job");
        let submitted = match self.api.submit(self.operation, &body).await {
            Ok(response) => response,
            Err(e) => {
                let message = submission_message(e);
                tracing::warn!(
                    operation = self.operation.name(),
                    error = %message,
                    "Job submission failed",
                );
                self.state_tx.send_replace(OrchestratorState::Failed {
                    message: message.clone(),
                });
                return Err(OrchestratorError::Submit(message));
            }
        };

        let job_id = submitted.job_id;
        tracing::info!(
            operation = self.operation.name(),
            job_id = %job_id,
            "Job queued, polling for completion",
        );

        let api = Arc::clone(&self.api);
        let operation = self.operation;
        let policy = self.policy;
        let state_tx = self.state_tx.clone();
        let loop_job_id = job_id.clone();
        tokio::spawn(async move {
            poll_loop(api, operation, policy, loop_job_id, cancel, state_tx).await;
        });

        Ok(job_id)
    }

    /// Stop observing the current job.
    ///
    /// No further states are published; an in-flight status query is
    /// allowed to complete but its result is discarded. Not an error --
    /// cancelling an idle or finished orchestrator does not retract an
    /// already-delivered outcome.
    pub async fn cancel(&self) {
        let inner = self.inner.lock().await;
        inner.poll_cancel.cancel();
        self.state_tx.send_if_modified(|state| {
            if state.is_terminal() {
                false
            } else {
                *state = OrchestratorState::Cancelled;
                true
            }
        });
        tracing::debug!(operation = self.operation.name(), "Orchestrator cancelled");
    }

    /// Return to `Idle` from a terminal state.
    pub async fn reset(&self) -> Result<(), OrchestratorError> {
        let _inner = self.inner.lock().await;
        if matches!(&*self.state_tx.borrow(), OrchestratorState::Running { .. }) {
            return Err(OrchestratorError::Busy);
        }
        self.state_tx.send_replace(OrchestratorState::Idle);
        Ok(())
    }
}

impl Drop for JobOrchestrator {
    fn drop(&mut self) {
        // Unmount guard: dropping the owner stops all polling.
        self.master.cancel();
    }
}

/// One cooperative poll loop: strictly sequential status queries at a
/// fixed cadence, cancellation checked before each tick fires and
/// before acting on a tick's result.
async fn poll_loop(
    api: Arc<JobApi>,
    operation: OperationKind,
    policy: PollPolicy,
    job_id: JobId,
    cancel: CancellationToken,
    state_tx: watch::Sender<OrchestratorState>,
) {
    let mut tracker = StageTracker::new(operation.stage_plan());
    let mut state = PollerState::Submitted {
        job_id: job_id.clone(),
    };

    // The backend needs a moment to make the job queryable.
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(policy.initial_delay) => {}
    }

    loop {
        let fetched = api.fetch_status(operation, &job_id).await;

        // A cancelled orchestrator lets the in-flight call finish but
        // discards its result.
        if cancel.is_cancelled() {
            return;
        }

        let outcome = classify(operation, &job_id, fetched);
        if let PollOutcome::Snapshot(snapshot) = &outcome {
            if !snapshot.status.is_terminal() {
                tracker.observe(snapshot.stage);
            }
        }

        state = advance(state, outcome, &policy);
        match &state {
            PollerState::Polling {
                ticks_used,
                consecutive_misses,
                ..
            } => {
                tracing::debug!(
                    operation = operation.name(),
                    job_id = %job_id,
                    tick = ticks_used,
                    misses = consecutive_misses,
                    stage = tracker.label(),
                    "Job still in progress",
                );
                publish(
                    &cancel,
                    &state_tx,
                    OrchestratorState::Running {
                        stage_index: tracker.index(),
                        stage_label: tracker.label(),
                    },
                );
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(policy.poll_interval) => {}
                }
            }
            PollerState::Completed { result } => {
                tracker.complete();
                tracing::info!(
                    operation = operation.name(),
                    job_id = %job_id,
                    "Job completed",
                );
                publish(
                    &cancel,
                    &state_tx,
                    OrchestratorState::Succeeded {
                        result: result.clone(),
                    },
                );
                return;
            }
            PollerState::Failed { message } => {
                tracing::warn!(
                    operation = operation.name(),
                    job_id = %job_id,
                    error = %message,
                    "Job failed",
                );
                publish(
                    &cancel,
                    &state_tx,
                    OrchestratorState::Failed {
                        message: message.clone(),
                    },
                );
                return;
            }
            PollerState::TimedOut { message } => {
                tracing::warn!(
                    operation = operation.name(),
                    job_id = %job_id,
                    "Job timed out",
                );
                publish(
                    &cancel,
                    &state_tx,
                    OrchestratorState::TimedOut {
                        message: message.clone(),
                    },
                );
                return;
            }
            // Submitted/Idle/Cancelled cannot come out of `advance`
            // once polling has begun.
            _ => return,
        }
    }
}

/// Classify one status-query result into a poll outcome.
///
/// 404 and transport errors both count as transient misses -- they are
/// logged, never surfaced directly, and self-heal in the common case.
fn classify(
    operation: OperationKind,
    job_id: &str,
    fetched: Result<copydesk_core::job::JobSnapshot, JobApiError>,
) -> PollOutcome {
    match fetched {
        Ok(snapshot) => PollOutcome::Snapshot(snapshot),
        Err(JobApiError::JobNotFound { .. }) => {
            tracing::debug!(
                operation = operation.name(),
                job_id = %job_id,
                "Job not visible to the status endpoint yet",
            );
            PollOutcome::TransientMiss
        }
        Err(e) => {
            tracing::warn!(
                operation = operation.name(),
                job_id = %job_id,
                error = %e,
                "Status query failed",
            );
            PollOutcome::TransientMiss
        }
    }
}

/// Publish a state unless the loop was cancelled or a terminal state
/// has already been delivered. Runs under the watch channel's lock, so
/// it cannot race a concurrent `cancel()`.
fn publish(
    cancel: &CancellationToken,
    state_tx: &watch::Sender<OrchestratorState>,
    next: OrchestratorState,
) {
    state_tx.send_if_modified(|current| {
        if cancel.is_cancelled() || current.is_terminal() {
            return false;
        }
        *current = next;
        true
    });
}

/// The message surfaced when the creation call fails: the backend's
/// validation message verbatim when there is one, the transport error
/// otherwise.
fn submission_message(error: JobApiError) -> String {
    match error {
        JobApiError::Api { message, .. } => message,
        other => other.to_string(),
    }
}
