//! Smoke-test binary: run one SEO audit against a real backend and log
//! every state transition until the job resolves.
//!
//! Usage: `copydesk-probe <url>` with `COPYDESK_BASE_URL` (and
//! optionally `COPYDESK_AUTH_TOKEN`) in the environment.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use copydesk_client::{ClientConfig, JobApi, JobOrchestrator, OrchestratorState};
use copydesk_core::operation::OperationKind;
use copydesk_core::requests::SeoAuditRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copydesk_probe=info,copydesk_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".into());

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, audit_url = %url, "Starting audit probe");

    let api = Arc::new(JobApi::new(&config)?);
    api.health().await?;
    tracing::info!("Backend is healthy");

    let orchestrator = JobOrchestrator::new(api, OperationKind::SeoAudit);
    let mut states = orchestrator.subscribe();

    let job_id = orchestrator.start(&SeoAuditRequest { url }).await?;
    tracing::info!(job_id = %job_id, "Audit job queued");

    loop {
        let current = states.borrow_and_update().clone();
        match current {
            OrchestratorState::Running { stage_label, .. } => {
                tracing::info!(stage = stage_label, "Audit in progress");
            }
            OrchestratorState::Succeeded { result } => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            OrchestratorState::Failed { message } => {
                anyhow::bail!("audit failed: {message}");
            }
            OrchestratorState::TimedOut { message } => {
                anyhow::bail!("audit timed out: {message}");
            }
            OrchestratorState::Cancelled => {
                anyhow::bail!("audit cancelled");
            }
            OrchestratorState::Idle => {}
        }
        states.changed().await?;
    }
}
