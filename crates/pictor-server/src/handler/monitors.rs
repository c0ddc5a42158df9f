//! Health monitoring handlers.

use aide::axum::ApiRouter;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pictor_nodes::InteractiveContext;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::{EventHub, ServiceState};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "pictor_server::handler::monitors";

/// Liveness snapshot of the interactive subsystem.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Whether the subsystem is serving.
    pub is_healthy: bool,
    /// Rendezvous currently in flight.
    pub active_rendezvous: usize,
    /// Browser sessions attached to the event feed.
    pub event_subscribers: usize,
    /// When this snapshot was taken.
    pub updated_at: jiff::Timestamp,
}

/// Reports subsystem health.
#[tracing::instrument(skip(context, event_hub))]
async fn health_status(
    State(context): State<InteractiveContext>,
    State(event_hub): State<EventHub>,
) -> (StatusCode, Json<HealthStatus>) {
    let status = HealthStatus {
        is_healthy: true,
        active_rendezvous: context.rendezvous().len(),
        event_subscribers: event_hub.subscriber_count(),
        updated_at: jiff::Timestamp::now(),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        active_rendezvous = status.active_rendezvous,
        event_subscribers = status.event_subscribers,
        "health reported"
    );

    (StatusCode::OK, Json(status))
}

/// Returns an [`ApiRouter`] with monitor routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new().api_route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn health_endpoint_reports_idle_subsystem() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/health").await;
        response.assert_status_success();

        let status = response.json::<HealthStatus>();
        assert!(status.is_healthy);
        assert_eq!(status.active_rendezvous, 0);
        Ok(())
    }
}
