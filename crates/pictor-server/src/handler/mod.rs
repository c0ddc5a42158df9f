//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! The route table is mounted into the host application; binding a
//! listener is the host's job. Routes:
//!
//! - `POST /nodes/{kind}/complete` — deliver a browser-side result
//! - `POST /nodes/{kind}/cancel` — cancel a waiting rendezvous
//! - `POST /nodes/canvas/refresh` — flag a canvas scene as dirty
//! - `GET /events` — websocket feed of push notifications
//! - `GET /health` — liveness probe
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod events;
mod interactive;
mod monitors;

use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use tower_http::trace::TraceLayer;

pub use crate::handler::interactive::{Ack, CancelNodeRequest, CompleteNodeRequest};
pub use crate::handler::monitors::HealthStatus;
use crate::service::ServiceState;

/// Returns an [`ApiRouter`] with all routes.
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(interactive::routes())
        .merge(events::routes())
        .merge(monitors::routes())
}

/// Returns the fully wired [`Router`] for mounting into the host.
///
/// [`Router`]: axum::routing::Router
pub fn router(state: ServiceState) -> axum::Router {
    let mut api = OpenApi::default();
    routes()
        .finish_api(&mut api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test {
    use axum_test::TestServer;

    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a new [`TestServer`] with the default router and state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let state = create_test_state()?;
        create_test_server_with_state(state)
    }

    /// Returns a new [`TestServer`] sharing the given state.
    pub fn create_test_server_with_state(state: ServiceState) -> anyhow::Result<TestServer> {
        init_tracing();
        let app = crate::handler::router(state);
        Ok(TestServer::new(app)?)
    }

    /// Returns a fresh [`ServiceState`] from the default configuration.
    pub fn create_test_state() -> anyhow::Result<ServiceState> {
        Ok(ServiceState::from_config(&ServiceConfig::default())?)
    }

    fn init_tracing() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }
}
