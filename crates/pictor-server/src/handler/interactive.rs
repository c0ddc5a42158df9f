//! Completion, cancellation, and refresh endpoints for interactive
//! nodes.
//!
//! The browser resolves a waiting rendezvous by posting to these
//! routes. Responses always carry the `{success, error?}` ack shape
//! the frontend widgets expect; late or duplicate deliveries are
//! acknowledged with `success: false` and logged, never escalated.

use aide::axum::ApiRouter;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use pictor_core::NodeId;
use pictor_nodes::{InteractiveContext, NodeKind, decode_completion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::ServiceState;

/// Tracing target for interactive node endpoints.
const TRACING_TARGET: &str = "pictor_server::handler::interactive";

/// Path parameters for node endpoints.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeKindPathParams {
    /// Kebab-case node kind, e.g. `bridge-preview`.
    pub kind: String,
}

/// Request body delivering a browser-side result.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteNodeRequest {
    /// The node invocation to unblock.
    pub node_id: String,
    /// Node-specific result payload.
    pub result_payload: Value,
}

/// Request body cancelling a waiting rendezvous.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelNodeRequest {
    /// The node invocation to cancel.
    pub node_id: String,
}

/// Request body flagging a canvas scene as dirty.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCanvasRequest {
    /// The canvas node whose scene changed.
    pub node_id: String,
}

/// Acknowledgement the frontend widgets consume.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    /// Whether the request took effect.
    pub success: bool,
    /// Human-readable reason when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Delivers a completion result to the rendezvous waiting for a node.
#[tracing::instrument(skip(context, request))]
async fn complete_node(
    State(context): State<InteractiveContext>,
    Path(path_params): Path<NodeKindPathParams>,
    Json(request): Json<CompleteNodeRequest>,
) -> (StatusCode, Json<Ack>) {
    let Ok(kind) = path_params.kind.parse::<NodeKind>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(Ack::failed(format!("unknown node kind: {}", path_params.kind))),
        );
    };

    let node_id = NodeId::new(request.node_id);

    // A malformed payload must not unblock the waiter; it keeps
    // waiting and resolves by timeout.
    let reply = match decode_completion(kind, &request.result_payload) {
        Ok(reply) => reply,
        Err(error) => {
            tracing::debug!(
                target: TRACING_TARGET,
                node_id = %node_id,
                %kind,
                %error,
                "completion payload rejected"
            );
            return (StatusCode::BAD_REQUEST, Json(Ack::failed(error.to_string())));
        }
    };

    if context.rendezvous().complete(&node_id, reply) {
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node_id,
            %kind,
            "completion delivered"
        );
        (StatusCode::OK, Json(Ack::ok()))
    } else if context.rendezvous().contains(&node_id) {
        // Resolved but not consumed yet: a duplicate network retry.
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node_id,
            "duplicate completion ignored"
        );
        (
            StatusCode::OK,
            Json(Ack::failed("rendezvous already resolved")),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(Ack::failed("no rendezvous waiting for this node")),
        )
    }
}

/// Cancels the rendezvous waiting for a node.
#[tracing::instrument(skip(context))]
async fn cancel_node(
    State(context): State<InteractiveContext>,
    Path(path_params): Path<NodeKindPathParams>,
    Json(request): Json<CancelNodeRequest>,
) -> (StatusCode, Json<Ack>) {
    if path_params.kind.parse::<NodeKind>().is_err() {
        return (
            StatusCode::NOT_FOUND,
            Json(Ack::failed(format!("unknown node kind: {}", path_params.kind))),
        );
    }

    let node_id = NodeId::new(request.node_id);

    if context.rendezvous().cancel(&node_id) {
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node_id,
            "cancellation delivered"
        );
        (StatusCode::OK, Json(Ack::ok()))
    } else if context.rendezvous().contains(&node_id) {
        (
            StatusCode::OK,
            Json(Ack::failed("rendezvous already resolved")),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(Ack::failed("no rendezvous waiting for this node")),
        )
    }
}

/// Flags a canvas node's scene as changed since its last run.
#[tracing::instrument(skip(context))]
async fn refresh_canvas(
    State(context): State<InteractiveContext>,
    Json(request): Json<RefreshCanvasRequest>,
) -> (StatusCode, Json<Ack>) {
    let node_id = NodeId::new(request.node_id);
    context.refresh().mark(node_id.clone());

    tracing::debug!(
        target: TRACING_TARGET,
        node_id = %node_id,
        "canvas refresh flagged"
    );

    (StatusCode::OK, Json(Ack::ok()))
}

/// Returns an [`ApiRouter`] with interactive node routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/nodes/canvas/refresh", post(refresh_canvas))
        .api_route("/nodes/{kind}/complete", post(complete_node))
        .api_route("/nodes/{kind}/cancel", post(cancel_node))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pictor_core::{ImageBatch, ImageFormat, ImageHandle};
    use pictor_nodes::{BridgePreview, BridgePreviewConfig};
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::handler::test::{create_test_server_with_state, create_test_state};

    fn complete_body(node_id: &str, payload: Value) -> Value {
        json!({ "nodeId": node_id, "resultPayload": payload })
    }

    fn data_url(payload: &[u8]) -> String {
        use base64::Engine as _;
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(payload)
        )
    }

    #[tokio::test]
    async fn complete_without_waiter_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server_with_state(create_test_state()?)?;

        let response = server
            .post("/nodes/color-adjustment/complete")
            .json(&complete_body("42", json!({ "imageData": data_url(b"x") })))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let ack = response.json::<Ack>();
        assert!(!ack.success);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_without_waiter_is_not_found_for_every_kind() -> anyhow::Result<()> {
        let server = create_test_server_with_state(create_test_state()?)?;

        for kind in NodeKind::iter() {
            let response = server
                .post(&format!("/nodes/{kind}/cancel"))
                .json(&json!({ "nodeId": "7" }))
                .await;
            response.assert_status(StatusCode::NOT_FOUND);
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_kind_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server_with_state(create_test_state()?)?;

        let response = server
            .post("/nodes/noise-texture/complete")
            .json(&complete_body("1", json!({})))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected_and_waiter_stays_blocked() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let context = state.context().clone();
        let server = create_test_server_with_state(state)?;

        let notice = pictor_core::PushEvent::new("color-adjustment-update", NodeId::new("5"), json!({}));
        let _handle = context
            .rendezvous()
            .begin_wait_with_timeout(NodeId::new("5"), notice, Duration::from_secs(30))?;

        let response = server
            .post("/nodes/color-adjustment/complete")
            .json(&complete_body("5", json!({ "wrong": true })))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let ack = response.json::<Ack>();
        assert!(!ack.success);
        assert!(ack.error.is_some());

        // The decode failure did not unblock the waiter.
        assert!(context.rendezvous().is_waiting(&NodeId::new("5")));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_marks_the_canvas_ledger() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let context = state.context().clone();
        let server = create_test_server_with_state(state)?;

        let response = server
            .post("/nodes/canvas/refresh")
            .json(&json!({ "nodeId": "12" }))
            .await;

        response.assert_status(StatusCode::OK);
        assert!(context.refresh().take(&NodeId::new("12")));
        Ok(())
    }

    #[tokio::test]
    async fn bridge_rendezvous_completes_end_to_end() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let context = state.context().clone();
        let mut feed = state.event_hub().subscribe();
        let server = create_test_server_with_state(state)?;

        let bridge = BridgePreview::with_config(
            BridgePreviewConfig::new().with_timeout(Duration::from_secs(30)),
        );
        let images = ImageBatch::single(2, 1, ImageHandle::inline(ImageFormat::Png, &b"in"[..]));

        let run = {
            let context = context.clone();
            let images = images.clone();
            tokio::spawn(async move {
                bridge.run(&context, NodeId::new("n1"), &images, false).await
            })
        };

        // The push notification announces the rendezvous.
        let event = feed.recv().await?;
        assert_eq!(event.event, "bridge-preview-update");
        assert_eq!(event.node_id, NodeId::new("n1"));

        let response = server
            .post("/nodes/bridge-preview/complete")
            .json(&complete_body(
                "n1",
                json!({
                    "image": { "imageData": data_url(b"edited") },
                    "mask": { "width": 2, "height": 1, "data": [1.0, 0.0] },
                }),
            ))
            .await;
        response.assert_status(StatusCode::OK);
        assert!(response.json::<Ack>().success);

        let output = run.await??;
        assert_eq!(
            output.images,
            ImageBatch::single(2, 1, ImageHandle::inline(ImageFormat::Png, &b"edited"[..]))
        );
        assert_eq!(output.mask.data(), &[0.0, 1.0]);

        // The slot is gone: a follow-up cancel finds nothing.
        let response = server
            .post("/nodes/bridge-preview/cancel")
            .json(&json!({ "nodeId": "n1" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(context.rendezvous().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn selector_cancel_interrupts_the_run() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let context = state.context().clone();
        let mut feed = state.event_hub().subscribe();
        let server = create_test_server_with_state(state)?;

        let selector = pictor_nodes::ImageSelector::with_config(
            pictor_nodes::ImageSelectorConfig::new().with_timeout(Duration::from_secs(30)),
        );
        let images = ImageBatch::new(
            2,
            2,
            vec![
                ImageHandle::inline(ImageFormat::Png, &b"a"[..]),
                ImageHandle::inline(ImageFormat::Png, &b"b"[..]),
            ],
        );

        let run = {
            let context = context.clone();
            tokio::spawn(async move {
                selector
                    .run(
                        &context,
                        NodeId::new("s1"),
                        &images,
                        pictor_nodes::SelectorMode::AlwaysPause,
                    )
                    .await
            })
        };

        feed.recv().await?;

        let response = server
            .post("/nodes/image-selector/cancel")
            .json(&json!({ "nodeId": "s1" }))
            .await;
        response.assert_status(StatusCode::OK);

        let result = run.await?;
        assert!(matches!(result, Err(pictor_nodes::NodeError::Interrupted)));
        Ok(())
    }
}
