//! Application state and dependency injection.

use std::sync::Arc;

use pictor_nodes::{
    BridgePreview, Canvas, ColorAdjustment, ImageCropper, ImageSelector, InteractiveContext,
    SizeAdjustment,
};

use crate::service::{Error, EventHub, Result, ServiceConfig};

/// The interactive node adapters, constructed once from configuration.
///
/// The host's execution engine calls into these when a graph run
/// reaches the corresponding node.
#[derive(Debug, Clone)]
pub struct Adapters {
    /// Preview bridge with mask editing.
    pub bridge: BridgePreview,
    /// Interactive color adjustment.
    pub color: ColorAdjustment,
    /// Interactive cropping.
    pub cropper: ImageCropper,
    /// Interactive stretch/resize.
    pub resize: SizeAdjustment,
    /// Image selection out of a batch.
    pub selector: ImageSelector,
    /// Layered canvas compositor.
    pub canvas: Canvas,
}

impl Adapters {
    fn from_config(config: &ServiceConfig) -> Self {
        Self {
            bridge: BridgePreview::with_config(config.bridge_config()),
            color: ColorAdjustment::with_config(config.color_config()),
            cropper: ImageCropper::with_config(config.cropper_config()),
            resize: SizeAdjustment::with_config(config.resize_config()),
            selector: ImageSelector::with_config(config.selector_config()),
            canvas: Canvas::with_config(config.canvas_config()),
        }
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    config: ServiceConfig,
    event_hub: EventHub,
    context: InteractiveContext,
    adapters: Arc<Adapters>,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Builds the push event hub, the shared coordinator context, and
    /// the adapter suite.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;

        let event_hub = EventHub::new(config.event_capacity());
        let context = InteractiveContext::with_config(
            Arc::new(event_hub.clone()),
            config.rendezvous_config(),
        );

        Ok(Self {
            config: config.clone(),
            event_hub,
            context,
            adapters: Arc::new(Adapters::from_config(config)),
        })
    }

    /// The service configuration this state was built from.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The push event hub.
    #[must_use]
    pub fn event_hub(&self) -> &EventHub {
        &self.event_hub
    }

    /// The shared coordinator context.
    #[must_use]
    pub fn context(&self) -> &InteractiveContext {
        &self.context
    }

    /// The interactive node adapters.
    #[must_use]
    pub fn adapters(&self) -> &Adapters {
        &self.adapters
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+ $(,)?) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(config: ServiceConfig);
impl_di!(event_hub: EventHub);
impl_di!(context: InteractiveContext);
impl_di!(adapters: Arc<Adapters>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_builds_from_default_config() {
        let state = ServiceState::from_config(&ServiceConfig::default()).unwrap();
        assert!(state.context().rendezvous().is_empty());
        assert_eq!(state.event_hub().subscriber_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ServiceConfig::default().with_event_capacity(0);
        assert!(matches!(
            ServiceState::from_config(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn coordinator_pushes_reach_hub_subscribers() {
        let state = ServiceState::from_config(&ServiceConfig::default()).unwrap();
        let mut feed = state.event_hub().subscribe();

        let id = pictor_core::NodeId::new("1");
        let notice = pictor_core::PushEvent::new("test-update", id.clone(), serde_json::json!({}));
        let _handle = state
            .context()
            .rendezvous()
            .begin_wait(id, notice)
            .unwrap();

        let event = feed.recv().await.unwrap();
        assert_eq!(event.event, "test-update");
    }
}
