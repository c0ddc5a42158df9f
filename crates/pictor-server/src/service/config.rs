//! Service configuration.

use std::time::Duration;

use pictor_nodes::{
    BridgePreviewConfig, CanvasConfig, ColorAdjustmentConfig, ImageCropperConfig,
    ImageSelectorConfig, SizeAdjustmentConfig,
};
use pictor_rendezvous::RendezvousConfig;
use serde::{Deserialize, Serialize};

/// Default capacity of the push event broadcast channel.
const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Configuration for the pictor service with sensible defaults.
///
/// Every dialog deadline observed in the node suite is an override
/// here rather than a constant at a call site; unset fields fall back
/// to the per-adapter defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::Parser))]
pub struct ServiceConfig {
    /// Capacity of the push event broadcast channel (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub event_capacity: Option<usize>,

    /// Mask editor deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub bridge_timeout_secs: Option<u64>,

    /// Color adjustment deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub color_timeout_secs: Option<u64>,

    /// Crop dialog deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub cropper_timeout_secs: Option<u64>,

    /// Resize dialog deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub resize_timeout_secs: Option<u64>,

    /// Selection dialog deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub selector_timeout_secs: Option<u64>,

    /// Canvas composite deadline in seconds (optional).
    #[cfg_attr(feature = "config", arg(long))]
    pub canvas_timeout_secs: Option<u64>,

    /// Whether skip-mode cache hits still push the cached preview.
    #[cfg_attr(feature = "config", arg(long))]
    pub notify_on_cache_hit: Option<bool>,
}

impl ServiceConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the broadcast capacity, using the default if not set.
    #[inline]
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY)
    }

    /// Sets the broadcast capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Coordinator configuration derived from this service config.
    #[must_use]
    pub fn rendezvous_config(&self) -> RendezvousConfig {
        RendezvousConfig::new()
    }

    /// Bridge preview adapter configuration.
    #[must_use]
    pub fn bridge_config(&self) -> BridgePreviewConfig {
        let mut config = BridgePreviewConfig::new()
            .with_notify_on_cache_hit(self.notify_on_cache_hit.unwrap_or(false));
        if let Some(secs) = self.bridge_timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Color adjustment adapter configuration.
    #[must_use]
    pub fn color_config(&self) -> ColorAdjustmentConfig {
        match self.color_timeout_secs {
            Some(secs) => ColorAdjustmentConfig::new().with_timeout(Duration::from_secs(secs)),
            None => ColorAdjustmentConfig::new(),
        }
    }

    /// Cropper adapter configuration.
    #[must_use]
    pub fn cropper_config(&self) -> ImageCropperConfig {
        match self.cropper_timeout_secs {
            Some(secs) => ImageCropperConfig::new().with_timeout(Duration::from_secs(secs)),
            None => ImageCropperConfig::new(),
        }
    }

    /// Size adjustment adapter configuration.
    #[must_use]
    pub fn resize_config(&self) -> SizeAdjustmentConfig {
        match self.resize_timeout_secs {
            Some(secs) => SizeAdjustmentConfig::new().with_timeout(Duration::from_secs(secs)),
            None => SizeAdjustmentConfig::new(),
        }
    }

    /// Selector adapter configuration.
    #[must_use]
    pub fn selector_config(&self) -> ImageSelectorConfig {
        match self.selector_timeout_secs {
            Some(secs) => ImageSelectorConfig::new().with_timeout(Duration::from_secs(secs)),
            None => ImageSelectorConfig::new(),
        }
    }

    /// Canvas adapter configuration.
    #[must_use]
    pub fn canvas_config(&self) -> CanvasConfig {
        match self.canvas_timeout_secs {
            Some(secs) => CanvasConfig::new().with_timeout(Duration::from_secs(secs)),
            None => CanvasConfig::new(),
        }
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.event_capacity == Some(0) {
            return Err("event capacity cannot be zero".to_string());
        }
        let timeouts = [
            ("bridge", self.bridge_timeout_secs),
            ("color", self.color_timeout_secs),
            ("cropper", self.cropper_timeout_secs),
            ("resize", self.resize_timeout_secs),
            ("selector", self.selector_timeout_secs),
            ("canvas", self.canvas_timeout_secs),
        ];
        for (name, timeout) in timeouts {
            if timeout == Some(0) {
                return Err(format!("{name} timeout cannot be zero"));
            }
        }
        Ok(())
    }
}
