#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod context;
pub mod decode;
pub mod kind;
pub mod node;
pub mod reply;

pub use context::{InteractiveContext, RefreshLedger};
pub use decode::{DecodeError, decode_completion};
pub use error::{NodeError, NodeResult};
pub use kind::NodeKind;
pub use node::{
    BridgeOutput, BridgePreview, BridgePreviewConfig, Canvas, CanvasConfig, CanvasOutput,
    ColorAdjustment, ColorAdjustmentConfig, ImageCropper, ImageCropperConfig, ImageSelector,
    ImageSelectorConfig, SelectorMode, SelectorOutput, SizeAdjustment, SizeAdjustmentConfig,
};
pub use reply::{
    CanvasReply, ColorAdjustReply, CropReply, MaskEditReply, NodeReply, ResizeReply,
    SelectionReply,
};

#[cfg(test)]
pub(crate) mod test_support;

/// Tracing target for node adapter operations.
pub const TRACING_TARGET: &str = "pictor_nodes";
