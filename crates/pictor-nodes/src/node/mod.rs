//! The interactive node adapters.
//!
//! One module per node type. Every adapter follows the same shape:
//! encode a preview for the browser, open a rendezvous, map the
//! outcome to the node's output. The per-adapter differences — cache
//! use, output transforms, cancellation contract, two-phase canvas
//! notification — live entirely in these modules; the coordinator
//! underneath is shared and identical for all of them.

mod bridge;
mod canvas;
mod color;
mod cropper;
mod resize;
mod selector;

pub use bridge::{BridgeOutput, BridgePreview, BridgePreviewConfig};
pub use canvas::{Canvas, CanvasConfig, CanvasOutput, GET_STATE_EVENT};
pub use color::{ColorAdjustment, ColorAdjustmentConfig};
pub use cropper::{ImageCropper, ImageCropperConfig};
pub use resize::{SizeAdjustment, SizeAdjustmentConfig};
pub use selector::{ImageSelector, ImageSelectorConfig, SELECTION_EVENT, SelectorMode, SelectorOutput};
