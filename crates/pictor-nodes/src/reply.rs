//! Completion payloads delivered through the coordinator.

use pictor_core::{ImageHandle, Mask};
use serde_json::Value;

use crate::kind::NodeKind;

/// Result of a browser-side mask edit.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskEditReply {
    /// The edited image.
    pub image: ImageHandle,
    /// Painted coverage, as the browser produced it (uninverted).
    pub mask: Mask,
}

/// Result of a browser-side color adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAdjustReply {
    /// The adjusted image.
    pub image: ImageHandle,
}

/// Result of a browser-side crop.
#[derive(Debug, Clone, PartialEq)]
pub struct CropReply {
    /// The cropped image.
    pub image: ImageHandle,
    /// Crop width in pixels.
    pub width: u32,
    /// Crop height in pixels.
    pub height: u32,
}

/// Result of a browser-side stretch/resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeReply {
    /// The resized image.
    pub image: ImageHandle,
    /// New width in pixels.
    pub width: u32,
    /// New height in pixels.
    pub height: u32,
}

/// Result of a browser-side image selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReply {
    /// Zero-based indices into the batch the browser was shown.
    pub indices: Vec<usize>,
}

/// Result of a browser-side canvas composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasReply {
    /// The flattened composite.
    pub image: ImageHandle,
    /// Composite coverage, if the browser produced one.
    pub mask: Option<Mask>,
    /// Composite width in pixels.
    pub width: u32,
    /// Composite height in pixels.
    pub height: u32,
    /// Per-layer placement data, passed through to downstream nodes.
    pub transforms: Value,
}

/// The completion payload type the coordinator is instantiated with.
///
/// One variant per node kind; the HTTP layer decodes a request body
/// into the variant matching the posted path and the adapter on the
/// waiting side unwraps the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeReply {
    MaskEdit(MaskEditReply),
    ColorAdjust(ColorAdjustReply),
    Crop(CropReply),
    Resize(ResizeReply),
    Selection(SelectionReply),
    Canvas(CanvasReply),
}

impl NodeReply {
    /// The node kind this reply belongs to.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::MaskEdit(_) => NodeKind::BridgePreview,
            Self::ColorAdjust(_) => NodeKind::ColorAdjustment,
            Self::Crop(_) => NodeKind::ImageCropper,
            Self::Resize(_) => NodeKind::SizeAdjustment,
            Self::Selection(_) => NodeKind::ImageSelector,
            Self::Canvas(_) => NodeKind::Canvas,
        }
    }
}
