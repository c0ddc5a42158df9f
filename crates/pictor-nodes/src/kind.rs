//! Node kind enumeration.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The interactive node types this suite ships.
///
/// The kebab-case string form doubles as the HTTP path segment the
/// browser posts completions under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum NodeKind {
    /// Preview bridge with browser-side mask editing.
    BridgePreview,
    /// Interactive color adjustment.
    ColorAdjustment,
    /// Interactive cropping.
    ImageCropper,
    /// Interactive stretch/resize.
    SizeAdjustment,
    /// Image selection out of a batch.
    ImageSelector,
    /// Layered canvas compositor.
    Canvas,
}

impl NodeKind {
    /// Push event name announcing a new rendezvous of this kind.
    #[must_use]
    pub const fn update_event(self) -> &'static str {
        match self {
            Self::BridgePreview => "bridge-preview-update",
            Self::ColorAdjustment => "color-adjustment-update",
            Self::ImageCropper => "image-cropper-update",
            Self::SizeAdjustment => "size-adjustment-update",
            Self::ImageSelector => "image-selector-update",
            Self::Canvas => "canvas-update",
        }
    }
}
