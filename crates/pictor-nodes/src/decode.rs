//! Decoding of completion request payloads.
//!
//! The browser posts node-specific JSON bodies; this module turns them
//! into [`NodeReply`] values for delivery through the coordinator. A
//! decode failure is reported back over HTTP and the waiting node is
//! left untouched — it resolves by timeout and falls back.

use pictor_core::{DataUrlError, ImageHandle, Mask, StorageFolder};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::kind::NodeKind;
use crate::reply::{
    CanvasReply, ColorAdjustReply, CropReply, MaskEditReply, NodeReply, ResizeReply,
    SelectionReply,
};

/// Errors from decoding a completion payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body does not match the shape this node kind posts.
    #[error("invalid completion payload for {kind}: {source}")]
    Payload {
        /// Node kind the payload was posted for.
        kind: NodeKind,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// An embedded image failed to parse.
    #[error("invalid image payload: {0}")]
    Image(#[from] DataUrlError),

    /// Mask samples do not match the declared dimensions.
    #[error("mask samples do not match {width}x{height}")]
    MaskShape {
        /// Declared mask width.
        width: u32,
        /// Declared mask height.
        height: u32,
    },
}

/// An image reference as the browser posts it: either an inline
/// `data:` URL or a record pointing into a host storage folder.
#[derive(Debug, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
enum ImageWire {
    Inline {
        image_data: String,
    },
    Stored {
        filename: String,
        #[serde(default)]
        subfolder: String,
        #[serde(default = "default_folder", rename = "type")]
        folder: StorageFolder,
    },
}

fn default_folder() -> StorageFolder {
    StorageFolder::Output
}

impl ImageWire {
    fn into_handle(self) -> Result<ImageHandle, DecodeError> {
        match self {
            Self::Inline { image_data } => Ok(ImageHandle::from_data_url(&image_data)?),
            Self::Stored {
                filename,
                subfolder,
                folder,
            } => Ok(ImageHandle::stored(filename, subfolder, folder)),
        }
    }
}

/// A mask plane as the browser posts it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaskWire {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl MaskWire {
    fn into_mask(self) -> Result<Mask, DecodeError> {
        let (width, height) = (self.width, self.height);
        Mask::new(width, height, self.data).ok_or(DecodeError::MaskShape { width, height })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaskEditWire {
    image: ImageWire,
    mask: MaskWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorAdjustWire {
    image_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CropWire {
    width: u32,
    height: u32,
    image_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionWire {
    selected_indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasWire {
    main_image: ImageWire,
    #[serde(default)]
    main_mask: Option<MaskWire>,
    width: u32,
    height: u32,
    #[serde(default)]
    layer_transforms: Value,
}

fn parse<'de, T: Deserialize<'de>>(kind: NodeKind, payload: &'de Value) -> Result<T, DecodeError> {
    T::deserialize(payload).map_err(|source| DecodeError::Payload { kind, source })
}

/// Decodes a completion body posted for `kind` into its reply.
pub fn decode_completion(kind: NodeKind, payload: &Value) -> Result<NodeReply, DecodeError> {
    match kind {
        NodeKind::BridgePreview => {
            let wire: MaskEditWire = parse(kind, payload)?;
            Ok(NodeReply::MaskEdit(MaskEditReply {
                image: wire.image.into_handle()?,
                mask: wire.mask.into_mask()?,
            }))
        }
        NodeKind::ColorAdjustment => {
            let wire: ColorAdjustWire = parse(kind, payload)?;
            Ok(NodeReply::ColorAdjust(ColorAdjustReply {
                image: ImageHandle::from_data_url(&wire.image_data)?,
            }))
        }
        NodeKind::ImageCropper => {
            let wire: CropWire = parse(kind, payload)?;
            Ok(NodeReply::Crop(CropReply {
                image: ImageHandle::from_data_url(&wire.image_data)?,
                width: wire.width,
                height: wire.height,
            }))
        }
        NodeKind::SizeAdjustment => {
            let wire: CropWire = parse(kind, payload)?;
            Ok(NodeReply::Resize(ResizeReply {
                image: ImageHandle::from_data_url(&wire.image_data)?,
                width: wire.width,
                height: wire.height,
            }))
        }
        NodeKind::ImageSelector => {
            let wire: SelectionWire = parse(kind, payload)?;
            Ok(NodeReply::Selection(SelectionReply {
                indices: wire.selected_indices,
            }))
        }
        NodeKind::Canvas => {
            let wire: CanvasWire = parse(kind, payload)?;
            Ok(NodeReply::Canvas(CanvasReply {
                image: wire.main_image.into_handle()?,
                mask: wire.main_mask.map(MaskWire::into_mask).transpose()?,
                width: wire.width,
                height: wire.height,
                transforms: wire.layer_transforms,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use pictor_core::ImageFormat;
    use serde_json::json;

    use super::*;

    fn png_data_url(payload: &[u8]) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(payload))
    }

    #[test]
    fn selection_payload_decodes() {
        let reply = decode_completion(
            NodeKind::ImageSelector,
            &json!({"selectedIndices": [2, 0]}),
        )
        .unwrap();
        assert_eq!(
            reply,
            NodeReply::Selection(SelectionReply {
                indices: vec![2, 0]
            })
        );
    }

    #[test]
    fn crop_payload_decodes_inline_image() {
        let reply = decode_completion(
            NodeKind::ImageCropper,
            &json!({"width": 8, "height": 4, "imageData": png_data_url(b"crop")}),
        )
        .unwrap();

        let NodeReply::Crop(crop) = reply else {
            panic!("wrong variant");
        };
        assert_eq!(crop.width, 8);
        assert_eq!(crop.height, 4);
        assert_eq!(
            crop.image,
            ImageHandle::inline(ImageFormat::Png, &b"crop"[..])
        );
    }

    #[test]
    fn mask_edit_accepts_stored_image() {
        let reply = decode_completion(
            NodeKind::BridgePreview,
            &json!({
                "image": {"filename": "edit_00001_.png", "type": "output"},
                "mask": {"width": 2, "height": 1, "data": [0.0, 1.0]},
            }),
        )
        .unwrap();

        let NodeReply::MaskEdit(edit) = reply else {
            panic!("wrong variant");
        };
        assert_eq!(
            edit.image,
            ImageHandle::stored("edit_00001_.png", "", StorageFolder::Output)
        );
        assert_eq!(edit.mask.data(), &[0.0, 1.0]);
    }

    #[test]
    fn mismatched_mask_shape_is_rejected() {
        let err = decode_completion(
            NodeKind::BridgePreview,
            &json!({
                "image": {"filename": "x.png"},
                "mask": {"width": 3, "height": 2, "data": [0.0]},
            }),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MaskShape {
                width: 3,
                height: 2
            }
        ));
    }

    #[test]
    fn missing_fields_are_a_payload_error() {
        let err =
            decode_completion(NodeKind::ColorAdjustment, &json!({"unrelated": true})).unwrap_err();
        assert!(matches!(err, DecodeError::Payload { .. }));
    }

    #[test]
    fn invalid_base64_is_an_image_error() {
        let err = decode_completion(
            NodeKind::ColorAdjustment,
            &json!({"imageData": "data:image/png;base64,@@@"}),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[test]
    fn canvas_payload_decodes_with_optional_mask() {
        let reply = decode_completion(
            NodeKind::Canvas,
            &json!({
                "mainImage": {"imageData": png_data_url(b"flat")},
                "width": 16,
                "height": 9,
                "layerTransforms": {"layer0": {"x": 3}},
            }),
        )
        .unwrap();

        let NodeReply::Canvas(canvas) = reply else {
            panic!("wrong variant");
        };
        assert!(canvas.mask.is_none());
        assert_eq!(canvas.transforms["layer0"]["x"], 3);
    }
}
