//! Mask planes attached to edited images.

use serde::{Deserialize, Serialize};

/// A single-channel coverage plane with values in `[0, 1]`.
///
/// Row-major, `width * height` samples. The browser posts masks back
/// as part of a mask-edit completion; adapters that fall back on
/// timeout substitute a full-coverage plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Mask {
    /// Creates a mask from raw samples.
    ///
    /// Returns `None` if the sample count does not match the
    /// dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Full-coverage mask: every sample is `1.0`.
    #[must_use]
    pub fn ones(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![1.0; (width as usize) * (height as usize)],
        }
    }

    /// Mask width in samples.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in samples.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw samples, row-major.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns this mask with every sample flipped (`1.0 - v`).
    ///
    /// Mask-edit completions arrive with painted regions at full
    /// value; the pipeline consumes the complement.
    #[must_use]
    pub fn inverted(mut self) -> Self {
        for v in &mut self.data {
            *v = 1.0 - *v;
        }
        self
    }
}
