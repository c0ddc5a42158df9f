#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod fingerprint;
pub mod id;
pub mod image;
pub mod mask;
pub mod notify;

pub use error::PushError;
pub use fingerprint::Fingerprint;
pub use id::{NodeId, SessionId};
pub use image::{DataUrlError, ImageBatch, ImageFormat, ImageHandle, StorageFolder};
pub use mask::Mask;
pub use notify::{NullNotifier, PushEvent, PushNotifier};

/// Tracing target for core operations.
pub const TRACING_TARGET: &str = "pictor_core";
