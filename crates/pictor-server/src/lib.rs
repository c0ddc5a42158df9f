#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod handler;
pub mod service;

pub use crate::handler::router;
pub use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for server operations.
pub const TRACING_TARGET: &str = "pictor_server";
