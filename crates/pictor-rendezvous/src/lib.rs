#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod outcome;

pub use cache::{CacheEntry, ResultCache};
pub use config::RendezvousConfig;
pub use coordinator::{Rendezvous, WaitHandle};
pub use error::RendezvousError;
pub use outcome::Outcome;

/// Tracing target for rendezvous operations.
pub const TRACING_TARGET: &str = "pictor_rendezvous";
