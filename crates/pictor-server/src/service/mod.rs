//! Service state, configuration, and the push event hub.

mod config;
mod error;
mod events;
mod state;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use events::EventHub;
pub use state::{Adapters, ServiceState};
