//! Coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default wait deadline when a caller does not supply one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the rendezvous coordinator with sensible defaults.
///
/// Per-adapter deadlines live in the adapter configs; this default
/// only applies when `begin_wait` is called without an explicit
/// timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendezvousConfig {
    /// Default wait deadline (optional).
    pub default_timeout: Option<Duration>,
}

impl RendezvousConfig {
    /// Creates a new coordinator configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_timeout: None,
        }
    }

    /// Returns the default timeout, using the built-in default if not set.
    #[inline]
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Sets the default wait deadline.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_timeout == Some(Duration::ZERO) {
            return Err("default timeout cannot be zero".to_string());
        }
        Ok(())
    }
}

impl Default for RendezvousConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RendezvousConfig::new();
        assert_eq!(config.default_timeout(), DEFAULT_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides_default() {
        let config = RendezvousConfig::new().with_default_timeout(Duration::from_secs(5));
        assert_eq!(config.default_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = RendezvousConfig::new().with_default_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
