//! Authority configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Deadline for each revocation or rotation store call.
    pub store_timeout: Duration,
    /// Whether verification consults the revocation store.
    pub verify_revocation: bool,
    /// Minimum spacing between sweeps of lapsed revocation and rotation
    /// records, piggybacked on verify and renew. `None` leaves
    /// sweeping to explicit [`crate::Authority::purge_expired`] calls.
    pub sweep_interval: Option<Duration>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(10),
            verify_revocation: true,
            sweep_interval: Some(Duration::from_secs(3600)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthorityConfig::default();
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.verify_revocation);
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: AuthorityConfig =
            serde_json::from_str(r#"{"verify_revocation": false}"#).unwrap();
        assert!(!config.verify_revocation);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.sweep_interval.is_some());
    }
}
