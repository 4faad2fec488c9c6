//! Orphan reclaimer tuning.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default number of relation rows fetched per scan page.
const fn default_page_size() -> u32 {
    500
}

/// Default progress log interval, in scanned rows.
const fn default_log_every() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReclaimConfig {
    /// Rows fetched per page while scanning the relation table.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Emit a progress log line every this many scanned rows (0 disables).
    #[serde(default = "default_log_every")]
    pub log_every: u64,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            log_every: default_log_every(),
        }
    }
}

impl ReclaimConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `page_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reclaim.page_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ReclaimConfig::default();
        assert_eq!(config.page_size, 500);
        assert_eq!(config.log_every, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = ReclaimConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "reclaim.page_size"
        ));
    }
}
