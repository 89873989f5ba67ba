//! Status propagation settings: completion notifications and conflict retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_true() -> bool {
    true
}

const fn default_retry_attempts() -> u32 {
    4
}

const fn default_retry_base_delay_ms() -> u64 {
    100
}

const fn default_retry_max_delay_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropagationConfig {
    /// Notify every admin when a task moves into Completed.
    #[serde(default = "default_true")]
    pub notify_admins_on_completion: bool,

    /// Attempts per unit of work, the first one included.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            notify_admins_on_completion: default_true(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl PropagationConfig {
    pub const fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub const fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    /// Reject settings that would make retry meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when no attempt is allowed or the
    /// base delay exceeds the cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "propagation.retry_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "propagation.retry_base_delay_ms".to_string(),
                reason: format!(
                    "{} exceeds retry_max_delay_ms ({})",
                    self.retry_base_delay_ms, self.retry_max_delay_ms
                ),
            });
        }
        Ok(())
    }
}
