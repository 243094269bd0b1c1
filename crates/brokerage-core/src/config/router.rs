use crate::time::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the share price movement router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Length of one movement window in seconds
    /// Default: 60
    #[serde(default = "default_activity_time_secs")]
    pub activity_time_secs: i64,

    /// Number of stripes for the per-share lock manager
    /// Default: 256
    #[serde(default = "default_lock_stripes")]
    pub lock_stripes: usize,

    /// Timeout for acquiring the share locks of one event, in milliseconds
    /// Default: 5000
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_activity_time_secs() -> i64 {
    60
}

fn default_lock_stripes() -> usize {
    256
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            activity_time_secs: default_activity_time_secs(),
            lock_stripes: default_lock_stripes(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity_time_secs(mut self, secs: i64) -> Self {
        self.activity_time_secs = secs;
        self
    }

    pub fn with_lock_stripes(mut self, stripes: usize) -> Self {
        self.lock_stripes = stripes;
        self
    }

    pub fn with_lock_timeout_ms(mut self, ms: u64) -> Self {
        self.lock_timeout_ms = ms;
        self
    }

    /// Window length as a duration
    pub fn activity_time(&self) -> Duration {
        Duration::from_secs(self.activity_time_secs)
    }

    pub fn lock_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.lock_timeout_ms)
    }
}
