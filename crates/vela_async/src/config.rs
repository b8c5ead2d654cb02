//! Render bridge configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on how long a flush may block the UI thread in total
const MAX_FLUSH_BLOCK_MS: u64 = 1_000;

/// Configuration for the asynchronous rendering bridge.
///
/// The drain wait/retry pair bounds how long `flush` blocks the UI thread
/// waiting for the previous frame to be replayed. Neither value is load
/// bearing; they trade dropped frames against UI thread stalls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsyncRenderConfig {
    /// Length of one timed wait for the previous frame to drain (milliseconds)
    pub drain_wait_ms: u64,
    /// Number of timed waits before the flush is abandoned for this frame
    pub drain_retries: u32,
    /// Reuse per-style background plans across frames. When disabled every
    /// background is classified and recorded by value on each call.
    pub cached_backgrounds: bool,
    /// Submitted frames a cached background plan may go unused before it is
    /// evicted
    pub plan_idle_frames: u64,
    /// View size until the host reports one
    pub initial_width: u32,
    pub initial_height: u32,
}

impl Default for AsyncRenderConfig {
    fn default() -> Self {
        Self {
            drain_wait_ms: 5,
            drain_retries: 10,
            cached_backgrounds: true,
            plan_idle_frames: 120,
            initial_width: 0,
            initial_height: 0,
        }
    }
}

impl AsyncRenderConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AsyncRenderConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let worst_case = self.drain_wait_ms.saturating_mul(u64::from(self.drain_retries));
        if worst_case > MAX_FLUSH_BLOCK_MS {
            return Err(ConfigError::Invalid(format!(
                "flush may block the UI thread for {worst_case}ms (limit {MAX_FLUSH_BLOCK_MS}ms)"
            )));
        }
        Ok(())
    }

    pub fn drain_wait(&self) -> Duration {
        Duration::from_millis(self.drain_wait_ms)
    }

    /// Set the drain wait. Sub-millisecond waits round up to whole
    /// milliseconds rather than collapsing to zero.
    pub fn with_drain_wait(mut self, wait: Duration) -> Self {
        self.drain_wait_ms = u64::try_from(wait.as_micros().div_ceil(1_000)).unwrap_or(u64::MAX);
        self
    }

    pub fn with_drain_retries(mut self, retries: u32) -> Self {
        self.drain_retries = retries;
        self
    }

    pub fn with_cached_backgrounds(mut self, enabled: bool) -> Self {
        self.cached_backgrounds = enabled;
        self
    }

    pub fn with_plan_idle_frames(mut self, frames: u64) -> Self {
        self.plan_idle_frames = frames;
        self
    }

    pub fn with_initial_size(mut self, width: u32, height: u32) -> Self {
        self.initial_width = width;
        self.initial_height = height;
        self
    }
}
