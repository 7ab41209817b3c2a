//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the bootstrap runtime.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1

/// Global configuration for the bootstrap runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// The subscriber listener that lags behind more than `bus_capacity`
    /// messages skips older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}
