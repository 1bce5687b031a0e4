//! Engine-wide constants and timing configuration.
//!
//! Compile-time defaults live here so they can be tuned in one place;
//! [`Timing`] carries the two values an engine can override at build time.

// Tick driver

/// Period at which `Engine::tick` is expected to be called (ms).
pub const TICK_INTERVAL_MS: u32 = 5;

/// Minimum time the sampled button mask must stay unchanged before the
/// state machines are stepped (ms).
pub const DEBOUNCE_TIME_MS: u32 = 20;

// Default button parameters

/// Hold time before a press turns into a long press (ms).
pub const LONG_PRESS_START_TIME_MS: u16 = 1000;

/// Period of the repeated long-press event while the button stays held (ms).
pub const LONG_PRESS_REPEAT_MS: u16 = 1000;

/// Informational only. The state machine never reads it.
pub const SHORT_PRESS_TIME_MS: u16 = 200;

/// Idle gap after a release before the click sequence is finalized (ms).
pub const TIME_WINDOW_TIME_MS: u16 = 300;

// Tables

/// Maximum number of combo buttons an engine accepts.
pub const MAX_COMBO_BUTTONS: usize = 8;

/// Default capacity of the built-in result ring buffer (records).
pub const RESULT_BUFFER_SIZE: usize = 10;

/// Tick period and debounce window used by an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Period between two `tick()` calls (ms).
    pub tick_interval_ms: u32,
    /// Stable-mask time required before dispatch (ms).
    pub debounce_ms: u32,
}

impl Timing {
    pub const DEFAULT: Self = Self {
        tick_interval_ms: TICK_INTERVAL_MS,
        debounce_ms: DEBOUNCE_TIME_MS,
    };

    /// Convert a tick count into milliseconds, saturating on overflow.
    pub const fn ticks_to_ms(&self, ticks: u32) -> u32 {
        ticks.saturating_mul(self.tick_interval_ms)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
