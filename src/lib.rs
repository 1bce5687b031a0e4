//! Tick-driven button event engine.
//!
//! Samples raw button levels at a fixed period, debounces the whole button
//! mask at once, and runs a small state machine per button and per key
//! combo. Each press/release sequence is recorded as history bits
//! (`0b10` single click, `0b1010` double click, `0b011` long press, ...).
//!
//! Results reach the application two ways:
//!   - a direct callback, invoked from `tick()` for every event, and
//!   - a lock-free single-producer / single-consumer channel that by
//!     default only carries settled results (long presses and finished
//!     sequences), drained from any other context.
//!
//! The library is `no_std` and never allocates; button and combo tables
//! are caller-owned. `main.rs` is an nRF52840 demo (feature `embedded`).
//!
//! ```
//! use core::cell::Cell;
//! use button_bits::{Button, ButtonParams, Engine, HistoryBits, ResultChannel, RingBuffer};
//!
//! static PARAMS: ButtonParams = ButtonParams::DEFAULT;
//! static RESULTS: RingBuffer = RingBuffer::new();
//!
//! let level = Cell::new(0u8);
//! let mut buttons = [Button::new(0, 1, &PARAMS)];
//! let mut engine = Engine::builder(&mut buttons, |_id: u16| level.get())
//!     .channel(&RESULTS)
//!     .build()
//!     .unwrap();
//!
//! // 50 ms press, then idle long enough for the sequence to finish.
//! level.set(1);
//! (0..10).for_each(|_| engine.tick());
//! level.set(0);
//! (0..100).for_each(|_| engine.tick());
//!
//! let result = RESULTS.read().unwrap();
//! assert!(result.is_finished(HistoryBits::SINGLE_CLICK));
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bits;
pub mod button;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod reader;
pub mod result;
pub mod sink;

/// Identity of a plain button or combo. Combos conventionally use ids
/// from `0x100` up.
pub type ButtonId = u16;

pub use bits::{ButtonMask, HistoryBits};
pub use button::{Button, ButtonParams, ButtonState, ComboButton};
pub use channel::{NoChannel, ResultChannel, RingBuffer};
pub use config::Timing;
pub use engine::{Engine, EngineBuilder};
pub use error::InitError;
pub use reader::{LevelReader, PinLevels};
pub use result::ButtonResult;
pub use sink::{default_filter, ResultCallback, ResultFilter};

#[cfg(feature = "critical-section")]
pub use channel::CsRingBuffer;
