//! Button entities and their shared state machine.
//!
//! A plain [`Button`] follows one physical input. A [`ComboButton`] wraps a
//! `Button` that is driven by "all members pressed" instead; both run the
//! same state machine (see `state_machine.rs`).
//!
//! ```text
//!  Idle ──press──▶ Pressed ──held > start──▶ LongPress ──(repeat)──┐
//!   ▲                 │                          │  ◀──────────────┘
//!   │              release                    release
//!   │                 ▼                          ▼
//!   │  ◀──press── ReleaseWindow ◀───────────── Release
//!   │                 │
//!   │          idle > time window
//!   │                 ▼
//!   └──────────────  Finish
//! ```

mod state_machine;


use crate::bits::{ButtonMask, HistoryBits};
use crate::config;
use crate::ButtonId;

/// State of a button state machine. Also used as the event kind of a
/// [`ButtonResult`](crate::ButtonResult).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ButtonState {
    #[default]
    Idle = 0,
    Pressed = 1,
    LongPress = 2,
    Release = 3,
    ReleaseWindow = 4,
    Finish = 5,
}

/// Timing parameters, shared by any number of entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonParams {
    /// Hold time before Pressed becomes LongPress (ms).
    pub long_press_start_ms: u16,
    /// Period of repeated LongPress events while held (ms).
    pub long_press_repeat_ms: u16,
    /// Informational; not used by the state machine.
    pub short_press_ms: u16,
    /// Maximum idle gap after a release before the sequence finishes (ms).
    pub time_window_ms: u16,
}

impl ButtonParams {
    pub const DEFAULT: Self = Self {
        long_press_start_ms: config::LONG_PRESS_START_TIME_MS,
        long_press_repeat_ms: config::LONG_PRESS_REPEAT_MS,
        short_press_ms: config::SHORT_PRESS_TIME_MS,
        time_window_ms: config::TIME_WINDOW_TIME_MS,
    };
}

impl Default for ButtonParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A plain button, or the state-machine half of a combo.
#[derive(Clone, Debug)]
pub struct Button<'p> {
    id: ButtonId,
    active_level: u8,
    params: Option<&'p ButtonParams>,
    state: ButtonState,
    last_state: ButtonState,
    history: HistoryBits,
    state_entry_time: u32,
    repeat_count: u16,
}

impl<'p> Button<'p> {
    /// Button `id` that counts as pressed when the reader returns
    /// `active_level`.
    pub const fn new(id: ButtonId, active_level: u8, params: &'p ButtonParams) -> Self {
        Self::with_params(id, active_level, Some(params))
    }

    /// Button without parameters. It is sampled but never changes state.
    pub const fn inert(id: ButtonId, active_level: u8) -> Self {
        Self::with_params(id, active_level, None)
    }

    const fn with_params(id: ButtonId, active_level: u8, params: Option<&'p ButtonParams>) -> Self {
        Self {
            id,
            active_level,
            params,
            state: ButtonState::Idle,
            last_state: ButtonState::Idle,
            history: HistoryBits::EMPTY,
            state_entry_time: 0,
            repeat_count: 0,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn active_level(&self) -> u8 {
        self.active_level
    }

    pub fn params(&self) -> Option<&'p ButtonParams> {
        self.params
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// State after the previous step.
    pub fn last_state(&self) -> ButtonState {
        self.last_state
    }

    pub fn history(&self) -> HistoryBits {
        self.history
    }

    pub fn repeat_count(&self) -> u16 {
        self.repeat_count
    }

    /// Back to Idle with an empty history, keeping id and parameters.
    pub fn reset(&mut self) {
        self.state = ButtonState::Idle;
        self.last_state = ButtonState::Idle;
        self.history.clear();
        self.state_entry_time = 0;
        self.repeat_count = 0;
    }
}

/// A virtual button that is pressed while all of its members are pressed.
#[derive(Clone, Debug)]
pub struct ComboButton<'p> {
    button: Button<'p>,
    members: &'p [ButtonId],
    mask: ButtonMask,
    suppress: bool,
}

impl<'p> ComboButton<'p> {
    /// Combo `id` over the plain buttons `members`. With `suppress`, the
    /// members' own events are hidden while the combo is active.
    ///
    /// `active_level` is kept for symmetry with [`Button`]; combos are
    /// driven by their members' levels.
    pub const fn new(
        id: ButtonId,
        active_level: u8,
        params: &'p ButtonParams,
        members: &'p [ButtonId],
        suppress: bool,
    ) -> Self {
        Self {
            button: Button::new(id, active_level, params),
            members,
            mask: ButtonMask::EMPTY,
            suppress,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.button.id
    }

    pub fn button(&self) -> &Button<'p> {
        &self.button
    }

    pub(crate) fn button_mut(&mut self) -> &mut Button<'p> {
        &mut self.button
    }

    pub fn members(&self) -> &'p [ButtonId] {
        self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Member bits over the plain-button table. Empty until the combo has
    /// been resolved by an engine.
    pub fn mask(&self) -> ButtonMask {
        self.mask
    }

    pub(crate) fn set_mask(&mut self, mask: ButtonMask) {
        self.mask = mask;
    }

    pub fn suppress(&self) -> bool {
        self.suppress
    }
}
