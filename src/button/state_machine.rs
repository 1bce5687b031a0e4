//! One step of the per-entity state machine.

use super::{Button, ButtonState};
use crate::config::Timing;
use crate::result::ButtonResult;

/// Low history bits that mark a long press about to see its first repeat.
const LONG_PRESS_START_PATTERN: u32 = 0b011;
const LONG_PRESS_START_PATTERN_WIDTH: u32 = 3;

impl<'p> Button<'p> {
    /// Advance the state machine by one tick.
    ///
    /// `now` is the engine tick counter. Returns the event emitted by this
    /// step, if any; a step never emits more than one.
    pub(crate) fn step(&mut self, pressed: bool, now: u32, timing: &Timing) -> Option<ButtonResult> {
        let params = self.params?;
        let elapsed_ms = timing.ticks_to_ms(now.wrapping_sub(self.state_entry_time));
        let mut emitted = None;

        match self.state {
            ButtonState::Idle => {
                if pressed {
                    self.history.append(true);
                    self.enter(ButtonState::Pressed, now);
                    emitted = Some(self.result(ButtonState::Pressed));
                }
            }
            ButtonState::Pressed => {
                if elapsed_ms > u32::from(params.long_press_start_ms) {
                    self.history.append(true);
                    self.enter(ButtonState::LongPress, now);
                    self.repeat_count = 0;
                    emitted = Some(self.result(ButtonState::LongPress));
                } else if !pressed {
                    self.state = ButtonState::Release;
                }
            }
            ButtonState::LongPress => {
                if !pressed {
                    self.repeat_count = 0;
                    self.state = ButtonState::Release;
                } else if elapsed_ms > u32::from(params.long_press_repeat_ms) {
                    self.state_entry_time = now;
                    self.repeat_count = self.repeat_count.wrapping_add(1);

                    if self
                        .history
                        .low_bits_match(LONG_PRESS_START_PATTERN, LONG_PRESS_START_PATTERN_WIDTH)
                    {
                        self.history.append(true);
                    }

                    let mut result = self.result(ButtonState::LongPress);
                    result.repeat_count = self.repeat_count;
                    emitted = Some(result);
                }
            }
            ButtonState::Release => {
                self.history.append(false);
                emitted = Some(self.result(ButtonState::Release));
                self.enter(ButtonState::ReleaseWindow, now);
            }
            ButtonState::ReleaseWindow => {
                if pressed {
                    self.enter(ButtonState::Idle, now);
                } else if elapsed_ms > u32::from(params.time_window_ms) {
                    self.state = ButtonState::Finish;
                }
            }
            ButtonState::Finish => {
                emitted = Some(self.result(ButtonState::Finish));
                self.history.clear();
                self.state = ButtonState::Idle;
            }
        }

        if self.last_state != self.state {
            trace!("id[{}]: {} -> {}", self.id, self.last_state, self.state);
            self.last_state = self.state;
        }

        emitted
    }

    fn enter(&mut self, state: ButtonState, now: u32) {
        self.state = state;
        self.state_entry_time = now;
    }

    fn result(&self, event: ButtonState) -> ButtonResult {
        ButtonResult::new(self.id, event, self.history)
    }
}
