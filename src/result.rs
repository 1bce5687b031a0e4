//! Classified button events.

use core::fmt;

use crate::bits::HistoryBits;
use crate::button::ButtonState;
use crate::ButtonId;

/// One classified event, as handed to the result callback and the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonResult {
    /// Id of the plain button or combo that emitted the event.
    pub id: ButtonId,
    /// State the entity was in when the event was emitted.
    pub event: ButtonState,
    /// History snapshot at emission time.
    pub history: HistoryBits,
    /// Number of long-press repeats so far (LongPress events only).
    pub repeat_count: u16,
}

impl ButtonResult {
    pub const EMPTY: Self = Self {
        id: 0,
        event: ButtonState::Idle,
        history: HistoryBits::EMPTY,
        repeat_count: 0,
    };

    pub const fn new(id: ButtonId, event: ButtonState, history: HistoryBits) -> Self {
        Self {
            id,
            event,
            history,
            repeat_count: 0,
        }
    }

    /// `true` for a Finish event whose history equals `pattern`.
    pub fn is_finished(&self, pattern: HistoryBits) -> bool {
        self.event == ButtonState::Finish && self.history == pattern
    }
}

impl Default for ButtonResult {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for ButtonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key id[{}], event: {:?}, long trigger cnt: {}, key value: {}",
            self.id, self.event, self.repeat_count, self.history
        )
    }
}
