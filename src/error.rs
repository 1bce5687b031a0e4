//! Engine initialisation errors.
//!
//! We avoid `alloc` - all variants carry only fixed-size data. Each variant
//! maps to a distinct negative code for callers that report plain integers.

use core::fmt;

use crate::ButtonId;

/// Reasons `EngineBuilder::build` can refuse to create an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// A combo lists a member id that is not in the button table.
    UnknownComboMember(ButtonId),

    /// The button table is empty, a combo has no members, or the tick
    /// interval is zero.
    InvalidArgument,

    /// More combos than `config::MAX_COMBO_BUTTONS`.
    TooManyCombos,

    /// No result channel backend was chosen before `build()`.
    MissingChannel,

    /// More plain buttons than the mask has bits.
    TooManyButtons,
}

impl InitError {
    /// Negative result code of this error.
    pub const fn code(&self) -> i32 {
        match self {
            InitError::UnknownComboMember(_) => -1,
            InitError::InvalidArgument => -2,
            InitError::TooManyCombos => -3,
            InitError::MissingChannel => -4,
            InitError::TooManyButtons => -5,
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::UnknownComboMember(id) => {
                write!(f, "combo member {} is not a known button", id)
            }
            InitError::InvalidArgument => f.write_str("invalid init parameters"),
            InitError::TooManyCombos => write!(
                f,
                "too many combo buttons (max {})",
                crate::config::MAX_COMBO_BUTTONS
            ),
            InitError::MissingChannel => f.write_str("no result channel backend registered"),
            InitError::TooManyButtons => write!(
                f,
                "too many buttons (max {})",
                crate::bits::ButtonMask::WIDTH
            ),
        }
    }
}
