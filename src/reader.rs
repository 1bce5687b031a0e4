//! Raw level input.
//!
//! The engine never touches hardware; it asks a [`LevelReader`] for the raw
//! level of each button id once per tick and compares it against the
//! button's active level.

use embedded_hal::digital::InputPin;

use crate::ButtonId;

/// Source of raw button levels.
pub trait LevelReader {
    /// Current raw level of button `id` (usually 0 or 1).
    fn read_level(&mut self, id: ButtonId) -> u8;
}

impl<F> LevelReader for F
where
    F: FnMut(ButtonId) -> u8,
{
    fn read_level(&mut self, id: ButtonId) -> u8 {
        self(id)
    }
}

/// Reads levels from `embedded-hal` input pins, one pin per button id.
///
/// High reads as `1`, low as `0`. A pin error, or an id without a pin,
/// reads as `0`.
pub struct PinLevels<'a, P> {
    pins: &'a mut [(ButtonId, P)],
}

impl<'a, P: InputPin> PinLevels<'a, P> {
    pub fn new(pins: &'a mut [(ButtonId, P)]) -> Self {
        Self { pins }
    }
}

impl<P: InputPin> LevelReader for PinLevels<'_, P> {
    fn read_level(&mut self, id: ButtonId) -> u8 {
        let Some((_, pin)) = self.pins.iter_mut().find(|(pin_id, _)| *pin_id == id) else {
            return 0;
        };
        match pin.is_high() {
            Ok(high) => high as u8,
            Err(_) => {
                warn!("pin read failed for button {}", id);
                0
            }
        }
    }
}
