//! Tick simulator shared by the integration tests.
//!
//! A [`Bench`] holds the simulated raw levels (one bit per button id,
//! active high) and a log of every result delivered to the callback. The
//! engine borrows both, so the test can keep flipping levels and reading
//! the log while the engine runs.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use button_bits::{ButtonId, ButtonParams, ButtonResult, ButtonState, Engine, LevelReader};

/// Short timings so sequences finish in a few dozen ticks:
/// long press after 100 ms, repeat every 50 ms, 100 ms time window.
pub const FAST: ButtonParams = ButtonParams {
    long_press_start_ms: 100,
    long_press_repeat_ms: 50,
    short_press_ms: 50,
    time_window_ms: 100,
};

#[derive(Default)]
pub struct Bench {
    levels: Cell<u32>,
    log: RefCell<Vec<ButtonResult>>,
}

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> impl FnMut(ButtonId) -> u8 + '_ {
        move |id| ((self.levels.get() >> id) & 1) as u8
    }

    pub fn recorder(&self) -> impl FnMut(&ButtonResult) + '_ {
        move |result| self.log.borrow_mut().push(*result)
    }

    pub fn press(&self, ids: &[ButtonId]) {
        for &id in ids {
            self.levels.set(self.levels.get() | 1 << id);
        }
    }

    pub fn release(&self, ids: &[ButtonId]) {
        for &id in ids {
            self.levels.set(self.levels.get() & !(1 << id));
        }
    }

    pub fn results(&self) -> Vec<ButtonResult> {
        self.log.borrow().clone()
    }

    /// `(id, event)` pairs in emission order.
    pub fn events(&self) -> Vec<(ButtonId, ButtonState)> {
        self.log.borrow().iter().map(|r| (r.id, r.event)).collect()
    }

    pub fn events_of(&self, id: ButtonId) -> Vec<ButtonState> {
        self.log
            .borrow()
            .iter()
            .filter(|r| r.id == id)
            .map(|r| r.event)
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

pub fn run_ticks<R: LevelReader>(engine: &mut Engine<'_, '_, R>, ticks: u32) {
    for _ in 0..ticks {
        engine.tick();
    }
}

/// Let `ms` of simulated time pass, rounding down to whole ticks.
pub fn pass_ms<R: LevelReader>(engine: &mut Engine<'_, '_, R>, ms: u32) {
    let ticks = ms / engine.timing().tick_interval_ms;
    run_ticks(engine, ticks);
}

/// Press, hold for `hold_ms`, release, then wait `gap_ms`.
pub fn click<R: LevelReader>(
    bench: &Bench,
    engine: &mut Engine<'_, '_, R>,
    ids: &[ButtonId],
    hold_ms: u32,
    gap_ms: u32,
) {
    bench.press(ids);
    pass_ms(engine, hold_ms);
    bench.release(ids);
    pass_ms(engine, gap_ms);
}
