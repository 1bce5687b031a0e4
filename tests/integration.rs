//! End-to-end tests: simulated levels in, events out through the callback
//! and the result channel.

mod common;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;

use button_bits::{
    Button, ButtonId, ButtonParams, ButtonResult, ButtonState, ComboButton, Engine, HistoryBits,
    InitError, PinLevels, ResultChannel, RingBuffer, Timing,
};
use common::{click, pass_ms, run_ticks, Bench, FAST};
use embedded_hal::digital::{ErrorType, InputPin};

const A: ButtonId = 0;
const B: ButtonId = 1;
const C: ButtonId = 2;
const AB: ButtonId = 0x100;
const ABC: ButtonId = 0x101;

fn fast_buttons<const N: usize>() -> [Button<'static>; N] {
    core::array::from_fn(|i| Button::new(i as ButtonId, 1, &FAST))
}

// ═══════════════════════════════════════════════════════════════════════
// Click sequences
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn single_click_reaches_callback_and_channel() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 300);

    assert_eq!(
        bench.events_of(A),
        [ButtonState::Pressed, ButtonState::Release, ButtonState::Finish]
    );

    // Only the settled result is queued.
    assert_eq!(engine.results_len(), 1);
    let result = engine.next_result().expect("finished click");
    assert_eq!(result.id, A);
    assert!(result.is_finished(HistoryBits::SINGLE_CLICK));
    assert!(engine.results_empty());
}

#[test]
fn double_and_triple_click_histories() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 50);
    click(&bench, &mut engine, &[A], 60, 300);

    click(&bench, &mut engine, &[A], 60, 50);
    click(&bench, &mut engine, &[A], 60, 50);
    click(&bench, &mut engine, &[A], 60, 300);

    let double = ring.read().expect("double click");
    assert!(double.is_finished(HistoryBits::DOUBLE_CLICK));
    let triple = ring.read().expect("triple click");
    assert!(triple.is_finished(HistoryBits::TRIPLE_CLICK));
    assert_eq!(ring.read(), None);
}

#[test]
fn gap_longer_than_window_splits_clicks() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 300);
    click(&bench, &mut engine, &[A], 60, 300);

    assert_eq!(ring.len(), 2);
    while let Some(result) = ring.read() {
        assert!(result.is_finished(HistoryBits::SINGLE_CLICK));
    }
}

#[test]
fn long_press_repeats_until_release() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 400, 300);

    let results = bench.results();
    let long: Vec<&ButtonResult> = results
        .iter()
        .filter(|r| r.event == ButtonState::LongPress)
        .collect();
    assert!(long.len() >= 3, "expected repeats, got {long:?}");

    assert_eq!(long[0].repeat_count, 0);
    assert_eq!(long[0].history, HistoryBits::LONG_PRESS_START);
    assert_eq!(long[1].history, HistoryBits::LONG_PRESS_HOLD);
    for pair in long.windows(2) {
        assert!(pair[1].repeat_count > pair[0].repeat_count);
    }

    let tail: Vec<ButtonState> = results.iter().rev().take(2).map(|r| r.event).collect();
    assert_eq!(tail, [ButtonState::Finish, ButtonState::Release]);
    let finish = results.last().expect("finish");
    assert_eq!(finish.history, HistoryBits::LONG_PRESS_HOLD_END);
    assert_eq!(finish.repeat_count, 0);

    // Every long press event plus the finish went to the channel.
    assert_eq!(ring.len(), long.len() + 1);
}

#[test]
fn held_for_25_ticks_with_default_params_is_one_press() {
    static PARAMS: ButtonParams = ButtonParams::DEFAULT;

    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = [Button::new(A, 1, &PARAMS)];
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    bench.press(&[A]);
    run_ticks(&mut engine, 25);

    assert_eq!(bench.events(), [(A, ButtonState::Pressed)]);
    assert!(ring.is_empty());
}

#[test]
fn press_shorter_than_debounce_is_ignored() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<1>();
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    // 15 ms is three ticks, one short of the 20 ms window.
    click(&bench, &mut engine, &[A], 15, 300);

    assert!(bench.events().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Combos
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn suppressing_combo_hides_member_events() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<2>();
    let mut combos = [ComboButton::new(AB, 1, &FAST, &[A, B], true)];
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .combos(&mut combos)
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A, B], 60, 300);

    assert_eq!(
        bench.events(),
        [
            (AB, ButtonState::Pressed),
            (AB, ButtonState::Release),
            (AB, ButtonState::Finish),
        ]
    );
    let finish = bench.results().pop().expect("finish");
    assert_eq!(finish.history, HistoryBits::SINGLE_CLICK);

    // A member on its own behaves like a plain button again.
    bench.clear_log();
    click(&bench, &mut engine, &[A], 60, 300);
    assert_eq!(
        bench.events(),
        [
            (A, ButtonState::Pressed),
            (A, ButtonState::Release),
            (A, ButtonState::Finish),
        ]
    );
}

#[test]
fn non_suppressing_combo_reports_alongside_members() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<2>();
    let mut combos = [ComboButton::new(AB, 1, &FAST, &[A, B], false)];
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .combos(&mut combos)
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A, B], 60, 300);

    let expected = [ButtonState::Pressed, ButtonState::Release, ButtonState::Finish];
    assert_eq!(bench.events_of(AB), expected);
    assert_eq!(bench.events_of(A), expected);
    assert_eq!(bench.events_of(B), expected);

    // Combos are dispatched before plain buttons within a tick.
    assert_eq!(bench.events()[0], (AB, ButtonState::Pressed));
}

#[test]
fn larger_combo_wins_over_its_subset() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<3>();
    let mut combos = [
        ComboButton::new(AB, 1, &FAST, &[A, B], true),
        ComboButton::new(ABC, 1, &FAST, &[A, B, C], true),
    ];
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .combos(&mut combos)
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    assert_eq!(engine.combo_priority(), [1, 0]);

    click(&bench, &mut engine, &[A, B, C], 60, 300);
    assert_eq!(
        bench.events_of(ABC),
        [ButtonState::Pressed, ButtonState::Release, ButtonState::Finish]
    );
    assert!(bench.events_of(AB).is_empty());
    assert!(bench.events_of(A).is_empty());

    bench.clear_log();
    click(&bench, &mut engine, &[A, B], 60, 300);
    assert_eq!(
        bench.events_of(AB),
        [ButtonState::Pressed, ButtonState::Release, ButtonState::Finish]
    );
    assert!(bench.events_of(ABC).is_empty());
    assert!(bench.events_of(C).is_empty());
}

#[test]
fn unknown_combo_member_fails_build() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<2>();
    let mut combos = [ComboButton::new(AB, 1, &FAST, &[A, 7], true)];
    let err = Engine::builder(&mut buttons, bench.reader())
        .combos(&mut combos)
        .without_channel()
        .build()
        .err()
        .expect("member 7 does not exist");

    assert_eq!(err, InitError::UnknownComboMember(7));
    assert_eq!(err.code(), -1);
}

// ═══════════════════════════════════════════════════════════════════════
// Result channel
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn full_channel_overwrites_oldest() {
    let bench = Bench::new();
    let ring = RingBuffer::<2>::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .result_filter(|_| true)
        .build()
        .expect("valid tables");

    // Two separate clicks: six events into two slots.
    click(&bench, &mut engine, &[A], 60, 300);
    click(&bench, &mut engine, &[A], 60, 300);

    assert!(engine.results_full());
    assert_eq!(engine.overwrite_count(), 4);
    assert_eq!(engine.peek_result().map(|r| r.event), Some(ButtonState::Release));
    assert_eq!(engine.next_result().map(|r| r.event), Some(ButtonState::Release));
    assert_eq!(engine.next_result().map(|r| r.event), Some(ButtonState::Finish));
    assert_eq!(engine.next_result(), None);
}

#[test]
fn filter_can_be_swapped_at_runtime() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .build()
        .expect("valid tables");

    engine.set_result_filter(|r| r.event == ButtonState::Pressed);
    click(&bench, &mut engine, &[A], 60, 300);

    assert_eq!(engine.results_len(), 1);
    assert_eq!(engine.next_result().map(|r| r.event), Some(ButtonState::Pressed));
}

#[test]
fn disabled_channel_still_calls_back() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<1>();
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 300);

    assert_eq!(bench.events().len(), 3);
    assert_eq!(engine.results_capacity(), 0);
    assert_eq!(engine.next_result(), None);
    assert_eq!(engine.peek_result(), None);
}

/// Unbounded-ish backend living outside the crate.
struct LogChannel {
    queue: RefCell<VecDeque<ButtonResult>>,
    capacity: usize,
    overwrites: Cell<usize>,
    inits: Cell<usize>,
}

impl LogChannel {
    fn new(capacity: usize) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            capacity,
            overwrites: Cell::new(0),
            inits: Cell::new(0),
        }
    }
}

impl ResultChannel for LogChannel {
    fn init(&self) {
        self.inits.set(self.inits.get() + 1);
        self.queue.borrow_mut().clear();
        self.overwrites.set(0);
    }

    fn write(&self, result: &ButtonResult) -> bool {
        let mut queue = self.queue.borrow_mut();
        if queue.len() == self.capacity {
            queue.pop_front();
            self.overwrites.set(self.overwrites.get() + 1);
        }
        queue.push_back(*result);
        true
    }

    fn read(&self) -> Option<ButtonResult> {
        self.queue.borrow_mut().pop_front()
    }

    fn peek(&self) -> Option<ButtonResult> {
        self.queue.borrow().front().copied()
    }

    fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn is_full(&self) -> bool {
        self.queue.borrow().len() == self.capacity
    }

    fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    fn overwrite_count(&self) -> usize {
        self.overwrites.get()
    }
}

#[test]
fn external_channel_backend_is_used() {
    let bench = Bench::new();
    let log = LogChannel::new(64);
    log.write(&ButtonResult::EMPTY);

    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&log)
        .build()
        .expect("valid tables");

    // Build resets the backend.
    assert_eq!(log.inits.get(), 1);
    assert!(engine.results_empty());

    click(&bench, &mut engine, &[A], 60, 50);
    click(&bench, &mut engine, &[A], 60, 300);

    assert_eq!(engine.results_capacity(), 64);
    let result = engine.next_result().expect("double click");
    assert!(result.is_finished(HistoryBits::DOUBLE_CLICK));
    assert!(log.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Reset, inputs, diagnostics
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn reset_after_release_during_sleep_reports_nothing() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut record = bench.recorder();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    bench.press(&[A]);
    pass_ms(&mut engine, 60);
    assert_eq!(bench.events(), [(A, ButtonState::Pressed)]);

    // Released while the tick was stopped.
    bench.release(&[A]);
    engine.reset_states();
    bench.clear_log();

    pass_ms(&mut engine, 500);
    assert!(bench.events().is_empty());
    assert!(engine.results_empty());
}

#[test]
fn reset_with_button_held_does_not_release() {
    let bench = Bench::new();
    let mut buttons = fast_buttons::<2>();
    let mut record = bench.recorder();
    bench.press(&[B]);
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .without_channel()
        .on_result(&mut record)
        .build()
        .expect("valid tables");

    engine.reset_states();
    assert_eq!(engine.current_mask().bits(), 0b10);

    pass_ms(&mut engine, 60);
    assert_eq!(bench.events(), [(B, ButtonState::Pressed)]);
}

struct SharedPin<'a>(&'a Cell<bool>);

impl ErrorType for SharedPin<'_> {
    type Error = Infallible;
}

impl InputPin for SharedPin<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[test]
fn active_low_pins_through_pin_levels() {
    let line = Cell::new(true);
    let mut pins = [(A, SharedPin(&line))];
    let ring = RingBuffer::<10>::new();
    let mut buttons = [Button::new(A, 0, &FAST)];
    let mut engine = Engine::builder(&mut buttons, PinLevels::new(&mut pins))
        .channel(&ring)
        .build()
        .expect("valid tables");

    pass_ms(&mut engine, 100);
    assert!(engine.current_mask().is_empty());

    line.set(false);
    pass_ms(&mut engine, 60);
    line.set(true);
    pass_ms(&mut engine, 300);

    let result = engine.next_result().expect("click on a pulled-up pin");
    assert!(result.is_finished(HistoryBits::SINGLE_CLICK));
}

#[test]
fn slower_tick_interval_scales_timings() {
    let bench = Bench::new();
    let ring = RingBuffer::<10>::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .channel(&ring)
        .timing(Timing {
            tick_interval_ms: 10,
            debounce_ms: 20,
        })
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 50);
    click(&bench, &mut engine, &[A], 60, 300);

    let result = engine.next_result().expect("double click");
    assert!(result.is_finished(HistoryBits::DOUBLE_CLICK));
}

#[test]
fn debug_sink_traces_masks_and_events() {
    let bench = Bench::new();
    let mut out = String::new();
    let mut buttons = fast_buttons::<1>();
    let mut engine = Engine::builder(&mut buttons, bench.reader())
        .without_channel()
        .debug_sink(&mut out)
        .build()
        .expect("valid tables");

    click(&bench, &mut engine, &[A], 60, 300);
    drop(engine);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "NEW MASK 0b1");
    assert_eq!(
        lines[1],
        "key id[0], event: Pressed, long trigger cnt: 0, key value: 0b1"
    );
    assert!(lines.contains(&"NEW MASK 0b0"));
    assert_eq!(
        lines.last().copied(),
        Some("key id[0], event: Finish, long trigger cnt: 0, key value: 0b10")
    );
}
