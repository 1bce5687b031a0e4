//! The per-tick engine.
//!
//! Once per tick the engine samples every plain button into a mask, waits
//! for that mask to stay stable for the debounce window, then resolves
//! combos (most members first) and steps every button that no active combo
//! suppresses. Emitted results go through the event sink.
//!
//! ```text
//!  tick() ─▶ sample ─▶ debounce gate ─▶ combos ─▶ plain buttons ─▶ sink
//!                                          │            ▲
//!                                          └─suppress───┘
//! ```


use core::cmp::Reverse;
use core::fmt::Write;

use heapless::Vec;

use crate::bits::ButtonMask;
use crate::button::{Button, ComboButton};
use crate::channel::ResultChannel;
use crate::config::{Timing, MAX_COMBO_BUTTONS};
use crate::error::InitError;
use crate::reader::LevelReader;
use crate::result::ButtonResult;
use crate::sink::{EventSink, ResultCallback, ResultFilter};
use crate::ButtonId;

/// Which result channel backend an engine writes to.
enum ChannelChoice<'a> {
    Unset,
    Disabled,
    Attached(&'a dyn ResultChannel),
}

/// Collects the tables and collaborators of an [`Engine`].
///
/// A channel backend must be chosen explicitly, either with
/// [`channel`](Self::channel) or [`without_channel`](Self::without_channel).
/// There is no built-in default: `build()` fails with
/// [`InitError::MissingChannel`] when neither was called.
pub struct EngineBuilder<'a, 'p, R> {
    buttons: &'a mut [Button<'p>],
    combos: &'a mut [ComboButton<'p>],
    reader: R,
    channel: ChannelChoice<'a>,
    callback: Option<ResultCallback<'a>>,
    debug: Option<&'a mut dyn Write>,
    filter: Option<ResultFilter>,
    timing: Timing,
}

impl<'a, 'p, R: LevelReader> EngineBuilder<'a, 'p, R> {
    pub fn combos(mut self, combos: &'a mut [ComboButton<'p>]) -> Self {
        self.combos = combos;
        self
    }

    /// Write settled results to `channel`.
    pub fn channel(mut self, channel: &'a dyn ResultChannel) -> Self {
        self.channel = ChannelChoice::Attached(channel);
        self
    }

    /// Deliver results through the direct callback only.
    pub fn without_channel(mut self) -> Self {
        self.channel = ChannelChoice::Disabled;
        self
    }

    /// Callback invoked synchronously for every emitted result.
    pub fn on_result(mut self, callback: ResultCallback<'a>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Text sink for diagnostic lines. Output is best effort.
    pub fn debug_sink(mut self, out: &'a mut dyn Write) -> Self {
        self.debug = Some(out);
        self
    }

    /// Replace the default channel filter.
    pub fn result_filter(mut self, filter: ResultFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Validate the tables, resolve combo masks and priority, and reset the
    /// channel.
    pub fn build(mut self) -> Result<Engine<'a, 'p, R>, InitError> {
        let priority = match self.resolve() {
            Ok(priority) => priority,
            Err(err) => {
                warn!("engine init failed: {}", err);
                if let Some(out) = self.debug.as_mut() {
                    let _ = writeln!(out, "Error: {}", err);
                }
                return Err(err);
            }
        };

        let channel = match self.channel {
            ChannelChoice::Attached(channel) => {
                channel.init();
                Some(channel)
            }
            ChannelChoice::Disabled | ChannelChoice::Unset => None,
        };

        info!(
            "engine ready: {} buttons, {} combos",
            self.buttons.len(),
            self.combos.len()
        );

        Ok(Engine {
            buttons: self.buttons,
            combos: self.combos,
            priority,
            reader: self.reader,
            sink: EventSink::new(channel, self.filter, self.callback, self.debug),
            timing: self.timing,
            current_mask: ButtonMask::EMPTY,
            last_mask: ButtonMask::EMPTY,
            debounce_entry: 0,
            tick: 0,
        })
    }

    fn resolve(&mut self) -> Result<Vec<u16, MAX_COMBO_BUTTONS>, InitError> {
        if self.buttons.is_empty() {
            return Err(InitError::InvalidArgument);
        }
        if self.buttons.len() > ButtonMask::WIDTH {
            return Err(InitError::TooManyButtons);
        }
        if self.timing.tick_interval_ms == 0 {
            return Err(InitError::InvalidArgument);
        }
        if self.combos.len() > MAX_COMBO_BUTTONS {
            return Err(InitError::TooManyCombos);
        }

        for combo in self.combos.iter_mut() {
            if combo.members().is_empty() {
                return Err(InitError::InvalidArgument);
            }
            let mut mask = ButtonMask::EMPTY;
            for &member in combo.members() {
                let index = index_of(self.buttons, member)
                    .ok_or(InitError::UnknownComboMember(member))?;
                mask.insert(index);
            }
            combo.set_mask(mask);
        }

        if matches!(self.channel, ChannelChoice::Unset) {
            return Err(InitError::MissingChannel);
        }

        // Most members first; equal counts keep declaration order.
        let combos = &*self.combos;
        let mut priority: Vec<u16, MAX_COMBO_BUTTONS> = Vec::new();
        priority.extend(0..combos.len() as u16);
        priority.sort_unstable_by_key(|&i| (Reverse(combos[usize::from(i)].member_count()), i));

        debug!("combo priority: {=[?]}", &priority[..]);
        Ok(priority)
    }
}

fn index_of(buttons: &[Button<'_>], id: ButtonId) -> Option<usize> {
    buttons.iter().position(|button| button.id() == id)
}

/// Button event engine over caller-owned button and combo tables.
///
/// `tick()` is the producer side and must be called at the configured tick
/// interval. Results can be consumed through the direct callback, through
/// [`next_result`](Self::next_result), or by another context holding the
/// same channel.
pub struct Engine<'a, 'p, R> {
    buttons: &'a mut [Button<'p>],
    combos: &'a mut [ComboButton<'p>],
    priority: Vec<u16, MAX_COMBO_BUTTONS>,
    reader: R,
    sink: EventSink<'a>,
    timing: Timing,
    current_mask: ButtonMask,
    last_mask: ButtonMask,
    debounce_entry: u32,
    tick: u32,
}

impl<'a, 'p, R: LevelReader> Engine<'a, 'p, R> {
    pub fn builder(buttons: &'a mut [Button<'p>], reader: R) -> EngineBuilder<'a, 'p, R> {
        EngineBuilder {
            buttons,
            combos: &mut [],
            reader,
            channel: ChannelChoice::Unset,
            callback: None,
            debug: None,
            filter: None,
            timing: Timing::DEFAULT,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Tick path
    // ═══════════════════════════════════════════════════════════════════

    /// Sample, debounce and dispatch once. Never blocks.
    pub fn tick(&mut self) {
        let now = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let mask = self.sample();
        self.current_mask = mask;

        if mask != self.last_mask {
            self.debounce_entry = now;
            debug!("new mask {=u32:b}", mask.bits());
            self.sink.debug_line(format_args!("NEW MASK {:#b}", mask.bits()));
            self.last_mask = mask;
        }

        let stable_ms = self.timing.ticks_to_ms(now.wrapping_sub(self.debounce_entry));
        if stable_ms < self.timing.debounce_ms {
            return;
        }

        let suppressed = self.dispatch_combos();
        self.dispatch_buttons(suppressed);
    }

    fn sample(&mut self) -> ButtonMask {
        let mut mask = ButtonMask::EMPTY;
        for (index, button) in self.buttons.iter().enumerate() {
            if self.reader.read_level(button.id()) == button.active_level() {
                mask.insert(index);
            }
        }
        mask
    }

    /// Step combos in priority order and return the bits they suppress.
    fn dispatch_combos(&mut self) -> ButtonMask {
        let now = self.tick;
        let mut activated = ButtonMask::EMPTY;
        let mut suppressed = ButtonMask::EMPTY;

        for &index in self.priority.iter() {
            let combo = &mut self.combos[usize::from(index)];
            let mask = combo.mask();

            // A more specific combo already claimed one of these buttons.
            if activated.intersects(mask) {
                continue;
            }

            let pressed = self.current_mask.contains_all(mask);
            if let Some(result) = combo.button_mut().step(pressed, now, &self.timing) {
                self.sink.report(&result);
            }

            if pressed || !combo.button().history().is_empty() {
                activated |= mask;
                if combo.suppress() {
                    suppressed |= mask;
                }
            }
        }

        suppressed
    }

    fn dispatch_buttons(&mut self, suppressed: ButtonMask) {
        let now = self.tick;
        for (index, button) in self.buttons.iter_mut().enumerate() {
            if suppressed.contains(index) {
                continue;
            }
            let pressed = self.current_mask.contains(index);
            if let Some(result) = button.step(pressed, now, &self.timing) {
                self.sink.report(&result);
            }
        }
    }

    /// Return every entity to Idle and re-sync the masks with the live
    /// levels, so a button held across the reset does not produce a
    /// release. Meant for resuming from low power. Also clears the channel.
    pub fn reset_states(&mut self) {
        info!("resetting all button states");
        self.sink
            .debug_line(format_args!("Resetting all button states"));

        for button in self.buttons.iter_mut() {
            button.reset();
        }
        for combo in self.combos.iter_mut() {
            combo.button_mut().reset();
        }

        let mask = self.sample();
        self.current_mask = mask;
        self.last_mask = mask;
        self.debounce_entry = self.tick;

        self.sink.channel().clear();
    }

    /// Install a channel filter, replacing the built-in one.
    pub fn set_result_filter(&mut self, filter: ResultFilter) {
        self.sink.set_filter(filter);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Consumer side
    // ═══════════════════════════════════════════════════════════════════

    /// Pop the oldest result from the channel.
    pub fn next_result(&self) -> Option<ButtonResult> {
        self.sink.channel().read()
    }

    pub fn peek_result(&self) -> Option<ButtonResult> {
        self.sink.channel().peek()
    }

    /// Channel shared with other contexts. A disabled channel reads empty.
    pub fn channel(&self) -> &'a dyn ResultChannel {
        self.sink.channel()
    }

    pub fn results_empty(&self) -> bool {
        self.sink.channel().is_empty()
    }

    pub fn results_full(&self) -> bool {
        self.sink.channel().is_full()
    }

    pub fn results_len(&self) -> usize {
        self.sink.channel().len()
    }

    pub fn results_capacity(&self) -> usize {
        self.sink.channel().capacity()
    }

    pub fn overwrite_count(&self) -> usize {
        self.sink.channel().overwrite_count()
    }

    pub fn clear_results(&self) {
        self.sink.channel().clear();
    }

    // ═══════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════

    /// Number of `tick()` calls so far (wrapping).
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    pub fn current_mask(&self) -> ButtonMask {
        self.current_mask
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn buttons(&self) -> &[Button<'p>] {
        self.buttons
    }

    pub fn combos(&self) -> &[ComboButton<'p>] {
        self.combos
    }

    /// Combo table indices in dispatch order.
    pub fn combo_priority(&self) -> &[u16] {
        &self.priority
    }
}
