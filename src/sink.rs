//! Event routing.
//!
//! Every emitted result goes to the direct callback. Only some go to the
//! result channel: those accepted by the user filter if one is registered,
//! otherwise the settled ones ([`default_filter`]).

use core::fmt::{self, Write};

use crate::button::ButtonState;
use crate::channel::{NoChannel, ResultChannel};
use crate::result::ButtonResult;

/// Predicate deciding whether a result is written to the channel.
pub type ResultFilter = fn(&ButtonResult) -> bool;

/// Direct per-event callback.
pub type ResultCallback<'a> = &'a mut dyn FnMut(&ButtonResult);

/// Built-in channel filter: long presses (including repeats) and finished
/// sequences. Presses and releases reach the callback only.
pub fn default_filter(result: &ButtonResult) -> bool {
    matches!(result.event, ButtonState::LongPress | ButtonState::Finish)
}

static NO_CHANNEL: NoChannel = NoChannel;

pub(crate) struct EventSink<'a> {
    channel: &'a dyn ResultChannel,
    filter: Option<ResultFilter>,
    callback: Option<ResultCallback<'a>>,
    debug: Option<&'a mut dyn Write>,
}

impl<'a> EventSink<'a> {
    pub(crate) fn new(
        channel: Option<&'a dyn ResultChannel>,
        filter: Option<ResultFilter>,
        callback: Option<ResultCallback<'a>>,
        debug: Option<&'a mut dyn Write>,
    ) -> Self {
        Self {
            channel: channel.unwrap_or(&NO_CHANNEL),
            filter,
            callback,
            debug,
        }
    }

    pub(crate) fn channel(&self) -> &'a dyn ResultChannel {
        self.channel
    }

    pub(crate) fn set_filter(&mut self, filter: ResultFilter) {
        self.filter = Some(filter);
    }

    /// Best-effort line on the debug sink.
    pub(crate) fn debug_line(&mut self, args: fmt::Arguments<'_>) {
        if let Some(out) = self.debug.as_mut() {
            let _ = out.write_fmt(args);
            let _ = out.write_str("\n");
        }
    }

    pub(crate) fn report(&mut self, result: &ButtonResult) {
        debug!(
            "key id[{}], event: {}, long trigger cnt: {}, key value: {=u32:b}",
            result.id,
            result.event,
            result.repeat_count,
            result.history.bits()
        );
        self.debug_line(format_args!("{}", result));

        let accept = self.filter.unwrap_or(default_filter);
        if accept(result) {
            self.channel.write(result);
        }

        if let Some(callback) = self.callback.as_mut() {
            callback(result);
        }
    }
}
