//! Result channel between the tick path and the consumer.
//!
//! The engine writes settled results from the tick context; a consumer
//! drains them from anywhere else. Backends:
//!
//! - [`RingBuffer`] - built-in lock-free SPSC ring with overwrite.
//! - [`CsRingBuffer`] - same semantics behind a critical section
//!   (feature `critical-section`), for cores without atomic CAS.
//! - [`NoChannel`] - disabled; only the direct callback sees results.
//! - anything else implementing [`ResultChannel`].
//!
//! All backends are single-producer / single-consumer. More than one
//! concurrent writer or reader is not supported and not detected.

mod ring;

#[cfg(feature = "critical-section")]
mod cs;


pub use ring::RingBuffer;

#[cfg(feature = "critical-section")]
pub use cs::CsRingBuffer;

use crate::result::ButtonResult;

/// Fixed-capacity FIFO of [`ButtonResult`]s.
///
/// Methods take `&self` so one instance (typically a `static`) can be
/// shared by the producer and the consumer.
pub trait ResultChannel {
    /// Reset cursors and counters. Called once by the engine on `build()`,
    /// before any concurrent access.
    fn init(&self) {
        self.clear();
    }

    /// Append `result`. A full channel drops its oldest record and bumps
    /// the overwrite counter. Returns `false` only if the backend cannot
    /// store anything at all.
    fn write(&self, result: &ButtonResult) -> bool;

    /// Pop the oldest record.
    fn read(&self) -> Option<ButtonResult>;

    /// Copy the oldest record without removing it.
    fn peek(&self) -> Option<ButtonResult>;

    fn is_empty(&self) -> bool;

    fn is_full(&self) -> bool;

    /// Number of unread records.
    fn len(&self) -> usize;

    fn capacity(&self) -> usize;

    /// Drop all unread records. The overwrite counter is kept.
    fn clear(&self);

    /// Records dropped because the channel was full.
    fn overwrite_count(&self) -> usize;
}

/// Disabled channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoChannel;

impl ResultChannel for NoChannel {
    fn write(&self, _result: &ButtonResult) -> bool {
        false
    }

    fn read(&self) -> Option<ButtonResult> {
        None
    }

    fn peek(&self) -> Option<ButtonResult> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn is_full(&self) -> bool {
        true
    }

    fn len(&self) -> usize {
        0
    }

    fn capacity(&self) -> usize {
        0
    }

    fn clear(&self) {}

    fn overwrite_count(&self) -> usize {
        0
    }
}

/// Cursor arithmetic shared by the ring backends.
///
/// Cursors run over `[0, 2 * N)` so that `read == write` means empty and a
/// distance of `N` means full, without sacrificing a slot and without a
/// discontinuity when a free-running counter would wrap.
pub(crate) mod cursor {
    pub const fn advance<const N: usize>(index: usize) -> usize {
        if index + 1 == 2 * N {
            0
        } else {
            index + 1
        }
    }

    pub const fn distance<const N: usize>(write: usize, read: usize) -> usize {
        if write >= read {
            write - read
        } else {
            write + 2 * N - read
        }
    }

    pub const fn slot<const N: usize>(index: usize) -> usize {
        index % N
    }
}
