//! Ring buffer guarded by a critical section.
//!
//! For single-core parts without compare-and-swap (Cortex-M0/M0+) where the
//! consumer may be preempted by the tick interrupt. Each operation runs with
//! interrupts masked, so it is also safe with several readers.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use super::ResultChannel;
use crate::config::RESULT_BUFFER_SIZE;
use crate::result::ButtonResult;

struct Inner<const N: usize> {
    queue: Deque<ButtonResult, N>,
    overwrites: usize,
}

/// `N`-record ring with the same overwrite semantics as [`RingBuffer`](super::RingBuffer).
pub struct CsRingBuffer<const N: usize = RESULT_BUFFER_SIZE> {
    inner: Mutex<RefCell<Inner<N>>>,
}

impl<const N: usize> CsRingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                queue: Deque::new(),
                overwrites: 0,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}

impl<const N: usize> Default for CsRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResultChannel for CsRingBuffer<N> {
    fn init(&self) {
        self.with(|inner| {
            inner.queue.clear();
            inner.overwrites = 0;
        });
    }

    fn write(&self, result: &ButtonResult) -> bool {
        self.with(|inner| {
            if inner.queue.is_full() {
                inner.queue.pop_front();
                inner.overwrites += 1;
            }
            inner.queue.push_back(*result).is_ok()
        })
    }

    fn read(&self) -> Option<ButtonResult> {
        self.with(|inner| inner.queue.pop_front())
    }

    fn peek(&self) -> Option<ButtonResult> {
        self.with(|inner| inner.queue.front().copied())
    }

    fn is_empty(&self) -> bool {
        self.with(|inner| inner.queue.is_empty())
    }

    fn is_full(&self) -> bool {
        self.with(|inner| inner.queue.is_full())
    }

    fn len(&self) -> usize {
        self.with(|inner| inner.queue.len())
    }

    fn capacity(&self) -> usize {
        N
    }

    fn clear(&self) {
        self.with(|inner| inner.queue.clear());
    }

    fn overwrite_count(&self) -> usize {
        self.with(|inner| inner.overwrites)
    }
}
