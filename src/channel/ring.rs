//! Lock-free single-producer / single-consumer ring buffer.
//!
//! The producer owns the write cursor. The read cursor is shared: the
//! consumer advances it after copying a record out, and the producer
//! advances it when it has to drop the oldest record. Both do so with a
//! compare-exchange, so a consumer that raced an overwrite sees its
//! exchange fail and retries on the next record instead of returning a
//! slot that is being rewritten.
//!
//! Requires atomic compare-and-swap (Cortex-M3 and up, every host). Use
//! `CsRingBuffer` on cores without it.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use super::{cursor, ResultChannel};
use crate::config::RESULT_BUFFER_SIZE;
use crate::result::ButtonResult;

/// Ring buffer holding up to `N` results, overwriting the oldest when full.
pub struct RingBuffer<const N: usize = RESULT_BUFFER_SIZE> {
    slots: [UnsafeCell<ButtonResult>; N],
    read: AtomicUsize,
    write: AtomicUsize,
    overwrites: AtomicUsize,
}

// SAFETY: slots are only written by the single producer at the write
// cursor, which the consumer never reads past, except while overwriting.
// Then the producer rewrites the oldest slot after moving the read cursor
// past it, and a consumer copying that slot at the same moment races with
// the write. This is the seqlock pattern and relies on volatile access:
// the copy is discarded because the consumer's exchange on the read cursor
// fails. Strictly the overlap is still a data race under the Rust memory
// model; the discard only guarantees a torn value is never returned.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_OK: () = assert!(N > 0, "RingBuffer capacity must be non-zero");

    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            slots: [const { UnsafeCell::new(ButtonResult::EMPTY) }; N],
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
            overwrites: AtomicUsize::new(0),
        }
    }

    fn load_slot(&self, index: usize) -> ButtonResult {
        // SAFETY: see the `Sync` impl. The copy may overlap a producer
        // overwrite; callers drop it unless their exchange succeeds.
        unsafe { core::ptr::read_volatile(self.slots[cursor::slot::<N>(index)].get()) }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResultChannel for RingBuffer<N> {
    fn init(&self) {
        self.read.store(0, Ordering::Relaxed);
        self.write.store(0, Ordering::Relaxed);
        self.overwrites.store(0, Ordering::Relaxed);
    }

    fn write(&self, result: &ButtonResult) -> bool {
        let write = self.write.load(Ordering::Relaxed);
        let mut read = self.read.load(Ordering::Acquire);

        while cursor::distance::<N>(write, read) >= N {
            let next = cursor::advance::<N>(read);
            match self
                .read
                .compare_exchange_weak(read, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    self.overwrites.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                // Either a spurious failure or the consumer made room.
                Err(actual) => read = actual,
            }
        }

        // SAFETY: the slot at the write cursor is not readable by the
        // consumer until the release store below publishes it.
        unsafe {
            core::ptr::write_volatile(self.slots[cursor::slot::<N>(write)].get(), *result);
        }
        self.write
            .store(cursor::advance::<N>(write), Ordering::Release);
        true
    }

    fn read(&self) -> Option<ButtonResult> {
        let mut read = self.read.load(Ordering::Acquire);
        loop {
            let write = self.write.load(Ordering::Acquire);
            if read == write {
                return None;
            }
            let value = self.load_slot(read);
            match self.read.compare_exchange(
                read,
                cursor::advance::<N>(read),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(value),
                // The producer dropped this record while we copied it.
                Err(actual) => read = actual,
            }
        }
    }

    fn peek(&self) -> Option<ButtonResult> {
        let mut read = self.read.load(Ordering::Acquire);
        loop {
            let write = self.write.load(Ordering::Acquire);
            if read == write {
                return None;
            }
            let value = self.load_slot(read);
            let now = self.read.load(Ordering::Acquire);
            if now == read {
                return Some(value);
            }
            read = now;
        }
    }

    fn is_empty(&self) -> bool {
        self.read.load(Ordering::Relaxed) == self.write.load(Ordering::Relaxed)
    }

    fn is_full(&self) -> bool {
        self.len() >= N
    }

    fn len(&self) -> usize {
        // Read first: a stale read cursor can only overstate the length.
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        cursor::distance::<N>(write, read).min(N)
    }

    fn capacity(&self) -> usize {
        N
    }

    fn clear(&self) {
        let write = self.write.load(Ordering::Acquire);
        self.read.store(write, Ordering::Release);
    }

    fn overwrite_count(&self) -> usize {
        self.overwrites.load(Ordering::Relaxed)
    }
}
