//! Fixed-width bit containers.
//!
//! [`HistoryBits`] is the compact timeline of one press/release sequence:
//! every press appends a `1`, every release a `0`, a long press one more
//! `1`. Reading the bits most-significant first gives the sequence, e.g.
//! a double click is `0b1010`. The width (32 bits) bounds the longest
//! sequence that can be represented; older bits fall off the top.
//!
//! [`ButtonMask`] is a set over plain-button table indices.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Bit-encoded press/release history of one entity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HistoryBits(u32);

impl HistoryBits {
    /// Number of bits a history can hold.
    pub const WIDTH: u32 = u32::BITS;

    pub const EMPTY: Self = Self(0);

    /// Press, release.
    pub const SINGLE_CLICK: Self = Self(0b010);
    /// Two short clicks inside the time window.
    pub const DOUBLE_CLICK: Self = Self(0b01010);
    pub const TRIPLE_CLICK: Self = Self(0b0101010);
    /// Press held past the long-press start time.
    pub const LONG_PRESS_START: Self = Self(0b011);
    /// Long press that reached its first repeat.
    pub const LONG_PRESS_HOLD: Self = Self(0b0111);
    /// Long press with repeats, then released.
    pub const LONG_PRESS_HOLD_END: Self = Self(0b01110);
    pub const SINGLE_CLICK_THEN_LONG_PRESS: Self = Self(0b01011);
    pub const DOUBLE_CLICK_THEN_LONG_PRESS: Self = Self(0b0101011);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Shift in one observation at the least significant end.
    pub fn append(&mut self, bit: bool) {
        self.0 = (self.0 << 1) | bit as u32;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// `true` if the lowest `width` bits equal `pattern`.
    pub const fn low_bits_match(self, pattern: u32, width: u32) -> bool {
        let mask = if width >= Self::WIDTH {
            u32::MAX
        } else {
            (1u32 << width) - 1
        };
        self.0 & mask == pattern & mask
    }
}

impl fmt::Debug for HistoryBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HistoryBits({:#b})", self.0)
    }
}

impl fmt::Display for HistoryBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// Set of plain-button indices, one bit per index.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMask(u32);

impl ButtonMask {
    /// Maximum number of plain buttons an engine can track.
    pub const WIDTH: usize = u32::BITS as usize;

    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask with only `index` set. `index` must be below [`Self::WIDTH`].
    pub const fn bit(index: usize) -> Self {
        Self(1u32 << index)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, index: usize) -> bool {
        index < Self::WIDTH && self.0 & (1u32 << index) != 0
    }

    /// `true` if every bit of `other` is also set in `self`.
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, index: usize) {
        *self |= Self::bit(index);
    }
}

impl BitOr for ButtonMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ButtonMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ButtonMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ButtonMask({:#b})", self.0)
    }
}
