//! Named bit ranges over packed property words.
//!
//! HWP stores most record properties as packed `u8`/`u16`/`u32` words. Rather
//! than a hand-written accessor per flag, each record type declares a table of
//! [`BitRange`] entries and reads them through [`BitfieldView`].
//!
//! # Example
//!
//! ```
//! use hwp5::common::bitfield::{BitRange, BitfieldView};
//!
//! const SHADOW: BitRange = BitRange::flag(1, "shadow");
//! const SLASH: BitRange = BitRange::value(2, 3, "slash_shape");
//!
//! let view = BitfieldView::new(0b1_0110u16);
//! assert!(view.flag(SHADOW));
//! assert_eq!(view.get(SLASH), 0b101);
//! ```

/// Whether a range is read as a boolean flag or as a raw enum code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitSemantic {
    Flag,
    Value,
}

/// A named `(start, width)` slice of a packed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    /// Lowest bit of the range
    pub start: u8,
    /// Number of bits, at least 1
    pub width: u8,
    pub name: &'static str,
    pub semantic: BitSemantic,
}

impl BitRange {
    /// A single-bit boolean flag.
    pub const fn flag(bit: u8, name: &'static str) -> Self {
        Self {
            start: bit,
            width: 1,
            name,
            semantic: BitSemantic::Flag,
        }
    }

    /// A multi-bit field returned as its raw numeric code.
    pub const fn value(start: u8, width: u8, name: &'static str) -> Self {
        Self {
            start,
            width,
            name,
            semantic: BitSemantic::Value,
        }
    }

    /// Mask covering the range, already shifted into place.
    #[inline]
    pub const fn mask(&self) -> u64 {
        let bits = if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        };
        match bits.checked_shl(self.start as u32) {
            Some(mask) => mask,
            None => 0,
        }
    }

    #[inline]
    const fn end(&self) -> u16 {
        self.start as u16 + self.width as u16
    }

    /// Whether two ranges share any bit.
    pub const fn overlaps(&self, other: &BitRange) -> bool {
        (self.start as u16) < other.end() && (other.start as u16) < self.end()
    }
}

/// Read-only view over a packed unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfieldView {
    raw: u64,
    bits: u8,
}

impl BitfieldView {
    /// Wrap any unsigned property word.
    #[inline]
    pub fn new<T: Into<u64> + PackedWord>(raw: T) -> Self {
        Self {
            raw: raw.into(),
            bits: T::BITS,
        }
    }

    /// The untouched property word.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Width of the wrapped word in bits.
    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Right-shifted, masked value of `range`.
    ///
    /// Ranges reaching past the word width read the missing bits as zero.
    #[inline]
    pub fn get(&self, range: BitRange) -> u64 {
        if range.start >= self.bits {
            return 0;
        }
        (self.raw & range.mask()) >> range.start
    }

    /// Truthiness of `range`: any set bit in the range counts.
    #[inline]
    pub fn flag(&self, range: BitRange) -> bool {
        self.get(range) != 0
    }

    /// Iterate `(name, value)` over a table of ranges.
    pub fn entries<'t>(
        &self,
        table: &'t [BitRange],
    ) -> impl Iterator<Item = (&'static str, u64)> + 't {
        let view = *self;
        table.iter().map(move |range| (range.name, view.get(*range)))
    }

    /// Names of all set flags in `table`.
    pub fn set_flags(&self, table: &[BitRange]) -> Vec<&'static str> {
        table
            .iter()
            .filter(|range| range.semantic == BitSemantic::Flag && self.flag(**range))
            .map(|range| range.name)
            .collect()
    }
}

/// Unsigned integers usable as packed property words.
pub trait PackedWord {
    const BITS: u8;
}

impl PackedWord for u8 {
    const BITS: u8 = 8;
}

impl PackedWord for u16 {
    const BITS: u8 = 16;
}

impl PackedWord for u32 {
    const BITS: u8 = 32;
}

impl PackedWord for u64 {
    const BITS: u8 = 64;
}

/// True when no two ranges of `table` overlap and every width is non-zero.
///
/// Used by the tests of every record type that declares a table.
pub fn table_is_disjoint(table: &[BitRange]) -> bool {
    table.iter().enumerate().all(|(i, a)| {
        a.width >= 1 && table[i + 1..].iter().all(|b| !a.overlaps(b))
    })
}
