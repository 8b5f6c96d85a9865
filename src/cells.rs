// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of big-endian cell sequences into 64-bit values.
//!
//! A devicetree address or size is one or more 32-bit big-endian "cells"
//! concatenated together; how many is declared per node through
//! `#address-cells` and `#size-cells`. Only one and two cell values are
//! meaningful to the info tables, which is what [`CellWidth`] captures.

use crate::ExtractError;

/// Number of cells making up a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellWidth {
    One,
    Two,
}

impl CellWidth {
    /// Maps a `#*-cells` property value onto a width, if it is 1 or 2
    pub const fn from_cells(cells: u32) -> Option<Self> {
        match cells {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    pub const fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Bit masks applied to the high and low word before they are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellMask {
    pub high: u32,
    pub low: u32,
}

impl CellMask {
    pub const NONE: Self = Self::new(u32::MAX, u32::MAX);

    pub const fn new(high: u32, low: u32) -> Self {
        Self { high, low }
    }
}

/// Combines `words` into a single value.
///
/// A one cell value is `words[0] & mask.low`; a two cell value is
/// `(words[0] & mask.high) << 32 | (words[1] & mask.low)`. The second word is
/// ignored for one cell values.
pub const fn decode(width: CellWidth, words: [u32; 2], mask: CellMask) -> u64 {
    match width {
        CellWidth::One => (words[0] & mask.low) as u64,
        CellWidth::Two => (((words[0] & mask.high) as u64) << 32) | (words[1] & mask.low) as u64,
    }
}

/// A property payload viewed as a sequence of big-endian cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cells<'a> {
    property: &'static str,
    data: &'a [u8],
}

impl<'a> Cells<'a> {
    pub fn new(property: &'static str, data: &'a [u8]) -> Self {
        Self { property, data }
    }

    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Number of whole cells in the payload; a trailing partial cell is ignored
    pub fn len(&self) -> usize {
        self.data.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        let start = index.checked_mul(4)?;
        match self.data.get(start..start.checked_add(4)?)? {
            [a, b, c, d] => Some(u32::from_be_bytes([*a, *b, *c, *d])),
            _ => None,
        }
    }

    /// Fails unless the payload holds at least `count` whole cells
    pub fn require(&self, count: usize) -> Result<(), ExtractError> {
        match self.len() >= count {
            true => Ok(()),
            false => {
                Err(ExtractError::TruncatedProperty { property: self.property, expected: count, found: self.len() })
            }
        }
    }

    /// The cell at `index`, failing when the payload is too short
    pub fn cell(&self, index: usize) -> Result<u32, ExtractError> {
        self.get(index).ok_or(ExtractError::TruncatedProperty {
            property: self.property,
            expected: index + 1,
            found: self.len(),
        })
    }

    /// Decodes the `width`-cell value starting at `index`
    pub fn value(&self, index: usize, width: CellWidth, mask: CellMask) -> Result<u64, ExtractError> {
        let high = self.cell(index)?;
        let low = match width {
            CellWidth::One => 0,
            CellWidth::Two => self.cell(index + 1)?,
        };

        Ok(decode(width, [high, low], mask))
    }

    /// Unmasked two cell value starting at `index`, the layout of every 64-bit
    /// base address the tables record
    pub fn u64_at(&self, index: usize) -> Result<u64, ExtractError> {
        self.value(index, CellWidth::Two, CellMask::NONE)
    }
}
