// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

use thiserror_no_std::Error;

use crate::FdtError;

/// Reasons an extractor stops early.
///
/// Every variant is fail-fast: the table keeps the entries written before the
/// offending node and nothing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A matched node lacks a property (or parent) its class requires
    #[error("matched node is missing its `{property}`")]
    NodeNotFound { property: &'static str },
    /// An address, size or interrupt cell count is outside what the class allows
    #[error("`{property}` is {found}, which this node class doesn't support")]
    InvalidCellWidth { property: &'static str, found: u32 },
    /// Watchdog interrupt flags that map to no trigger mode/polarity pair
    #[error("unrecognized interrupt flags {0:#x}")]
    UnrecognizedInterruptFlag(u32),
    /// A property payload is shorter than its layout requires
    #[error("`{property}` holds {found} cells but at least {expected} are needed")]
    TruncatedProperty { property: &'static str, expected: usize, found: usize },
    /// The caller's table has no slot left for the next entry
    #[error("table is full ({capacity} entries)")]
    TableFull { capacity: usize },
    /// The blob itself could not be walked
    #[error("{0}")]
    Fdt(#[from] FdtError),
}
