// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! SBSA generic watchdogs (`arm,sbsa-gwdt`).
//!
//! Each watchdog has two frames in its `reg`, control first and refresh
//! second, and a single 3-cell GIC interrupt specifier. The specifier's flag
//! cell is folded into the two-bit `flags` field of the table entry.

use log::{debug, error, trace};

use super::{display_name, required_property, INTERRUPTS, REG};
use crate::{
    tables::{WatchdogInfoEntry, WatchdogInfoTable},
    ExtractError, Fdt,
};

const SBSA_GWDT: &str = "arm,sbsa-gwdt";

/// Control frame base, cells 0..2 of `reg`
const CONTROL_BASE: usize = 0;
/// Refresh frame base, cells 4..6 of `reg`
const REFRESH_BASE: usize = 4;

/// Interrupt number, the second cell of the specifier
const INTERRUPT_ID: usize = 1;
/// Trigger type, the third cell of the specifier
const INTERRUPT_FLAGS: usize = 2;

/// Values of the interrupt specifier's flag cell
mod irq_type {
    pub const NONE: u32 = 0x0;
    pub const EDGE_RISING: u32 = 0x1;
    pub const EDGE_FALLING: u32 = 0x2;
    pub const LEVEL_HIGH: u32 = 0x4;
    pub const LEVEL_LOW: u32 = 0x8;
}

/// Bit 0 of [`WatchdogInfoEntry::flags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TriggerMode {
    Edge = 0,
    Level = 1,
}

/// Bit 1 of [`WatchdogInfoEntry::flags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Polarity {
    ActiveHigh = 0,
    ActiveLow = 1,
}

/// Splits an interrupt specifier flag cell into its trigger mode and
/// polarity. `IRQ_TYPE_NONE` and combined or unknown values are rejected.
pub fn decode_interrupt_flags(flags: u32) -> Result<(TriggerMode, Polarity), ExtractError> {
    match flags {
        irq_type::EDGE_RISING => Ok((TriggerMode::Edge, Polarity::ActiveHigh)),
        irq_type::EDGE_FALLING => Ok((TriggerMode::Edge, Polarity::ActiveLow)),
        irq_type::LEVEL_HIGH => Ok((TriggerMode::Level, Polarity::ActiveHigh)),
        irq_type::LEVEL_LOW => Ok((TriggerMode::Level, Polarity::ActiveLow)),
        irq_type::NONE => {
            error!("watchdog interrupt has no trigger type");
            Err(ExtractError::UnrecognizedInterruptFlag(flags))
        }
        _ => {
            error!("invalid watchdog interrupt type {:#x}", flags);
            Err(ExtractError::UnrecognizedInterruptFlag(flags))
        }
    }
}

/// Packs a trigger mode and polarity the way the table stores them
pub const fn entry_flags(mode: TriggerMode, polarity: Polarity) -> u32 {
    ((polarity as u32) << 1) | mode as u32
}

/// Fills `table` with every `arm,sbsa-gwdt` node, in tree order.
///
/// A node is only counted once its flags have been decoded, so a bad
/// interrupt type stops the extraction with `num_wd` covering the nodes
/// before it.
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut WatchdogInfoTable<'_>) -> Result<(), ExtractError> {
    let mut offset = fdt.node_offset_by_compatible(None, SBSA_GWDT)?;
    if offset.is_none() {
        debug!("no {} nodes found", SBSA_GWDT);
    }

    while let Some(node) = offset {
        trace!("watchdog {} node {} at {:#x}", table.header.num_wd, display_name(fdt, node), node.offset());

        let reg = required_property(fdt, node, REG)?;
        let interrupts = required_property(fdt, node, INTERRUPTS)?;

        let control_base = reg.u64_at(CONTROL_BASE)?;
        let refresh_base = reg.u64_at(REFRESH_BASE)?;
        let gsiv = interrupts.cell(INTERRUPT_ID)?;
        let (mode, polarity) = decode_interrupt_flags(interrupts.cell(INTERRUPT_FLAGS)?)?;

        table.push(WatchdogInfoEntry { refresh_base, control_base, gsiv, flags: entry_flags(mode, polarity) })?;
        table.header.num_wd += 1;

        offset = fdt.node_offset_by_compatible(Some(node), SBSA_GWDT)?;
    }

    debug!("watchdog table: {} entries", table.header.num_wd);
    for wd in table.entries() {
        debug!(
            "  refresh {:#x} control {:#x} gsiv {} flags {:#x}",
            wd.refresh_base, wd.control_base, wd.gsiv, wd.flags
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_cell_mapping() {
        let packed = |flags| decode_interrupt_flags(flags).map(|(m, p)| entry_flags(m, p));

        assert_eq!(packed(irq_type::EDGE_RISING), Ok(0));
        assert_eq!(packed(irq_type::EDGE_FALLING), Ok(2));
        assert_eq!(packed(irq_type::LEVEL_HIGH), Ok(1));
        assert_eq!(packed(irq_type::LEVEL_LOW), Ok(3));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert_eq!(decode_interrupt_flags(0), Err(ExtractError::UnrecognizedInterruptFlag(0)));
        assert_eq!(decode_interrupt_flags(3), Err(ExtractError::UnrecognizedInterruptFlag(3)));
        assert_eq!(decode_interrupt_flags(0x10), Err(ExtractError::UnrecognizedInterruptFlag(0x10)));
    }
}
