// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Architected timer interrupts.

use log::{debug, error, trace};

use super::{display_name, required_property, INTERRUPTS};
use crate::{tables::TimerInfoTable, ExtractError, Fdt};

const ARMV8_TIMER: &str = "arm,armv8-timer";
const ARMV7_TIMER_MEM: &str = "arm,armv7-timer-mem";

/// `interrupts` holds four 3-cell GIC specifiers, in binding order. The
/// interrupt number is the second cell of each.
const SECURE_EL1: usize = 1;
const NON_SECURE_EL1: usize = 4;
const VIRTUAL: usize = 7;
const HYPERVISOR: usize = 10;
/// Four complete specifiers
const TIMER_INTERRUPT_CELLS: usize = 12;

/// Records the architected timer interrupts into `table`'s header.
///
/// When several `arm,armv8-timer` nodes exist, the last one's interrupts are
/// kept and `num_platform_timer` counts them all. Memory-mapped timers are
/// only checked for an `interrupts` property; nothing is recorded for them.
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut TimerInfoTable) -> Result<(), ExtractError> {
    let mut offset = fdt.node_offset_by_compatible(None, ARMV8_TIMER)?;
    if offset.is_none() {
        debug!("no {} node found", ARMV8_TIMER);
    }

    while let Some(node) = offset {
        trace!("timer node {} at {:#x}", display_name(fdt, node), node.offset());

        let interrupts = required_property(fdt, node, INTERRUPTS)?;
        if let Err(e) = interrupts.require(TIMER_INTERRUPT_CELLS) {
            error!(
                "{} has {} interrupt cells, expected {}",
                display_name(fdt, node),
                interrupts.len(),
                TIMER_INTERRUPT_CELLS
            );
            return Err(e);
        }

        let header = &mut table.header;
        header.s_el1_timer_gsiv = interrupts.cell(SECURE_EL1)?;
        header.ns_el1_timer_gsiv = interrupts.cell(NON_SECURE_EL1)?;
        header.virtual_timer_gsiv = interrupts.cell(VIRTUAL)?;
        header.el2_timer_gsiv = interrupts.cell(HYPERVISOR)?;
        header.num_platform_timer += 1;

        offset = fdt.node_offset_by_compatible(Some(node), ARMV8_TIMER)?;
    }

    let mut offset = fdt.node_offset_by_compatible(None, ARMV7_TIMER_MEM)?;
    while let Some(node) = offset {
        required_property(fdt, node, INTERRUPTS)?;
        debug!("memory-mapped timer {} not recorded", display_name(fdt, node));

        offset = fdt.node_offset_by_compatible(Some(node), ARMV7_TIMER_MEM)?;
    }

    let header = &table.header;
    debug!(
        "timer table: {} timer(s), S EL1 {} NS EL1 {} virtual {} EL2 {}",
        header.num_platform_timer,
        header.s_el1_timer_gsiv,
        header.ns_el1_timer_gsiv,
        header.virtual_timer_gsiv,
        header.el2_timer_gsiv
    );

    Ok(())
}
