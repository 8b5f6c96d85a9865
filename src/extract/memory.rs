// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! System RAM and reserved DMA pools.
//!
//! Two passes: every `device_type = "memory"` node first, tagged
//! [`MemoryKind::Normal`], then every `shared-dma-pool` node, tagged
//! [`MemoryKind::Reserved`]. Only the first region of each `reg` is read.

use log::{debug, trace};

use super::{display_name, required_property, DEVICE_TYPE, REG};
use crate::{
    tables::{MemoryInfoEntry, MemoryInfoTable, MemoryKind},
    ExtractError, Fdt, NodeRef,
};

const MEMORY: &[u8] = b"memory\0";
const SHARED_DMA_POOL: &str = "shared-dma-pool";

/// Region base, cells 0..2 of `reg`
const REGION_BASE: usize = 0;
/// Low word of the region size
const REGION_SIZE: usize = 3;

/// Appends every memory and DMA pool region to `table`
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut MemoryInfoTable<'_>) -> Result<(), ExtractError> {
    let mut offset = fdt.node_offset_by_prop_value(None, DEVICE_TYPE, MEMORY)?;
    while let Some(node) = offset {
        push_region(fdt, table, node, MemoryKind::Normal)?;
        offset = fdt.node_offset_by_prop_value(Some(node), DEVICE_TYPE, MEMORY)?;
    }

    let mut offset = fdt.node_offset_by_compatible(None, SHARED_DMA_POOL)?;
    while let Some(node) = offset {
        push_region(fdt, table, node, MemoryKind::Reserved)?;
        offset = fdt.node_offset_by_compatible(Some(node), SHARED_DMA_POOL)?;
    }

    debug!("memory table: {} entries", table.len());
    for region in table.entries() {
        debug!("  {:?}: {:#x} size {:#x}", region.kind, region.phy_addr, region.size);
    }

    Ok(())
}

fn push_region(
    fdt: &Fdt<'_>,
    table: &mut MemoryInfoTable<'_>,
    node: NodeRef,
    kind: MemoryKind,
) -> Result<(), ExtractError> {
    trace!("{:?} memory node {} at {:#x}", kind, display_name(fdt, node), node.offset());

    let reg = required_property(fdt, node, REG)?;
    let phy_addr = reg.u64_at(REGION_BASE)?;
    let size = u64::from(reg.cell(REGION_SIZE)?);

    table.push(MemoryInfoEntry { kind, phy_addr, virt_addr: phy_addr, size })
}
