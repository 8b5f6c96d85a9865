// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! PCI Express host bridges, one per `device_type = "pci"` node.

use log::{debug, error, trace};

use super::{display_name, required_property, DEVICE_TYPE, REG};
use crate::{
    tables::{PcieInfoEntry, PcieInfoTable},
    ExtractError, Fdt, NodeRef,
};

const PCI: &[u8] = b"pci\0";
const BUS_RANGE: &str = "bus-range";

/// Host bridges describe child addresses as `phys.hi phys.mid phys.lo`
const PCI_ADDRESS_CELLS: u32 = 3;
const PCI_SIZE_CELLS: u32 = 2;

/// ECAM window base, cells 0..2 of `reg`
const ECAM_BASE: usize = 0;
const BUS_START: usize = 0;
const BUS_END: usize = 1;

/// Fills `table` with every PCI host bridge node, in tree order
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut PcieInfoTable<'_>) -> Result<(), ExtractError> {
    let mut offset = fdt.node_offset_by_prop_value(None, DEVICE_TYPE, PCI)?;
    if offset.is_none() {
        debug!("no pci nodes found");
    }

    while let Some(node) = offset {
        trace!("pci node {} at {:#x}", display_name(fdt, node), node.offset());

        check_cell_widths(fdt, node)?;

        let ecam_base = required_property(fdt, node, REG)?.u64_at(ECAM_BASE)?;
        let bus_range = required_property(fdt, node, BUS_RANGE)?;
        let start_bus_num = bus_range.cell(BUS_START)?;
        let end_bus_num = bus_range.cell(BUS_END)?;

        table.push(PcieInfoEntry { ecam_base, segment_num: 0, start_bus_num, end_bus_num })?;
        table.header.num_entries += 1;

        offset = fdt.node_offset_by_prop_value(Some(node), DEVICE_TYPE, PCI)?;
    }

    debug!("PCIe table: {} entries", table.header.num_entries);
    for entry in table.entries() {
        debug!(
            "  ECAM {:#x} segment {} buses {:#x}..={:#x}",
            entry.ecam_base, entry.segment_num, entry.start_bus_num, entry.end_bus_num
        );
    }

    Ok(())
}

fn check_cell_widths(fdt: &Fdt<'_>, node: NodeRef) -> Result<(), ExtractError> {
    let size_cells = fdt.size_cells(node)?;
    if size_cells != PCI_SIZE_CELLS {
        error!("invalid #size-cells {} on {}", size_cells, display_name(fdt, node));
        return Err(ExtractError::InvalidCellWidth { property: "#size-cells", found: size_cells });
    }

    let address_cells = fdt.address_cells(node)?;
    if address_cells != PCI_ADDRESS_CELLS {
        error!("invalid #address-cells {} on {}", address_cells, display_name(fdt, node));
        return Err(ExtractError::InvalidCellWidth { property: "#address-cells", found: address_cells });
    }

    Ok(())
}
