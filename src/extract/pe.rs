// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Processing elements, one per `device_type = "cpu"` node.

use log::{debug, error, trace};

use super::{display_name, required_property, DEVICE_TYPE, REG};
use crate::{
    cells::{CellMask, CellWidth},
    tables::{PeInfoEntry, PeInfoTable},
    ExtractError, Fdt,
};

const CPU: &[u8] = b"cpu\0";

/// CPU `reg` entries are bare IDs with no size cells
const CPU_SIZE_CELLS: u32 = 0;

/// Keeps Aff3 from the high word and Aff2..Aff0 from the low word
const MPIDR_MASK: CellMask = CellMask::new(0xFF, 0x00FF_FFFF);

/// Fills `table` with every CPU node, in tree order.
///
/// The cell layout is validated once, on the first CPU: its parent must have
/// `#size-cells = <0>` and the node's own `#address-cells` must be 1 or 2.
/// That width then decodes every CPU's `reg`.
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut PeInfoTable<'_>) -> Result<(), ExtractError> {
    let mut offset = fdt.node_offset_by_prop_value(None, DEVICE_TYPE, CPU)?;

    let Some(first) = offset else {
        debug!("no cpu nodes found");
        return Ok(());
    };

    let parent = fdt.parent_offset(first)?.ok_or(ExtractError::NodeNotFound { property: "parent" })?;
    let size_cells = fdt.size_cells(parent)?;
    if size_cells != CPU_SIZE_CELLS {
        error!("invalid #size-cells {} on cpu parent {}", size_cells, display_name(fdt, parent));
        return Err(ExtractError::InvalidCellWidth { property: "#size-cells", found: size_cells });
    }

    let address_cells = fdt.address_cells(first)?;
    let Some(width) = CellWidth::from_cells(address_cells) else {
        error!("invalid #address-cells {} on {}", address_cells, display_name(fdt, first));
        return Err(ExtractError::InvalidCellWidth { property: "#address-cells", found: address_cells });
    };

    let mask = match width {
        CellWidth::One => CellMask::NONE,
        CellWidth::Two => MPIDR_MASK,
    };

    while let Some(node) = offset {
        trace!("cpu node {} at {:#x}", display_name(fdt, node), node.offset());

        let mpidr = required_property(fdt, node, REG)?.value(0, width, mask)?;
        table.push(PeInfoEntry { pe_num: table.header.num_of_pe, mpidr, pmu_gsiv: 0 })?;
        table.header.num_of_pe += 1;

        offset = fdt.node_offset_by_prop_value(Some(node), DEVICE_TYPE, CPU)?;
    }

    debug!("PE table: {} entries", table.header.num_of_pe);
    for pe in table.entries() {
        debug!("  PE {}: MPIDR {:#x}", pe.pe_num, pe.mpidr);
    }

    Ok(())
}
