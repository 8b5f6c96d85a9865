// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! GICv3 distributor, redistributor regions and ITS blocks.
//!
//! The GIC's `reg` is a list of regions, each a 2-cell base followed by a
//! 2-cell size:
//!
//! ```text
//! reg = <dist_hi dist_lo dist_size_hi dist_size_lo>,
//!       <rd0_hi  rd0_lo  rd0_size_hi  rd0_size_lo>,
//!       ...
//! ```
//!
//! The distributor always comes first, followed by the redistributor
//! regions. Only the low word of each size is recorded.

use log::{debug, error, trace};

use super::{display_name, required_property, REG};
use crate::{
    cells::Cells,
    tables::{GicEntryKind, GicInfoEntry, GicInfoTable},
    ExtractError, Fdt,
};

const GIC_V3: &str = "arm,gic-v3";
const GIC_V3_ITS: &str = "arm,gic-v3-its";

const GIC_VERSION: u32 = 3;
const MIN_INTERRUPT_CELLS: u32 = 3;

/// Cells per region: base (2) then size (2)
const REGION_CELLS: usize = 4;
/// Offset of the base address inside a region
const REGION_BASE: usize = 0;
/// Offset of the size's low word inside a region
const REGION_LENGTH: usize = 3;

const REDISTRIBUTOR_REGIONS: &str = "redistributor-regions";
/// Redistributor regions when `redistributor-regions` is absent
const SINGLE_REDISTRIBUTOR_REGION: usize = 1;
/// Redistributor regions when `redistributor-regions` is present. The value
/// of the property is not read.
const MULTI_REDISTRIBUTOR_REGIONS: usize = 2;

/// Fills `table` from the first `arm,gic-v3` node and every
/// `arm,gic-v3-its` node after it.
pub fn create_info_table(fdt: &Fdt<'_>, table: &mut GicInfoTable<'_>) -> Result<(), ExtractError> {
    let Some(gic) = fdt.node_offset_by_compatible(None, GIC_V3)? else {
        debug!("no {} node found", GIC_V3);
        return Ok(());
    };

    table.header.gic_version = GIC_VERSION;

    let interrupt_cells = fdt.interrupt_cells(gic)?;
    if interrupt_cells < MIN_INTERRUPT_CELLS {
        error!("invalid #interrupt-cells {} on {}", interrupt_cells, display_name(fdt, gic));
        return Err(ExtractError::InvalidCellWidth { property: "#interrupt-cells", found: interrupt_cells });
    }

    required_property(fdt, gic, "#address-cells")?;
    required_property(fdt, gic, "#size-cells")?;
    let reg = required_property(fdt, gic, REG)?;

    let redistributor_regions = match fdt.property(gic, REDISTRIBUTOR_REGIONS)? {
        Some(_) => MULTI_REDISTRIBUTOR_REGIONS,
        None => SINGLE_REDISTRIBUTOR_REGION,
    };
    trace!("{} has {} redistributor region(s)", display_name(fdt, gic), redistributor_regions);

    push_region(table, &reg, 0, GicEntryKind::Distributor)?;
    for region in 1..=redistributor_regions {
        push_region(table, &reg, region, GicEntryKind::Redistributor)?;
    }

    let mut offset = fdt.node_offset_by_compatible(Some(gic), GIC_V3_ITS)?;
    while let Some(its) = offset {
        trace!("ITS node {} at {:#x}", display_name(fdt, its), its.offset());

        let reg = required_property(fdt, its, REG)?;
        push_region(table, &reg, 0, GicEntryKind::Its)?;
        table.header.num_its += 1;

        offset = fdt.node_offset_by_compatible(Some(its), GIC_V3_ITS)?;
    }

    debug!("GIC table: version {}, {} ITS", table.header.gic_version, table.header.num_its);
    for entry in table.entries() {
        debug!("  {:?}: base {:#x} length {:#x}", entry.kind, entry.base, entry.length);
    }

    Ok(())
}

fn push_region(
    table: &mut GicInfoTable<'_>,
    reg: &Cells<'_>,
    region: usize,
    kind: GicEntryKind,
) -> Result<(), ExtractError> {
    let start = region * REGION_CELLS;
    let base = reg.u64_at(start + REGION_BASE)?;
    let length = reg.cell(start + REGION_LENGTH)?;

    table.push(GicInfoEntry { kind, base, length })
}
