// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Per hardware class extractors.
//!
//! Each submodule exposes a `create_info_table` entry point taking the blob
//! and the caller's table. They only share the navigator and the cell
//! decoder, never each other's output, and can be run in any order.

pub mod gic;
pub mod memory;
pub mod pcie;
pub mod pe;
pub mod timer;
pub mod watchdog;

use crate::{
    cells::Cells,
    tables::{GicInfoTable, MemoryInfoTable, PcieInfoTable, PeInfoTable, TimerInfoTable, WatchdogInfoTable},
    ExtractError, Fdt, NodeRef,
};

/// `device_type` property used to match CPU, PCI and memory nodes
pub(crate) const DEVICE_TYPE: &str = "device_type";
pub(crate) const REG: &str = "reg";
pub(crate) const INTERRUPTS: &str = "interrupts";

/// One extraction run, paired with the table it fills
#[derive(Debug)]
pub enum Extraction<'e, 't> {
    Pe(&'e mut PeInfoTable<'t>),
    Gic(&'e mut GicInfoTable<'t>),
    Watchdog(&'e mut WatchdogInfoTable<'t>),
    Pcie(&'e mut PcieInfoTable<'t>),
    Memory(&'e mut MemoryInfoTable<'t>),
    Timer(&'e mut TimerInfoTable),
}

impl Extraction<'_, '_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pe(_) => "PE",
            Self::Gic(_) => "GIC",
            Self::Watchdog(_) => "watchdog",
            Self::Pcie(_) => "PCIe",
            Self::Memory(_) => "memory",
            Self::Timer(_) => "timer",
        }
    }

    /// Runs the matching extractor against `fdt`
    pub fn run(self, fdt: &Fdt<'_>) -> Result<(), ExtractError> {
        match self {
            Self::Pe(table) => pe::create_info_table(fdt, table),
            Self::Gic(table) => gic::create_info_table(fdt, table),
            Self::Watchdog(table) => watchdog::create_info_table(fdt, table),
            Self::Pcie(table) => pcie::create_info_table(fdt, table),
            Self::Memory(table) => memory::create_info_table(fdt, table),
            Self::Timer(table) => timer::create_info_table(fdt, table),
        }
    }
}

/// Fetches a property every node of the class must carry
pub(crate) fn required_property<'a>(
    fdt: &Fdt<'a>,
    node: NodeRef,
    name: &'static str,
) -> Result<Cells<'a>, ExtractError> {
    match fdt.property(node, name)? {
        Some(prop) => Ok(Cells::new(name, prop.value)),
        None => {
            log::error!("{} property missing on node {}", name, display_name(fdt, node));
            Err(ExtractError::NodeNotFound { property: name })
        }
    }
}

/// Node name for log lines
pub(crate) fn display_name<'a>(fdt: &Fdt<'a>, node: NodeRef) -> &'a str {
    fdt.node_name(node).unwrap_or("<unnamed>")
}
