// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Output tables filled in by the extractors.
//!
//! Storage always belongs to the caller: an [`InfoTable`] borrows a slice of
//! entry slots and never grows past it. Headers mirror the fixed layout the
//! compliance tooling expects, counts included, and are plain public fields.

use crate::ExtractError;

/// Header plus a caller-provided, fixed-capacity run of entries
#[derive(Debug, PartialEq, Eq)]
pub struct InfoTable<'t, H, E> {
    pub header: H,
    slots: &'t mut [E],
    len: usize,
}

impl<'t, H: Default, E> InfoTable<'t, H, E> {
    /// Wraps `slots` as an empty table with a zeroed header
    pub fn new(slots: &'t mut [E]) -> Self {
        Self { header: H::default(), slots, len: 0 }
    }
}

impl<H, E> InfoTable<'_, H, E> {
    /// The entries written so far
    pub fn entries(&self) -> &[E] {
        &self.slots[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn push(&mut self, entry: E) -> Result<(), ExtractError> {
        let capacity = self.capacity();
        let slot = self.slots.get_mut(self.len).ok_or(ExtractError::TableFull { capacity })?;

        *slot = entry;
        self.len += 1;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeInfoHeader {
    pub num_of_pe: u32,
}

/// One processing element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeInfoEntry {
    /// Position of the CPU node in visitation order
    pub pe_num: u32,
    /// Affinity value decoded from the CPU's `reg`
    pub mpidr: u64,
    /// PMU interrupt; the devicetree path doesn't provide one so this is 0
    pub pmu_gsiv: u32,
}

pub type PeInfoTable<'t> = InfoTable<'t, PeInfoHeader, PeInfoEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GicInfoHeader {
    pub gic_version: u32,
    pub num_its: u32,
}

/// Kind of memory-mapped GIC region, numbered the way the compliance tables
/// number them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GicEntryKind {
    #[default]
    Distributor = 0x1001,
    Redistributor = 0x1002,
    RedistributorExtension = 0x1003,
    Its = 0x1004,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GicInfoEntry {
    pub kind: GicEntryKind,
    pub base: u64,
    pub length: u32,
}

pub type GicInfoTable<'t> = InfoTable<'t, GicInfoHeader, GicInfoEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogInfoHeader {
    pub num_wd: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogInfoEntry {
    pub refresh_base: u64,
    pub control_base: u64,
    pub gsiv: u32,
    /// `(polarity << 1) | trigger_mode`, see [`crate::extract::watchdog`]
    pub flags: u32,
}

pub type WatchdogInfoTable<'t> = InfoTable<'t, WatchdogInfoHeader, WatchdogInfoEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcieInfoHeader {
    pub num_entries: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcieInfoEntry {
    pub ecam_base: u64,
    /// Always 0, devicetrees don't carry a segment number
    pub segment_num: u32,
    pub start_bus_num: u32,
    pub end_bus_num: u32,
}

pub type PcieInfoTable<'t> = InfoTable<'t, PcieInfoHeader, PcieInfoEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MemoryKind {
    #[default]
    Normal = 0x1001,
    Reserved = 0x1002,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfoEntry {
    pub kind: MemoryKind,
    pub phy_addr: u64,
    /// Identical to `phy_addr`; there is no translation at this stage of boot
    pub virt_addr: u64,
    pub size: u64,
}

/// Memory regions have no header; the count is [`InfoTable::len`]
pub type MemoryInfoTable<'t> = InfoTable<'t, (), MemoryInfoEntry>;

/// Architected timer interrupts. This table is header-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerInfoHeader {
    pub num_platform_timer: u32,
    pub s_el1_timer_gsiv: u32,
    pub ns_el1_timer_gsiv: u32,
    pub virtual_timer_gsiv: u32,
    pub el2_timer_gsiv: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerInfoTable {
    pub header: TimerInfoHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_stops_at_capacity() {
        let mut slots = [PeInfoEntry::default(); 2];
        let mut table = PeInfoTable::new(&mut slots);

        table.push(PeInfoEntry { pe_num: 0, mpidr: 0x100, pmu_gsiv: 0 }).unwrap();
        table.push(PeInfoEntry { pe_num: 1, mpidr: 0x101, pmu_gsiv: 0 }).unwrap();

        assert_eq!(table.push(PeInfoEntry::default()), Err(ExtractError::TableFull { capacity: 2 }));
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[1].mpidr, 0x101);
    }

    #[test]
    fn entries_only_expose_written_slots() {
        let mut slots = [MemoryInfoEntry { size: 0xdead, ..Default::default() }; 4];
        let table = MemoryInfoTable::new(&mut slots);

        assert!(table.is_empty());
        assert_eq!(table.capacity(), 4);
        assert!(table.entries().is_empty());
    }
}
