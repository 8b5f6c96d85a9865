// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Human readable table dumps.

use core::fmt::{self, Display, Formatter};

use crate::tables::{
    GicEntryKind, GicInfoTable, MemoryInfoTable, MemoryKind, PcieInfoTable, PeInfoTable, TimerInfoTable,
    WatchdogInfoTable,
};

/// Column where field values start
const VALUE_COLUMN: usize = 18;

fn banner(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "************ {} TABLE ************", title)
}

fn field(f: &mut Formatter<'_>, n_spaces: usize, name: &str, value: impl fmt::LowerHex) -> fmt::Result {
    writeln!(f, "{:indent$}{:<width$}: {:#x}", "", name, value, indent = n_spaces, width = VALUE_COLUMN - n_spaces)
}

impl Display for PeInfoTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "PE")?;
        writeln!(f, " NUM PE {}", self.header.num_of_pe)?;

        for pe in self.entries() {
            field(f, 1, "PE NUM", pe.pe_num)?;
            field(f, 4, "MPIDR", pe.mpidr)?;
            field(f, 4, "PMU GSIV", pe.pmu_gsiv)?;
        }

        Ok(())
    }
}

impl Display for GicEntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Distributor => "GICD",
            Self::Redistributor => "GICR",
            Self::RedistributorExtension => "GICC-GICR",
            Self::Its => "GIC ITS",
        })
    }
}

impl Display for GicInfoTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "GIC")?;
        writeln!(f, " GIC version {}, {} ITS", self.header.gic_version, self.header.num_its)?;

        for entry in self.entries() {
            writeln!(f, " {:<width$}: {} ({:#x})", "GIC TYPE", entry.kind, entry.kind as u32, width = VALUE_COLUMN - 1)?;
            field(f, 5, "BASE", entry.base)?;
            field(f, 5, "LEN", entry.length)?;
        }

        Ok(())
    }
}

impl Display for WatchdogInfoTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "WD")?;
        writeln!(f, " NUM WD {}", self.header.num_wd)?;

        for wd in self.entries() {
            field(f, 1, "WD REFRESH BASE", wd.refresh_base)?;
            field(f, 4, "CONTROL BASE", wd.control_base)?;
            field(f, 4, "GSIV", wd.gsiv)?;
            field(f, 4, "FLAGS", wd.flags)?;
        }

        Ok(())
    }
}

impl Display for PcieInfoTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "PCIE")?;
        writeln!(f, " NUM ECAM {}", self.header.num_entries)?;

        for entry in self.entries() {
            field(f, 1, "ECAM BASE", entry.ecam_base)?;
            field(f, 6, "START BUS", entry.start_bus_num)?;
            field(f, 6, "END BUS", entry.end_bus_num)?;
            field(f, 6, "SEGMENT NUM", entry.segment_num)?;
        }

        Ok(())
    }
}

impl Display for MemoryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Reserved => "reserved",
        })
    }
}

impl Display for MemoryInfoTable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        banner(f, "MEMORY")?;
        writeln!(f, " NUM REGIONS {}", self.len())?;

        for region in self.entries() {
            writeln!(f, " {:<width$}: {}", "MEMORY TYPE", region.kind, width = VALUE_COLUMN - 1)?;
            field(f, 8, "PHY ADDR", region.phy_addr)?;
            field(f, 8, "VIRT ADDR", region.virt_addr)?;
            field(f, 8, "SIZE", region.size)?;
        }

        Ok(())
    }
}

impl Display for TimerInfoTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let header = &self.header;

        banner(f, "TIMER")?;
        writeln!(f, " NUM TIMERS {}", header.num_platform_timer)?;
        field(f, 1, "S EL1 GSIV", header.s_el1_timer_gsiv)?;
        field(f, 1, "NS EL1 GSIV", header.ns_el1_timer_gsiv)?;
        field(f, 1, "VIRTUAL GSIV", header.virtual_timer_gsiv)?;
        field(f, 1, "EL2 GSIV", header.el2_timer_gsiv)
    }
}
