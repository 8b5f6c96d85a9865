//! Runs every extractor against a DTB and prints the resulting tables.
//!
//! `cargo run --example dump_tables --features pretty-printing [path/to/blob.dtb]`
//!
//! Set `RUST_LOG=debug` to see each matched node.

use fdt_hwinfo::{tables::*, Extraction, Fdt};

static DEFAULT_FDT: &[u8] = include_bytes!("../dtb/test.dtb");

fn main() {
    env_logger::init();

    let data = match std::env::args().nth(1) {
        Some(path) => std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {}: {}", path, e)),
        None => DEFAULT_FDT.to_vec(),
    };
    let fdt = Fdt::new(&data).unwrap();

    let mut pe_slots = [PeInfoEntry::default(); 256];
    let mut gic_slots = [GicInfoEntry::default(); 32];
    let mut wd_slots = [WatchdogInfoEntry::default(); 8];
    let mut pcie_slots = [PcieInfoEntry::default(); 16];
    let mut mem_slots = [MemoryInfoEntry::default(); 32];

    let mut pe = PeInfoTable::new(&mut pe_slots);
    let mut gic = GicInfoTable::new(&mut gic_slots);
    let mut wd = WatchdogInfoTable::new(&mut wd_slots);
    let mut pcie = PcieInfoTable::new(&mut pcie_slots);
    let mut mem = MemoryInfoTable::new(&mut mem_slots);
    let mut timer = TimerInfoTable::default();

    for extraction in [
        Extraction::Pe(&mut pe),
        Extraction::Gic(&mut gic),
        Extraction::Watchdog(&mut wd),
        Extraction::Pcie(&mut pcie),
        Extraction::Memory(&mut mem),
        Extraction::Timer(&mut timer),
    ] {
        let name = extraction.name();
        if let Err(e) = extraction.run(&fdt) {
            eprintln!("{} extraction stopped early: {}", name, e);
        }
    }

    println!("{pe}\n{gic}\n{wd}\n{pcie}\n{mem}\n{timer}");
}
