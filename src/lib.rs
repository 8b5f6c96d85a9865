// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! # `fdt-hwinfo`
//!
//! A pure-Rust `#![no_std]` crate that walks a Flattened Devicetree and fills
//! in the fixed-shape hardware info tables consumed by Arm server-base-system
//! compliance tooling: processing elements, the GICv3 interrupt controller
//! and its ITS blocks, SBSA generic watchdogs, PCI Express root complexes,
//! physical memory regions and the architected timer.
//!
//! Tables are caller-owned: each one wraps a mutable slice provided by the
//! caller and the crate never allocates. Extraction is fail-fast; when a node
//! is malformed the extractor returns an [`ExtractError`] and the table keeps
//! every entry written before that node.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fdt_hwinfo::{tables::{PeInfoEntry, PeInfoTable}, Fdt};
//!
//! static MY_FDT: &[u8] = include_bytes!("../dtb/test.dtb");
//!
//! fn main() {
//!     let fdt = Fdt::new(MY_FDT).unwrap();
//!
//!     let mut slots = [PeInfoEntry::default(); 8];
//!     let mut pe_table = PeInfoTable::new(&mut slots);
//!
//!     match fdt_hwinfo::create_pe_info_table(&fdt, &mut pe_table) {
//!         Ok(()) => println!("found {} PE(s)", pe_table.header.num_of_pe),
//!         Err(e) => println!("stopped after {} PE(s): {}", pe_table.header.num_of_pe, e),
//!     }
//!
//!     for pe in pe_table.entries() {
//!         println!("PE {} has MPIDR {:#x}", pe.pe_num, pe.mpidr);
//!     }
//! }
//! ```

#![no_std]


pub mod cells;
mod error;
pub mod extract;
pub mod navigator;
mod parsing;
pub mod tables;

#[cfg(feature = "pretty-printing")]
mod pretty_print;

pub use error::ExtractError;
pub use extract::{
    gic::create_info_table as create_gic_info_table, memory::create_info_table as create_memory_info_table,
    pcie::create_info_table as create_pcie_info_table, pe::create_info_table as create_pe_info_table,
    timer::create_info_table as create_timer_info_table,
    watchdog::create_info_table as create_watchdog_info_table, Extraction,
};
pub use navigator::{NodeProperty, NodeRef};
pub use parsing::ParseError;

use parsing::{BigEndianU32, FdtData, StringsBlock};
use thiserror_no_std::Error;

/// Possible errors when attempting to create or walk an `Fdt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FdtError {
    /// The FDT had an invalid magic value
    #[error("bad FDT magic value")]
    BadMagic,
    /// The given pointer was null
    #[error("an invalid pointer was passed")]
    BadPtr,
    /// The slice passed in was too small to fit the given total size of the FDT
    /// structure
    #[error("the given buffer was too small to contain a FDT header")]
    BufferTooSmall,
    /// The blob uses a format version this crate can't read
    #[error("FDT version {0} (last compatible {1}) is not supported")]
    UnsupportedVersion(u32, u32),
    /// The structure or strings block is malformed
    #[error("{0}")]
    ParseError(#[from] ParseError),
}

/// Oldest blob format whose structure block layout is understood
const FIRST_SUPPORTED_VERSION: u32 = 16;
/// Newest blob format this crate knows of
const LAST_SUPPORTED_VERSION: u32 = 17;
/// A memory reservation map holds at least its terminating (address, size) pair
const RSVMAP_ENTRY_SIZE: usize = 16;

/// A flattened devicetree located somewhere in memory
///
/// The blob is only ever read; every query goes back to the raw bytes so an
/// `Fdt` is cheap to copy and hand to each extractor.
#[derive(Clone, Copy)]
pub struct Fdt<'a> {
    data: &'a [u8],
    header: FdtHeader,
}

impl core::fmt::Debug for Fdt<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fdt").field("total_size", &self.total_size()).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct FdtHeader {
    /// FDT header magic
    magic: BigEndianU32,
    /// Total size in bytes of the FDT structure
    totalsize: BigEndianU32,
    /// Offset in bytes from the start of the header to the structure block
    off_dt_struct: BigEndianU32,
    /// Offset in bytes from the start of the header to the strings block
    off_dt_strings: BigEndianU32,
    /// Offset in bytes from the start of the header to the memory reservation
    /// block
    off_mem_rsvmap: BigEndianU32,
    /// FDT version
    version: BigEndianU32,
    /// Last compatible FDT version
    last_comp_version: BigEndianU32,
    /// System boot CPU ID
    boot_cpuid_phys: BigEndianU32,
    /// Length in bytes of the strings block
    size_dt_strings: BigEndianU32,
    /// Length in bytes of the struct block
    size_dt_struct: BigEndianU32,
}

impl FdtHeader {
    const SIZE: usize = core::mem::size_of::<Self>();

    fn valid_magic(&self) -> bool {
        self.magic.to_ne() == 0xd00dfeed
    }

    fn struct_range(&self) -> core::ops::Range<usize> {
        let start = self.off_dt_struct.to_ne() as usize;
        let end = start.saturating_add(self.size_dt_struct.to_ne() as usize);

        start..end
    }

    fn strings_range(&self) -> core::ops::Range<usize> {
        let start = self.off_dt_strings.to_ne() as usize;
        let end = start.saturating_add(self.size_dt_strings.to_ne() as usize);

        start..end
    }

    fn from_bytes(bytes: &mut FdtData<'_>) -> Option<Self> {
        Some(Self {
            magic: bytes.advance_u32().ok()?,
            totalsize: bytes.advance_u32().ok()?,
            off_dt_struct: bytes.advance_u32().ok()?,
            off_dt_strings: bytes.advance_u32().ok()?,
            off_mem_rsvmap: bytes.advance_u32().ok()?,
            version: bytes.advance_u32().ok()?,
            last_comp_version: bytes.advance_u32().ok()?,
            boot_cpuid_phys: bytes.advance_u32().ok()?,
            size_dt_strings: bytes.advance_u32().ok()?,
            size_dt_struct: bytes.advance_u32().ok()?,
        })
    }
}

impl<'a> Fdt<'a> {
    /// Construct a new `Fdt` from a byte buffer
    ///
    /// Note: this function does ***not*** require that the data be 4-byte
    /// aligned
    pub fn new(data: &'a [u8]) -> Result<Self, FdtError> {
        let mut stream = FdtData::new(data);
        let header = FdtHeader::from_bytes(&mut stream).ok_or(FdtError::BufferTooSmall)?;

        if !header.valid_magic() {
            return Err(FdtError::BadMagic);
        }

        let total_size = header.totalsize.to_ne() as usize;
        if data.len() < total_size {
            return Err(FdtError::BufferTooSmall);
        }

        let (version, last_comp_version) = (header.version.to_ne(), header.last_comp_version.to_ne());
        if version < FIRST_SUPPORTED_VERSION || last_comp_version > LAST_SUPPORTED_VERSION {
            return Err(FdtError::UnsupportedVersion(version, last_comp_version));
        }

        let rsvmap = header.off_mem_rsvmap.to_ne() as usize;
        if header.struct_range().end > total_size
            || header.strings_range().end > total_size
            || rsvmap.saturating_add(RSVMAP_ENTRY_SIZE) > total_size
        {
            return Err(FdtError::BufferTooSmall);
        }

        Ok(Self { data, header })
    }

    /// # Safety
    /// This function performs a read to verify the magic value. If the pointer
    /// is invalid this can result in undefined behavior.
    ///
    /// Note: this function does ***not*** require that the data be 4-byte
    /// aligned
    pub unsafe fn from_ptr(ptr: *const u8) -> Result<Self, FdtError> {
        if ptr.is_null() {
            return Err(FdtError::BadPtr);
        }

        let tmp_header = core::slice::from_raw_parts(ptr, FdtHeader::SIZE);
        let real_size = FdtHeader::from_bytes(&mut FdtData::new(tmp_header))
            .ok_or(FdtError::BufferTooSmall)?
            .totalsize
            .to_ne() as usize;

        Self::new(core::slice::from_raw_parts(ptr, real_size.max(FdtHeader::SIZE)))
    }

    /// Return reference to raw data. This can be used to obtain the original pointer passed to
    /// [Fdt::from_ptr].
    pub fn raw_data(&self) -> &'a [u8] {
        self.data
    }

    /// Total size of the devicetree in bytes
    pub fn total_size(&self) -> usize {
        self.header.totalsize.to_ne() as usize
    }

    /// Physical ID of the CPU the blob was booted on
    pub fn boot_cpuid(&self) -> u32 {
        self.header.boot_cpuid_phys.to_ne()
    }

    pub(crate) fn strings_block(&self) -> StringsBlock<'a> {
        StringsBlock(&self.data[self.header.strings_range()])
    }

    pub(crate) fn structs_block(&self) -> &'a [u8] {
        &self.data[self.header.struct_range()]
    }
}
