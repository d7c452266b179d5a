//! Minimal ELF reader: just enough to pull the `.text` section of a
//! little-endian RISC-V binary out as a stream of 32-bit words.
//!
//! This is deliberately not a general ELF library. Everything beyond the
//! header fields needed to locate `.text` (program headers, symbols,
//! relocations, dynamic info) is ignored.

use crate::error::{ClassifierError, Result};

/// ELF identification constants.
mod ident {
    /// ELF magic bytes: 0x7F 'E' 'L' 'F'
    pub const MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

    /// 32-bit class
    pub const ELFCLASS32: u8 = 1;
    /// 64-bit class
    pub const ELFCLASS64: u8 = 2;

    /// Little-endian data encoding
    pub const ELFDATA2LSB: u8 = 1;
}

/// e_machine value for RISC-V.
const EM_RISCV: u16 = 0xF3;

/// Read a little-endian u16 at `offset`.
fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = get_bytes(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Read a little-endian u32 at `offset`.
fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = get_bytes(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a little-endian u64 at `offset`.
fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let bytes = get_bytes(data, offset, 8)?;
    Ok(u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]))
}

fn get_bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ClassifierError::TruncatedData {
            offset,
            expected: len,
            actual: data.len().saturating_sub(offset),
        })
}

/// Checked offset arithmetic. Header fields are untrusted input, so a sum
/// that wraps is reported as truncation rather than left to panic.
fn header_offset(base: usize, rel: usize) -> Result<usize> {
    base.checked_add(rel).ok_or(ClassifierError::TruncatedData {
        offset: base,
        expected: rel,
        actual: 0,
    })
}

/// Section-header table geometry, independent of ELF class.
struct SectionHeaders {
    offset: usize,
    entry_size: usize,
    count: usize,
    shstrndx: usize,
    is_64: bool,
}

impl SectionHeaders {
    /// Byte offset of the section header at `index`, checked against
    /// overflow from an oversized `e_shoff`/`e_shentsize`.
    fn entry_base(&self, index: usize) -> Result<usize> {
        index
            .checked_mul(self.entry_size)
            .and_then(|rel| rel.checked_add(self.offset))
            .ok_or(ClassifierError::TruncatedData {
                offset: self.offset,
                expected: self.entry_size,
                actual: 0,
            })
    }

    /// Byte offset and size of the section at `index`.
    fn section_bounds(&self, data: &[u8], index: usize) -> Result<(usize, usize)> {
        let base = self.entry_base(index)?;
        if self.is_64 {
            let offset = read_u64(data, header_offset(base, 0x18)?)? as usize;
            let size = read_u64(data, header_offset(base, 0x20)?)? as usize;
            Ok((offset, size))
        } else {
            let offset = read_u32(data, header_offset(base, 0x10)?)? as usize;
            let size = read_u32(data, header_offset(base, 0x14)?)? as usize;
            Ok((offset, size))
        }
    }

    /// Index into the string table for the name of the section at `index`.
    fn name_offset(&self, data: &[u8], index: usize) -> Result<usize> {
        let base = self.entry_base(index)?;
        Ok(read_u32(data, base)? as usize)
    }
}

fn parse_section_headers(data: &[u8], is_64: bool) -> Result<SectionHeaders> {
    let (offset, entry_size, count, shstrndx) = if is_64 {
        (
            read_u64(data, 0x28)? as usize,
            read_u16(data, 0x3A)? as usize,
            read_u16(data, 0x3C)? as usize,
            read_u16(data, 0x3E)? as usize,
        )
    } else {
        (
            read_u32(data, 0x20)? as usize,
            read_u16(data, 0x2E)? as usize,
            read_u16(data, 0x30)? as usize,
            read_u16(data, 0x32)? as usize,
        )
    };
    Ok(SectionHeaders {
        offset,
        entry_size,
        count,
        shstrndx,
        is_64,
    })
}

/// Null-terminated section name at `offset` within the shstrtab slice.
fn section_name(strtab: &[u8], offset: usize) -> &[u8] {
    let tail = strtab.get(offset..).unwrap_or(&[]);
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    &tail[..end]
}

/// Extract the `.text` section of a RISC-V ELF as little-endian 32-bit
/// instruction words.
///
/// Accepts ELF32 and ELF64. A trailing fragment shorter than 4 bytes is
/// dropped, matching the fixed 4-byte instruction grid the classifier
/// operates on.
///
/// # Errors
///
/// Fails on a short or non-ELF file, a big-endian data encoding, an
/// `e_machine` other than RISC-V, a missing `.text` section, or section
/// headers that point outside the file.
pub fn extract_text_words(data: &[u8]) -> Result<Vec<u32>> {
    if data.len() < 0x34 {
        return Err(ClassifierError::FileTooSmall {
            expected: 0x34,
            actual: data.len(),
        });
    }

    if data[..4] != ident::MAGIC {
        return Err(ClassifierError::InvalidMagic {
            expected: format!("{:02X?}", ident::MAGIC),
            actual: format!("{:02X?}", &data[..4]),
        });
    }

    let is_64 = match data[4] {
        ident::ELFCLASS64 => true,
        ident::ELFCLASS32 => false,
        // Treat an unrecognized class as 32-bit layout; the header reads
        // below will surface truncation if that's wrong.
        _ => false,
    };

    if data[5] != ident::ELFDATA2LSB {
        return Err(ClassifierError::BigEndianElf { value: data[5] });
    }

    let e_machine = read_u16(data, 0x12)?;
    if e_machine != EM_RISCV {
        return Err(ClassifierError::NotRiscv { value: e_machine });
    }

    let headers = parse_section_headers(data, is_64)?;
    if headers.shstrndx >= headers.count {
        return Err(ClassifierError::MissingTextSection);
    }

    let (strtab_offset, strtab_size) = headers.section_bounds(data, headers.shstrndx)?;
    let strtab = get_bytes(data, strtab_offset, strtab_size)?;

    for index in 0..headers.count {
        let name_offset = headers.name_offset(data, index)?;
        if section_name(strtab, name_offset) != b".text" {
            continue;
        }
        let (offset, size) = headers.section_bounds(data, index)?;
        let text = get_bytes(data, offset, size)?;
        let words = text
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        return Ok(words);
    }

    Err(ClassifierError::MissingTextSection)
}
