//! RISC-V machine-code classifier.
//!
//! Given the 32-bit instruction words of a binary's `.text` section and a
//! JSON instruction description, this library names every word via a
//! hierarchical decode table (opcode, then funct3/funct7/funct12),
//! resolves `ECALL` words to concrete syscall names with a bounded
//! lookback over the a7 register, and returns aggregate counts of known
//! instructions, unknown instructions, and unknown syscalls.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use riscv_classifier::{survey_file, IsaSpec};
//!
//! fn main() -> Result<(), riscv_classifier::ClassifierError> {
//!     let spec = IsaSpec::from_json_file("data/rv64.json")?;
//!     let tally = survey_file("path/to/binary", &spec)?;
//!     for (mnemonic, count) in tally.mnemonics() {
//!         println!("{mnemonic}: {count}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # What this is not
//!
//! The classifier does not execute or simulate instructions, does not
//! reconstruct control flow, and does not disassemble operands beyond
//! naming the instruction and recovering the a7 immediate for `ECALL`
//! resolution. Immediates are never sign-extended.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::missing_errors_doc)]

pub mod aggregate;
pub mod classify;
pub mod elf;
pub mod error;
pub mod fields;
pub mod syscall;
pub mod tables;

pub use aggregate::Tally;
pub use classify::{classify, ECALL, UNKNOWN};
pub use error::{ClassifierError, Result};
pub use syscall::{resolve_syscall, LOOKBACK, UNKNOWN_SYSCALL};
pub use tables::{DecodeTable, IsaSpec, SyscallTable};

use std::path::Path;

/// Classify the `.text` section of a RISC-V ELF file.
///
/// Reads the file, extracts the instruction stream, and runs the
/// aggregator over it with the given instruction description.
pub fn survey_file<P: AsRef<Path>>(path: P, spec: &IsaSpec) -> Result<Tally> {
    let data = std::fs::read(path)?;
    survey_bytes(&data, spec)
}

/// Classify the `.text` section of an in-memory RISC-V ELF image.
pub fn survey_bytes(data: &[u8], spec: &IsaSpec) -> Result<Tally> {
    let words = elf::extract_text_words(data)?;
    survey_stream(&words, spec)
}

/// Classify an already-extracted instruction stream.
///
/// The stream is an ordered sequence of little-endian-decoded 32-bit
/// words; nothing is re-read from disk.
pub fn survey_stream(stream: &[u32], spec: &IsaSpec) -> Result<Tally> {
    aggregate::run(stream, spec)
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "opcodes": [
            { "13": { "funct3": [ { "00": "ADDI" } ] } },
            { "73": { "funct3": [
                { "00": { "funct12": [ { "0000": "ECALL" } ] } }
            ] } }
        ],
        "syscalls": [ { "5D": "exit" } ]
    }"#;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_survey_stream_end_to_end() {
        let spec = IsaSpec::from_json_str(SPEC).unwrap();
        // addi a7, x0, 93; ecall
        let stream = [(93 << 20) | (17 << 7) | 0x13, 0x0000_0073];
        let tally = survey_stream(&stream, &spec).unwrap();
        assert_eq!(tally.mnemonics().get("ECALL.exit"), Some(&1));
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn test_survey_file_missing_path() {
        let spec = IsaSpec::from_json_str(SPEC).unwrap();
        let err = survey_file("/nonexistent/binary", &spec).unwrap_err();
        assert!(matches!(err, ClassifierError::Io(_)));
    }

    #[test]
    fn test_shipped_description_loads() {
        let spec = IsaSpec::from_json_str(include_str!("../data/rv64.json")).unwrap();
        assert!(!spec.decode.is_empty());
        assert_eq!(spec.syscalls.name_of(93), Some("exit"));
        assert_eq!(classify(0x0000_0073, &spec.decode), ECALL);
        assert_eq!(classify(0x0000_0037, &spec.decode), "LUI");
    }

    #[test]
    fn test_survey_file_roundtrip() {
        use std::io::Write as _;

        // Minimal ELF64: header, 3 section headers (null, .text, .shstrtab),
        // then section data. .text = addi a7, x0, 93; ecall.
        let text: Vec<u8> = [(93u32 << 20) | (17 << 7) | 0x13, 0x0000_0073]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        let strtab: &[u8] = b"\0.text\0.shstrtab\0";
        let shoff = 0x40;
        let text_offset = shoff + 3 * 0x40;
        let strtab_offset = text_offset + text.len();

        let mut data = vec![0u8; strtab_offset + strtab.len()];
        data[..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
        data[4] = 2; // ELFCLASS64
        data[5] = 1; // little-endian
        data[6] = 1; // EV_CURRENT
        data[0x12..0x14].copy_from_slice(&0xF3u16.to_le_bytes()); // EM_RISCV
        data[0x28..0x30].copy_from_slice(&(shoff as u64).to_le_bytes());
        data[0x3A..0x3C].copy_from_slice(&0x40u16.to_le_bytes());
        data[0x3C..0x3E].copy_from_slice(&3u16.to_le_bytes());
        data[0x3E..0x40].copy_from_slice(&2u16.to_le_bytes());
        let sh1 = shoff + 0x40;
        data[sh1..sh1 + 4].copy_from_slice(&1u32.to_le_bytes());
        data[sh1 + 0x18..sh1 + 0x20].copy_from_slice(&(text_offset as u64).to_le_bytes());
        data[sh1 + 0x20..sh1 + 0x28].copy_from_slice(&(text.len() as u64).to_le_bytes());
        let sh2 = shoff + 2 * 0x40;
        data[sh2..sh2 + 4].copy_from_slice(&7u32.to_le_bytes());
        data[sh2 + 0x18..sh2 + 0x20].copy_from_slice(&(strtab_offset as u64).to_le_bytes());
        data[sh2 + 0x20..sh2 + 0x28].copy_from_slice(&(strtab.len() as u64).to_le_bytes());
        data[text_offset..text_offset + text.len()].copy_from_slice(&text);
        data[strtab_offset..].copy_from_slice(strtab);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let spec = IsaSpec::from_json_str(SPEC).unwrap();
        let tally = survey_file(file.path(), &spec).unwrap();
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.mnemonics().get("ECALL.exit"), Some(&1));
    }
}
