//! Error types for the RISC-V classifier.
//!
//! Only structural failures are errors: a table that does not fit the
//! expected shape, an ELF that cannot yield a `.text` section, or a stream
//! word outside the 32-bit instruction space. Unknown instructions and
//! unknown system calls are classification *outcomes* and are reported
//! through [`crate::aggregate::Tally`], never through this type.

use thiserror::Error;

/// Primary error type for the RISC-V classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The instruction description is not valid JSON.
    #[error("Spec parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is too small to contain an ELF header.
    #[error("File too small: expected at least {expected} bytes, got {actual}")]
    FileTooSmall { expected: usize, actual: usize },

    /// Invalid magic bytes for the ELF format.
    #[error("Invalid magic bytes: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    /// The ELF targets a machine other than RISC-V.
    #[error("ELF is not for RISC-V: e_machine {value} (0x{value:04X})")]
    NotRiscv { value: u16 },

    /// Big-endian ELF data encoding; instruction words are defined as
    /// little-endian.
    #[error("Unsupported ELF data encoding: {value} (expected little-endian)")]
    BigEndianElf { value: u8 },

    /// No `.text` section in the binary.
    #[error("Missing .text section")]
    MissingTextSection,

    /// Truncated data when reading ELF structures.
    #[error("Truncated data at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedData {
        offset: usize,
        expected: usize,
        actual: usize,
    },

    /// A table key that is not fixed-width hex of the expected width.
    #[error("Invalid {level} key {key:?}: expected {width} uppercase hex digits")]
    InvalidTableKey {
        level: &'static str,
        key: String,
        width: usize,
    },

    /// The same key appears twice at one table level. The lookup contract
    /// is at-most-one-match per level, so duplicates are rejected at load.
    #[error("Duplicate {level} key {key:?} in instruction description")]
    DuplicateTableKey { level: &'static str, key: String },

    /// A stream element outside the encodable instruction space. The
    /// all-ones pattern marks a malformed or truncated input, not a
    /// decodable word.
    #[error("Unexpected instruction word at index {index}: 0x{value:08X}")]
    OutOfRangeWord { index: usize, value: u32 },
}

/// Result type alias for classifier operations.
pub type Result<T> = std::result::Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClassifierError::FileTooSmall {
            expected: 64,
            actual: 4,
        };
        assert!(err.to_string().contains("64"));
        assert!(err.to_string().contains("4"));
    }

    #[test]
    fn test_not_riscv_display() {
        let err = ClassifierError::NotRiscv { value: 0x3E };
        let msg = err.to_string();
        assert!(msg.contains("003E"));
    }

    #[test]
    fn test_out_of_range_word_display() {
        let err = ClassifierError::OutOfRangeWord {
            index: 7,
            value: u32::MAX,
        };
        assert!(err.to_string().contains("FFFFFFFF"));
    }
}
