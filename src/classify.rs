//! Table-driven instruction classification.

use crate::fields;
use crate::tables::{DecodeTable, Funct3Entry, OpcodeEntry};

/// Sentinel mnemonic for a word the decode table does not describe.
pub const UNKNOWN: &str = "UNKNOWN";

/// Mnemonic of the system-call trap instruction. A classification equal to
/// this is what triggers the syscall resolver.
pub const ECALL: &str = "ECALL";

/// Resolve an instruction word to its mnemonic, or [`UNKNOWN`].
///
/// Walks the table opcode-first: a literal opcode entry wins immediately;
/// otherwise the funct3 branch is consulted (with funct12 refinement for
/// SYSTEM-class instructions), then the funct7 branch (with its `"default"`
/// fallback). At most one branch matches per level and there is no
/// backtracking across levels; disambiguation is the table author's job.
///
/// Deterministic and pure: the same word and table always yield the same
/// mnemonic.
pub fn classify<'t>(word: u32, table: &'t DecodeTable) -> &'t str {
    let opcode_key = format!("{:02X}", fields::opcode(word));

    let (funct3_table, funct7_table) = match table.get(&opcode_key) {
        None => return UNKNOWN,
        Some(OpcodeEntry::Mnemonic(name)) => return name,
        Some(OpcodeEntry::SubTables { funct3, funct7 }) => (funct3, funct7),
    };

    let funct3_key = format!("{:02X}", fields::funct3(word));

    if let Some(entries) = funct3_table {
        match entries.get(&funct3_key) {
            Some(Funct3Entry::Mnemonic(name)) => return name,
            Some(Funct3Entry::Funct12(refinements)) => {
                let funct12_key = format!("{:04X}", fields::funct12(word));
                if let Some(name) = refinements.get(&funct12_key) {
                    return name;
                }
                // funct12 miss inside a SYSTEM-style entry: nothing else
                // can name this word.
                return UNKNOWN;
            }
            None => {}
        }
    }

    if let Some(dispatch) = funct7_table {
        let funct7_key = format!("{:02X}", fields::funct7(word));
        let entry = dispatch.get(&funct7_key).or_else(|| dispatch.default_entry());
        if let Some(funct3_map) = entry {
            if let Some(name) = funct3_map.get(&funct3_key) {
                return name;
            }
        }
    }

    UNKNOWN
}
