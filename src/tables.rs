//! Decode and syscall tables loaded from the instruction description.
//!
//! The on-disk shape is a JSON document whose `"opcodes"` member is a list
//! of single-entry objects, each mapping a fixed-width hex key to either a
//! mnemonic string or a nested table, and whose `"syscalls"` member is a
//! list of single-entry objects mapping a 2-digit hex key to a name:
//!
//! ```json
//! {
//!   "opcodes": [
//!     { "37": "LUI" },
//!     { "13": { "funct3": [ { "00": "ADDI" } ] } },
//!     { "73": { "funct3": [ { "00": { "funct12": [ { "0000": "ECALL" } ] } } ] } },
//!     { "33": { "funct7": [ { "20": { "funct3": [ { "00": "SUB" } ] } },
//!                           { "default": { "funct3": [ { "00": "ADD" } ] } } ] } }
//!   ],
//!   "syscalls": [ { "5D": "exit" } ]
//! }
//! ```
//!
//! Loading flattens the lists into maps, normalizes keys to uppercase, and
//! validates key widths (2 hex digits for opcode/funct3/funct7/syscall, 4
//! for funct12; `"default"` is permitted only at the funct7 level). The
//! list shape would allow a key to appear twice at one level; that breaks
//! the at-most-one-match lookup contract, so duplicates are rejected
//! outright instead of silently letting one entry shadow the other.

use crate::error::{ClassifierError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The funct7 key consulted when no literal funct7 value matches.
pub const DEFAULT_FUNCT7: &str = "default";

/// Terminal funct3 map nested under a funct7 entry.
pub type Funct3Map = HashMap<String, String>;

/// Value of a funct3 key: a mnemonic, or a funct12 refinement for
/// instructions that share opcode and funct3 (ECALL vs. EBREAK).
#[derive(Debug, Clone)]
pub enum Funct3Entry {
    /// The funct3 value alone names the instruction.
    Mnemonic(String),
    /// funct12 disambiguates; a miss here classifies as unknown.
    Funct12(HashMap<String, String>),
}

/// Funct7 dispatch: literal funct7 values, plus an optional `"default"`
/// entry used when only some funct7 values are distinguished (SUB/SRA
/// against the base ADD/SRL meanings, for instance).
#[derive(Debug, Clone, Default)]
pub struct Funct7Table {
    exact: HashMap<String, Funct3Map>,
    default: Option<Funct3Map>,
}

impl Funct7Table {
    /// Look up a literal funct7 key.
    pub fn get(&self, funct7_key: &str) -> Option<&Funct3Map> {
        self.exact.get(funct7_key)
    }

    /// The `"default"` entry, if the table has one.
    pub fn default_entry(&self) -> Option<&Funct3Map> {
        self.default.as_ref()
    }
}

/// Value of an opcode key.
#[derive(Debug, Clone)]
pub enum OpcodeEntry {
    /// Opcodes with a single fixed meaning (LUI, AUIPC, JAL, ...).
    Mnemonic(String),
    /// Opcodes refined by secondary fields. The funct3 branch is consulted
    /// before the funct7 branch, matching the walk order of the lookup.
    SubTables {
        funct3: Option<HashMap<String, Funct3Entry>>,
        funct7: Option<Funct7Table>,
    },
}

/// The hierarchical instruction decode table, keyed by opcode.
#[derive(Debug, Clone, Default)]
pub struct DecodeTable {
    opcodes: HashMap<String, OpcodeEntry>,
}

impl DecodeTable {
    /// Look up an opcode key (two uppercase hex digits).
    pub fn get(&self, opcode_key: &str) -> Option<&OpcodeEntry> {
        self.opcodes.get(opcode_key)
    }

    /// Number of opcode entries.
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }
}

/// Flat mapping from syscall number to syscall name.
#[derive(Debug, Clone, Default)]
pub struct SyscallTable {
    names: HashMap<String, String>,
}

impl SyscallTable {
    /// Build a table from numeric entries. Mainly useful when the caller
    /// sources syscall names from somewhere other than the JSON
    /// description.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let names = pairs
            .into_iter()
            .map(|(num, name)| (format!("{num:02X}"), name.to_string()))
            .collect();
        Self { names }
    }

    /// Resolve a syscall number to its name, if the table knows it.
    pub fn name_of(&self, number: u32) -> Option<&str> {
        self.names.get(&format!("{number:02X}")).map(String::as_str)
    }

    /// Number of named syscalls.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A loaded instruction description: decode table plus syscall names.
///
/// Loaded once per run and shared read-only by every classification call;
/// nothing here is mutated after loading.
#[derive(Debug, Clone, Default)]
pub struct IsaSpec {
    /// Hierarchical opcode table.
    pub decode: DecodeTable,
    /// Flat syscall-number table.
    pub syscalls: SyscallTable,
}

impl IsaSpec {
    /// Parse and validate an instruction description from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawSpec = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    /// Parse and validate an instruction description from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn from_raw(raw: RawSpec) -> Result<Self> {
        let mut opcodes = HashMap::new();
        for entry in raw.opcodes {
            for (key, value) in entry {
                let key = normalize_key(&key, "opcode", 2)?;
                let value = match value {
                    RawOpcode::Mnemonic(name) => OpcodeEntry::Mnemonic(name),
                    RawOpcode::Table(table) => OpcodeEntry::SubTables {
                        funct3: table.funct3.map(flatten_funct3).transpose()?,
                        funct7: table.funct7.map(flatten_funct7).transpose()?,
                    },
                };
                if opcodes.insert(key.clone(), value).is_some() {
                    return Err(ClassifierError::DuplicateTableKey {
                        level: "opcode",
                        key,
                    });
                }
            }
        }

        let mut names = HashMap::new();
        for entry in raw.syscalls {
            for (key, name) in entry {
                let key = normalize_key(&key, "syscall", 2)?;
                if names.insert(key.clone(), name).is_some() {
                    return Err(ClassifierError::DuplicateTableKey {
                        level: "syscall",
                        key,
                    });
                }
            }
        }

        Ok(Self {
            decode: DecodeTable { opcodes },
            syscalls: SyscallTable { names },
        })
    }
}

/// Uppercase a key and check it is exactly `width` hex digits.
fn normalize_key(key: &str, level: &'static str, width: usize) -> Result<String> {
    let upper = key.to_ascii_uppercase();
    if upper.len() != width || !upper.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ClassifierError::InvalidTableKey {
            level,
            key: key.to_string(),
            width,
        });
    }
    Ok(upper)
}

fn flatten_funct3(
    entries: Vec<HashMap<String, RawFunct3>>,
) -> Result<HashMap<String, Funct3Entry>> {
    let mut out = HashMap::new();
    for entry in entries {
        for (key, value) in entry {
            let key = normalize_key(&key, "funct3", 2)?;
            let value = match value {
                RawFunct3::Mnemonic(name) => Funct3Entry::Mnemonic(name),
                RawFunct3::Table(table) => {
                    Funct3Entry::Funct12(flatten_leaf(table.funct12, "funct12", 4)?)
                }
            };
            if out.insert(key.clone(), value).is_some() {
                return Err(ClassifierError::DuplicateTableKey {
                    level: "funct3",
                    key,
                });
            }
        }
    }
    Ok(out)
}

fn flatten_funct7(entries: Vec<HashMap<String, RawFunct7>>) -> Result<Funct7Table> {
    let mut table = Funct7Table::default();
    for entry in entries {
        for (key, value) in entry {
            let funct3 = flatten_leaf(value.funct3, "funct3", 2)?;
            if key == DEFAULT_FUNCT7 {
                if table.default.replace(funct3).is_some() {
                    return Err(ClassifierError::DuplicateTableKey {
                        level: "funct7",
                        key,
                    });
                }
            } else {
                let key = normalize_key(&key, "funct7", 2)?;
                if table.exact.insert(key.clone(), funct3).is_some() {
                    return Err(ClassifierError::DuplicateTableKey {
                        level: "funct7",
                        key,
                    });
                }
            }
        }
    }
    Ok(table)
}

fn flatten_leaf(
    entries: Vec<HashMap<String, String>>,
    level: &'static str,
    width: usize,
) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for entry in entries {
        for (key, name) in entry {
            let key = normalize_key(&key, level, width)?;
            if out.insert(key.clone(), name).is_some() {
                return Err(ClassifierError::DuplicateTableKey { level, key });
            }
        }
    }
    Ok(out)
}

// Raw serde mirror of the on-disk shape. Flattened and validated before
// anything else sees it.

#[derive(Debug, Deserialize)]
struct RawSpec {
    opcodes: Vec<HashMap<String, RawOpcode>>,
    #[serde(default)]
    syscalls: Vec<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOpcode {
    Mnemonic(String),
    Table(RawOpcodeTable),
}

#[derive(Debug, Deserialize)]
struct RawOpcodeTable {
    #[serde(default)]
    funct3: Option<Vec<HashMap<String, RawFunct3>>>,
    #[serde(default)]
    funct7: Option<Vec<HashMap<String, RawFunct7>>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFunct3 {
    Mnemonic(String),
    Table(RawFunct3Table),
}

#[derive(Debug, Deserialize)]
struct RawFunct3Table {
    funct12: Vec<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawFunct7 {
    funct3: Vec<HashMap<String, String>>,
}
