//! Stream-level aggregation of classification results.

use crate::classify::{classify, ECALL, UNKNOWN};
use crate::error::{ClassifierError, Result};
use crate::syscall::{resolve_syscall, UNKNOWN_SYSCALL};
use crate::tables::IsaSpec;
use serde::Serialize;
use std::collections::HashMap;

/// Finalized counts from one run over an instruction stream.
///
/// All three maps grow monotonically during the run and are read-only once
/// it returns. The sum of mnemonic counts always equals the stream length:
/// every word lands under exactly one key (a mnemonic, a syscall label, or
/// the `UNKNOWN` sentinel).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    mnemonics: HashMap<String, u64>,
    unknown_instructions: HashMap<u32, u64>,
    unknown_syscalls: HashMap<String, u64>,
}

impl Tally {
    /// Occurrence counts keyed by mnemonic (or syscall label, or `UNKNOWN`).
    pub fn mnemonics(&self) -> &HashMap<String, u64> {
        &self.mnemonics
    }

    /// Occurrence counts of undecodable words, keyed by the raw word.
    pub fn unknown_instructions(&self) -> &HashMap<u32, u64> {
        &self.unknown_instructions
    }

    /// Occurrence counts of unresolved syscalls, keyed by their label.
    pub fn unknown_syscalls(&self) -> &HashMap<String, u64> {
        &self.unknown_syscalls
    }

    /// Total number of classified words.
    pub fn total(&self) -> u64 {
        self.mnemonics.values().sum()
    }

    /// Total number of words that classified as `UNKNOWN`.
    pub fn unknown_instruction_total(&self) -> u64 {
        self.mnemonics.get(UNKNOWN).copied().unwrap_or(0)
    }
}

/// Classify every word of `stream` and accumulate the three tallies.
///
/// ECALL classifications are replaced by the syscall resolver's label for
/// their position before counting. The tables are never mutated; the only
/// side effects are the returned counters.
///
/// # Errors
///
/// The all-ones pattern is not a decodable instruction; encountering it
/// aborts the run with [`ClassifierError::OutOfRangeWord`] rather than
/// counting it, since it signals malformed or truncated input.
pub fn run(stream: &[u32], spec: &IsaSpec) -> Result<Tally> {
    let mut tally = Tally::default();

    for (index, &word) in stream.iter().enumerate() {
        if word == u32::MAX {
            return Err(ClassifierError::OutOfRangeWord { index, value: word });
        }

        let mut name = classify(word, &spec.decode).to_string();

        if name == ECALL {
            name = resolve_syscall(stream, index, &spec.syscalls);
            if name.contains(UNKNOWN_SYSCALL) {
                *tally.unknown_syscalls.entry(name.clone()).or_insert(0) += 1;
            }
        }

        if name == UNKNOWN {
            *tally.unknown_instructions.entry(word).or_insert(0) += 1;
        }

        *tally.mnemonics.entry(name).or_insert(0) += 1;
    }

    Ok(tally)
}
