//! Recovery of the system-call number behind an ECALL.
//!
//! There is no execution model here. The resolver leans on the calling
//! convention: compilers place the syscall number in a7 (x17) with an
//! `addi`/`li` or `lui` at most a few instructions before the trap, so a
//! short straight-line lookback finds it in practice. Scanning runs
//! nearest-first, which makes the closest a7 writer win ("last write
//! wins" without data-flow analysis).

use crate::fields::{self, opcode, reg};
use crate::tables::SyscallTable;

/// How many instructions before the ECALL are inspected for the a7 writer.
pub const LOOKBACK: usize = 5;

/// Marker present in every label the aggregator counts as an unresolved
/// syscall.
pub const UNKNOWN_SYSCALL: &str = "UNKNOWN_SYSCALL";

/// Resolve the ECALL at `ecall_index` to a labeled outcome.
///
/// Returns one of:
/// - `"ECALL.<name>"` when the recovered a7 value has a table entry;
/// - `"UNKNOWN_SYSCALL (a7 = 0x<HEX>)"` when a value was recovered but the
///   table does not name it;
/// - `"UNKNOWN_SYSCALL (a7 = UNKNOWN)"` when no a7 writer was found in the
///   window.
///
/// The window covers up to [`LOOKBACK`] instructions strictly preceding
/// `ecall_index` and never reaches before the start of the stream; an
/// ECALL at index 0 always takes the undetermined path.
pub fn resolve_syscall(stream: &[u32], ecall_index: usize, table: &SyscallTable) -> String {
    match find_a7_value(stream, ecall_index) {
        None => format!("{UNKNOWN_SYSCALL} (a7 = UNKNOWN)"),
        Some(number) => match table.name_of(number) {
            Some(name) => format!("ECALL.{name}"),
            None => format!("{UNKNOWN_SYSCALL} (a7 = 0x{number:X})"),
        },
    }
}

/// Scan the lookback window for the nearest instruction that writes an
/// immediate into a7.
///
/// Only the two immediate-producing encodings are recognized: OP-IMM
/// (`addi a7, _, imm`, unsigned 12-bit immediate) and LUI (`lui a7, imm`,
/// upper 20 bits shifted back down). An instruction of any other shape
/// with rd = 17 is skipped rather than matched; that trades a few missed
/// producer encodings for no false positives from unrelated writes.
fn find_a7_value(stream: &[u32], ecall_index: usize) -> Option<u32> {
    let window_start = ecall_index.saturating_sub(LOOKBACK);
    for &word in stream[window_start..ecall_index].iter().rev() {
        if fields::rd(word) != reg::A7 {
            continue;
        }
        match fields::opcode(word) {
            opcode::OP_IMM => return Some(fields::imm_i(word)),
            opcode::LUI => return Some(fields::imm_u(word) >> 12),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECALL: u32 = 0x0000_0073;

    fn addi(rd: u32, imm: u32) -> u32 {
        (imm << 20) | (rd << 7) | 0x13
    }

    fn lui(rd: u32, imm20: u32) -> u32 {
        (imm20 << 12) | (rd << 7) | 0x37
    }

    fn table() -> SyscallTable {
        SyscallTable::from_pairs([(93, "exit"), (64, "write")])
    }

    #[test]
    fn test_addi_producer() {
        let stream = [addi(17, 93), ECALL];
        assert_eq!(resolve_syscall(&stream, 1, &table()), "ECALL.exit");
    }

    #[test]
    fn test_lui_producer() {
        let stream = [lui(17, 64), ECALL];
        assert_eq!(resolve_syscall(&stream, 1, &table()), "ECALL.write");
    }

    #[test]
    fn test_unlisted_number() {
        let stream = [addi(17, 0x5D), ECALL];
        let no_exit = SyscallTable::from_pairs([(64, "write")]);
        assert_eq!(
            resolve_syscall(&stream, 1, &no_exit),
            "UNKNOWN_SYSCALL (a7 = 0x5D)"
        );
    }

    #[test]
    fn test_no_producer_in_window() {
        // a7 is written, but by an R-type shape the resolver doesn't trust.
        let add_a7 = (17 << 7) | 0x33; // add a7, x0, x0
        let stream = [add_a7, ECALL];
        assert_eq!(
            resolve_syscall(&stream, 1, &table()),
            "UNKNOWN_SYSCALL (a7 = UNKNOWN)"
        );
    }

    #[test]
    fn test_other_rd_ignored() {
        let stream = [addi(10, 93), ECALL]; // writes a0, not a7
        assert_eq!(
            resolve_syscall(&stream, 1, &table()),
            "UNKNOWN_SYSCALL (a7 = UNKNOWN)"
        );
    }

    #[test]
    fn test_nearest_writer_wins() {
        let stream = [addi(17, 93), addi(17, 64), ECALL];
        assert_eq!(resolve_syscall(&stream, 2, &table()), "ECALL.write");
    }

    #[test]
    fn test_window_is_bounded() {
        // The writer sits 6 instructions back, one past the window edge.
        let nop = addi(0, 0);
        let stream = [addi(17, 93), nop, nop, nop, nop, nop, ECALL];
        assert_eq!(
            resolve_syscall(&stream, 6, &table()),
            "UNKNOWN_SYSCALL (a7 = UNKNOWN)"
        );
        // At exactly 5 back it is still visible.
        let stream = [addi(17, 93), nop, nop, nop, nop, ECALL];
        assert_eq!(resolve_syscall(&stream, 5, &table()), "ECALL.exit");
    }

    #[test]
    fn test_ecall_at_stream_start() {
        let stream = [ECALL];
        assert_eq!(
            resolve_syscall(&stream, 0, &table()),
            "UNKNOWN_SYSCALL (a7 = UNKNOWN)"
        );
    }
}
