//! Bit-field accessors over a 32-bit RISC-V instruction word.
//!
//! Every function here is a pure projection: any 32-bit input is
//! structurally valid to decode, even when it is not a legal instruction.
//! Legality is the decode table's concern, not this module's.

/// Standard RISC-V opcodes relevant to classification (bits [6:0]).
pub mod opcode {
    /// OP-IMM: immediate arithmetic (ADDI et al.), the common a7 producer.
    pub const OP_IMM: u32 = 0x13;
    /// LUI: load upper immediate, the other recognized a7 producer.
    pub const LUI: u32 = 0x37;
    /// SYSTEM: ECALL/EBREAK and CSR instructions.
    pub const SYSTEM: u32 = 0x73;
}

/// Register indices with an architectural role in syscall dispatch.
pub mod reg {
    /// a7 (x17) holds the system-call number at an ECALL.
    pub const A7: u32 = 17;
}

/// Extract the opcode, bits [6:0].
pub fn opcode(word: u32) -> u32 {
    word & 0x7F
}

/// Extract funct3, bits [14:12].
pub fn funct3(word: u32) -> u32 {
    (word >> 12) & 0x7
}

/// Extract funct7, bits [31:25].
pub fn funct7(word: u32) -> u32 {
    word >> 25
}

/// Extract funct12, bits [31:20].
///
/// Doubles as the trap-code field for SYSTEM instructions (ECALL vs.
/// EBREAK differ only here).
pub fn funct12(word: u32) -> u32 {
    (word >> 20) & 0xFFF
}

/// Extract rd (destination register index, 0-31), bits [11:7].
pub fn rd(word: u32) -> u32 {
    (word >> 7) & 0x1F
}

/// Extract rs1 (first source register index), bits [19:15].
pub fn rs1(word: u32) -> u32 {
    (word >> 15) & 0x1F
}

/// Extract the I-type immediate, bits [31:20], as an **unsigned** 12-bit
/// value.
///
/// No sign-extension is performed: the only consumers are syscall numbers
/// and other small positive immediates. Do not reuse this for
/// general-purpose operand recovery.
pub fn imm_i(word: u32) -> u32 {
    (word >> 20) & 0xFFF
}

/// Extract the U-type immediate, bits [31:12], left in position.
///
/// The caller shifts right by 12 to recover the bare 20-bit value.
pub fn imm_u(word: u32) -> u32 {
    word & 0xFFFF_F000
}

#[cfg(test)]
mod tests {
    use super::*;

    // addi x17, x0, 93
    const ADDI_A7_93: u32 = (93 << 20) | (17 << 7) | 0x13;
    // ecall
    const ECALL: u32 = 0x0000_0073;
    // ebreak
    const EBREAK: u32 = 0x0010_0073;

    #[test]
    fn test_opcode_extraction() {
        assert_eq!(opcode(ADDI_A7_93), opcode::OP_IMM);
        assert_eq!(opcode(ECALL), opcode::SYSTEM);
    }

    #[test]
    fn test_funct_fields() {
        assert_eq!(funct3(ECALL), 0);
        assert_eq!(funct12(ECALL), 0x000);
        assert_eq!(funct12(EBREAK), 0x001);
        // funct7 of SUB x0, x0, x0 (0x40000033)
        assert_eq!(funct7(0x4000_0033), 0x20);
    }

    #[test]
    fn test_register_fields() {
        assert_eq!(rd(ADDI_A7_93), reg::A7);
        assert_eq!(rs1(ADDI_A7_93), 0);
    }

    #[test]
    fn test_immediates_unsigned() {
        assert_eq!(imm_i(ADDI_A7_93), 93);
        // lui x17, 0xABCDE
        let lui = 0xABCD_E000 | (17 << 7) | 0x37;
        assert_eq!(imm_u(lui) >> 12, 0xABCDE);
        // A negative I-immediate is *not* sign-extended.
        let addi_neg = (0xFFF << 20) | (17 << 7) | 0x13; // addi x17, x0, -1
        assert_eq!(imm_i(addi_neg), 0xFFF);
    }

    #[test]
    fn test_any_word_decodes() {
        // Pure projections never reject input.
        for w in [0u32, 1, 0xDEAD_BEEF, u32::MAX] {
            assert!(opcode(w) <= 0x7F);
            assert!(funct3(w) <= 0x7);
            assert!(funct7(w) <= 0x7F);
            assert!(rd(w) <= 31);
            assert!(rs1(w) <= 31);
            assert!(imm_i(w) <= 0xFFF);
        }
    }
}
