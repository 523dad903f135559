//! Static, bidirectional opcode table for the 151 documented 6502 instructions.
//!
//! `encode` is the table the assembler consults: (mnemonic, addressing mode)
//! -> opcode byte. `decode` is its inverse, consulted by the CPU on every
//! fetch. Neither table is built at runtime from the other; both are written
//! out explicitly so a mismatch between them is a compile-time typo, not a
//! reflection bug.
//! Ref: http://www.6502.org/tutorials/6502opcodes.html

use std::fmt;

/// Mnemonics for all 6502 CPU instructions.
/// Ref: http://www.thealmightyguru.com/Games/Hacking/Wiki/index.php/6502_Opcodes
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Mnemonic {
    LDA, LDX, LDY, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,     // Storage
    ADC, DEC, DEX, DEY, INC, INX, INY, SBC,                        // Math
    AND, ASL, BIT, EOR, LSR, ORA, ROL, ROR,                        // Bitwise
    BCC, BCS, BEQ, BMI, BNE, BPL, BVC, BVS,                        // Branch
    JMP, JSR, RTI, RTS,                                            // Jump
    CLC, CLD, CLI, CLV, CMP, CPX, CPY, SEC, SED, SEI,              // Registers
    PHA, PHP, PLA, PLP,                                            // Stack
    BRK, NOP,                                                      // System
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// All possible 6502 addressing modes.
/// Ref: http://www.thealmightyguru.com/Games/Hacking/Wiki/index.php?title=Addressing_Modes
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum AddressingMode {
    Imp,    // Implicit            No operand,                                   eg: TAX
    Acc,    // Accumulator         No operand, accumulator is implied            eg: ASL
    Imm,    // Immediate           Operand value is contained in instruction     ex: LDA #$07
    Zp,     // ZeroPage            Operand is an address, low byte only          ex: LDA $EE
    Zpx,    // Indexed ZeroPage X  1-byte address, X register added to it        eg: STA $00,X
    Zpy,    // Indexed ZeroPage Y  1-byte address, Y register added to it        eg: STA $00,Y
    Abs,    // Absolute            Operand is an address, both bytes used        ex: LDA $16A0
    Abx,    // Indexed Absolute X  2-byte address, X register added to it        eg: STA $1000,X
    Aby,    // Indexed Absolute Y  2-byte address, Y register added to it        eg: STA $1000,Y
    Ind,    // Indirect            2-byte pointer at adjacent locations          eg: JMP ($0020)
    Inx,    // Indexed Indirect    2-byte pointer from 1-byte address + X        eg: LDA ($40,X)
    Iny,    // Indirect Indexed    2-byte pointer from 1-byte address, + Y       eg: LDA ($46),Y
    Rel,    // Relative            1-byte signed operand added to PC             eg: BEQ $04
}

impl AddressingMode {
    /// Number of operand bytes consumed from the instruction stream, per spec.md §4.4.3.
    pub fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Imp | AddressingMode::Acc => 0,
            AddressingMode::Imm
            | AddressingMode::Zp
            | AddressingMode::Zpx
            | AddressingMode::Zpy
            | AddressingMode::Inx
            | AddressingMode::Iny
            | AddressingMode::Rel => 1,
            AddressingMode::Abs | AddressingMode::Abx | AddressingMode::Aby | AddressingMode::Ind => 2,
        }
    }
}

/// Mnemonics whose only addressing mode is implicit: the lexer does not read
/// a following operand token for these.
pub const IMPLICIT_MNEMONICS: &[Mnemonic] = &[
    Mnemonic::TAX, Mnemonic::TAY, Mnemonic::TSX, Mnemonic::TXA, Mnemonic::TXS, Mnemonic::TYA,
    Mnemonic::DEX, Mnemonic::DEY, Mnemonic::INX, Mnemonic::INY,
    Mnemonic::RTI, Mnemonic::RTS,
    Mnemonic::CLC, Mnemonic::CLD, Mnemonic::CLI, Mnemonic::CLV, Mnemonic::SEC, Mnemonic::SED, Mnemonic::SEI,
    Mnemonic::PHA, Mnemonic::PHP, Mnemonic::PLA, Mnemonic::PLP,
    Mnemonic::BRK, Mnemonic::NOP,
];

/// ENCODE: (mnemonic, mode) -> opcode byte. The assembler's ground truth.
pub fn encode(mnemonic: Mnemonic, mode: AddressingMode) -> Option<u8> {
    use self::AddressingMode::*;
    use self::Mnemonic::*;
    Some(match (mnemonic, mode) {
        (LDA, Imm) => 0xa9, (LDA, Zp) => 0xa5, (LDA, Zpx) => 0xb5, (LDA, Abs) => 0xad,
        (LDA, Abx) => 0xbd, (LDA, Aby) => 0xb9, (LDA, Inx) => 0xa1, (LDA, Iny) => 0xb1,

        (LDX, Imm) => 0xa2, (LDX, Zp) => 0xa6, (LDX, Zpy) => 0xb6, (LDX, Abs) => 0xae, (LDX, Aby) => 0xbe,

        (LDY, Imm) => 0xa0, (LDY, Zp) => 0xa4, (LDY, Zpx) => 0xb4, (LDY, Abs) => 0xac, (LDY, Abx) => 0xbc,

        (STA, Zp) => 0x85, (STA, Zpx) => 0x95, (STA, Abs) => 0x8d, (STA, Abx) => 0x9d,
        (STA, Aby) => 0x99, (STA, Inx) => 0x81, (STA, Iny) => 0x91,

        (STX, Zp) => 0x86, (STX, Zpy) => 0x96, (STX, Abs) => 0x8e,

        (STY, Zp) => 0x84, (STY, Zpx) => 0x94, (STY, Abs) => 0x8c,

        (TAX, Imp) => 0xaa, (TAY, Imp) => 0xa8, (TSX, Imp) => 0xba,
        (TXA, Imp) => 0x8a, (TXS, Imp) => 0x9a, (TYA, Imp) => 0x98,

        (ADC, Imm) => 0x69, (ADC, Zp) => 0x65, (ADC, Zpx) => 0x75, (ADC, Abs) => 0x6d,
        (ADC, Abx) => 0x7d, (ADC, Aby) => 0x79, (ADC, Inx) => 0x61, (ADC, Iny) => 0x71,

        (DEC, Zp) => 0xc6, (DEC, Zpx) => 0xd6, (DEC, Abs) => 0xce, (DEC, Abx) => 0xde,
        (DEX, Imp) => 0xca, (DEY, Imp) => 0x88,

        (INC, Zp) => 0xe6, (INC, Zpx) => 0xf6, (INC, Abs) => 0xee, (INC, Abx) => 0xfe,
        (INX, Imp) => 0xe8, (INY, Imp) => 0xc8,

        (SBC, Imm) => 0xe9, (SBC, Zp) => 0xe5, (SBC, Zpx) => 0xf5, (SBC, Abs) => 0xed,
        (SBC, Abx) => 0xfd, (SBC, Aby) => 0xf9, (SBC, Inx) => 0xe1, (SBC, Iny) => 0xf1,

        (AND, Imm) => 0x29, (AND, Zp) => 0x25, (AND, Zpx) => 0x35, (AND, Abs) => 0x2d,
        (AND, Abx) => 0x3d, (AND, Aby) => 0x39, (AND, Inx) => 0x21, (AND, Iny) => 0x31,

        (ASL, Acc) => 0x0a, (ASL, Zp) => 0x06, (ASL, Zpx) => 0x16, (ASL, Abs) => 0x0e, (ASL, Abx) => 0x1e,

        (BIT, Zp) => 0x24, (BIT, Abs) => 0x2c,

        (EOR, Imm) => 0x49, (EOR, Zp) => 0x45, (EOR, Zpx) => 0x55, (EOR, Abs) => 0x4d,
        (EOR, Abx) => 0x5d, (EOR, Aby) => 0x59, (EOR, Inx) => 0x41, (EOR, Iny) => 0x51,

        (LSR, Acc) => 0x4a, (LSR, Zp) => 0x46, (LSR, Zpx) => 0x56, (LSR, Abs) => 0x4e, (LSR, Abx) => 0x5e,

        (ORA, Imm) => 0x09, (ORA, Zp) => 0x05, (ORA, Zpx) => 0x15, (ORA, Abs) => 0x0d,
        (ORA, Abx) => 0x1d, (ORA, Aby) => 0x19, (ORA, Inx) => 0x01, (ORA, Iny) => 0x11,

        (ROL, Acc) => 0x2a, (ROL, Zp) => 0x26, (ROL, Zpx) => 0x36, (ROL, Abs) => 0x2e, (ROL, Abx) => 0x3e,
        (ROR, Acc) => 0x6a, (ROR, Zp) => 0x66, (ROR, Zpx) => 0x76, (ROR, Abs) => 0x6e, (ROR, Abx) => 0x7e,

        (BPL, Rel) => 0x10, (BMI, Rel) => 0x30, (BVC, Rel) => 0x50, (BVS, Rel) => 0x70,
        (BCC, Rel) => 0x90, (BCS, Rel) => 0xb0, (BNE, Rel) => 0xd0, (BEQ, Rel) => 0xf0,

        (JMP, Abs) => 0x4c, (JMP, Ind) => 0x6c,
        (JSR, Abs) => 0x20,
        (RTI, Imp) => 0x40, (RTS, Imp) => 0x60,

        (CLC, Imp) => 0x18, (SEC, Imp) => 0x38, (CLI, Imp) => 0x58, (SEI, Imp) => 0x78,
        (CLV, Imp) => 0xb8, (CLD, Imp) => 0xd8, (SED, Imp) => 0xf8,

        (CMP, Imm) => 0xc9, (CMP, Zp) => 0xc5, (CMP, Zpx) => 0xd5, (CMP, Abs) => 0xcd,
        (CMP, Abx) => 0xdd, (CMP, Aby) => 0xd9, (CMP, Inx) => 0xc1, (CMP, Iny) => 0xd1,

        (CPX, Imm) => 0xe0, (CPX, Zp) => 0xe4, (CPX, Abs) => 0xec,
        (CPY, Imm) => 0xc0, (CPY, Zp) => 0xc4, (CPY, Abs) => 0xcc,

        (PHA, Imp) => 0x48, (PHP, Imp) => 0x08, (PLA, Imp) => 0x68, (PLP, Imp) => 0x28,

        (BRK, Imp) => 0x00,
        (NOP, Imp) => 0xea,

        _ => return None,
    })
}

/// DECODE: opcode byte -> (mnemonic, mode). Built once, consulted by the CPU
/// on every fetch. Any byte not covered here is an illegal instruction.
pub fn decode(opcode: u8) -> Option<(Mnemonic, AddressingMode)> {
    use self::AddressingMode::*;
    use self::Mnemonic::*;
    Some(match opcode {
        0xa9 => (LDA, Imm), 0xa5 => (LDA, Zp), 0xb5 => (LDA, Zpx), 0xad => (LDA, Abs),
        0xbd => (LDA, Abx), 0xb9 => (LDA, Aby), 0xa1 => (LDA, Inx), 0xb1 => (LDA, Iny),

        0xa2 => (LDX, Imm), 0xa6 => (LDX, Zp), 0xb6 => (LDX, Zpy), 0xae => (LDX, Abs), 0xbe => (LDX, Aby),

        0xa0 => (LDY, Imm), 0xa4 => (LDY, Zp), 0xb4 => (LDY, Zpx), 0xac => (LDY, Abs), 0xbc => (LDY, Abx),

        0x85 => (STA, Zp), 0x95 => (STA, Zpx), 0x8d => (STA, Abs), 0x9d => (STA, Abx),
        0x99 => (STA, Aby), 0x81 => (STA, Inx), 0x91 => (STA, Iny),

        0x86 => (STX, Zp), 0x96 => (STX, Zpy), 0x8e => (STX, Abs),

        0x84 => (STY, Zp), 0x94 => (STY, Zpx), 0x8c => (STY, Abs),

        0xaa => (TAX, Imp), 0xa8 => (TAY, Imp), 0xba => (TSX, Imp),
        0x8a => (TXA, Imp), 0x9a => (TXS, Imp), 0x98 => (TYA, Imp),

        0x69 => (ADC, Imm), 0x65 => (ADC, Zp), 0x75 => (ADC, Zpx), 0x6d => (ADC, Abs),
        0x7d => (ADC, Abx), 0x79 => (ADC, Aby), 0x61 => (ADC, Inx), 0x71 => (ADC, Iny),

        0xc6 => (DEC, Zp), 0xd6 => (DEC, Zpx), 0xce => (DEC, Abs), 0xde => (DEC, Abx),
        0xca => (DEX, Imp), 0x88 => (DEY, Imp),

        0xe6 => (INC, Zp), 0xf6 => (INC, Zpx), 0xee => (INC, Abs), 0xfe => (INC, Abx),
        0xe8 => (INX, Imp), 0xc8 => (INY, Imp),

        0xe9 => (SBC, Imm), 0xe5 => (SBC, Zp), 0xf5 => (SBC, Zpx), 0xed => (SBC, Abs),
        0xfd => (SBC, Abx), 0xf9 => (SBC, Aby), 0xe1 => (SBC, Inx), 0xf1 => (SBC, Iny),

        0x29 => (AND, Imm), 0x25 => (AND, Zp), 0x35 => (AND, Zpx), 0x2d => (AND, Abs),
        0x3d => (AND, Abx), 0x39 => (AND, Aby), 0x21 => (AND, Inx), 0x31 => (AND, Iny),

        0x0a => (ASL, Acc), 0x06 => (ASL, Zp), 0x16 => (ASL, Zpx), 0x0e => (ASL, Abs), 0x1e => (ASL, Abx),

        0x24 => (BIT, Zp), 0x2c => (BIT, Abs),

        0x49 => (EOR, Imm), 0x45 => (EOR, Zp), 0x55 => (EOR, Zpx), 0x4d => (EOR, Abs),
        0x5d => (EOR, Abx), 0x59 => (EOR, Aby), 0x41 => (EOR, Inx), 0x51 => (EOR, Iny),

        0x4a => (LSR, Acc), 0x46 => (LSR, Zp), 0x56 => (LSR, Zpx), 0x4e => (LSR, Abs), 0x5e => (LSR, Abx),

        0x09 => (ORA, Imm), 0x05 => (ORA, Zp), 0x15 => (ORA, Zpx), 0x0d => (ORA, Abs),
        0x1d => (ORA, Abx), 0x19 => (ORA, Aby), 0x01 => (ORA, Inx), 0x11 => (ORA, Iny),

        0x2a => (ROL, Acc), 0x26 => (ROL, Zp), 0x36 => (ROL, Zpx), 0x2e => (ROL, Abs), 0x3e => (ROL, Abx),
        0x6a => (ROR, Acc), 0x66 => (ROR, Zp), 0x76 => (ROR, Zpx), 0x6e => (ROR, Abs), 0x7e => (ROR, Abx),

        0x10 => (BPL, Rel), 0x30 => (BMI, Rel), 0x50 => (BVC, Rel), 0x70 => (BVS, Rel),
        0x90 => (BCC, Rel), 0xb0 => (BCS, Rel), 0xd0 => (BNE, Rel), 0xf0 => (BEQ, Rel),

        0x4c => (JMP, Abs), 0x6c => (JMP, Ind),
        0x20 => (JSR, Abs),
        0x40 => (RTI, Imp), 0x60 => (RTS, Imp),

        0x18 => (CLC, Imp), 0x38 => (SEC, Imp), 0x58 => (CLI, Imp), 0x78 => (SEI, Imp),
        0xb8 => (CLV, Imp), 0xd8 => (CLD, Imp), 0xf8 => (SED, Imp),

        0xc9 => (CMP, Imm), 0xc5 => (CMP, Zp), 0xd5 => (CMP, Zpx), 0xcd => (CMP, Abs),
        0xdd => (CMP, Abx), 0xd9 => (CMP, Aby), 0xc1 => (CMP, Inx), 0xd1 => (CMP, Iny),

        0xe0 => (CPX, Imm), 0xe4 => (CPX, Zp), 0xec => (CPX, Abs),
        0xc0 => (CPY, Imm), 0xc4 => (CPY, Zp), 0xcc => (CPY, Abs),

        0x48 => (PHA, Imp), 0x08 => (PHP, Imp), 0x68 => (PLA, Imp), 0x28 => (PLP, Imp),

        0x00 => (BRK, Imp),
        0xea => (NOP, Imp),

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Round-trip: for every (mnemonic, mode) this table can encode,
    // decoding the resulting opcode must recover the same pair.
    #[test]
    fn round_trips_every_encodable_pair() {
        let modes = [
            AddressingMode::Imp, AddressingMode::Acc, AddressingMode::Imm,
            AddressingMode::Zp, AddressingMode::Zpx, AddressingMode::Zpy,
            AddressingMode::Abs, AddressingMode::Abx, AddressingMode::Aby,
            AddressingMode::Ind, AddressingMode::Inx, AddressingMode::Iny, AddressingMode::Rel,
        ];
        let mnemonics = [
            Mnemonic::LDA, Mnemonic::LDX, Mnemonic::LDY, Mnemonic::STA, Mnemonic::STX, Mnemonic::STY,
            Mnemonic::TAX, Mnemonic::TAY, Mnemonic::TSX, Mnemonic::TXA, Mnemonic::TXS, Mnemonic::TYA,
            Mnemonic::ADC, Mnemonic::DEC, Mnemonic::DEX, Mnemonic::DEY, Mnemonic::INC, Mnemonic::INX,
            Mnemonic::INY, Mnemonic::SBC, Mnemonic::AND, Mnemonic::ASL, Mnemonic::BIT, Mnemonic::EOR,
            Mnemonic::LSR, Mnemonic::ORA, Mnemonic::ROL, Mnemonic::ROR, Mnemonic::BCC, Mnemonic::BCS,
            Mnemonic::BEQ, Mnemonic::BMI, Mnemonic::BNE, Mnemonic::BPL, Mnemonic::BVC, Mnemonic::BVS,
            Mnemonic::JMP, Mnemonic::JSR, Mnemonic::RTI, Mnemonic::RTS, Mnemonic::CLC, Mnemonic::CLD,
            Mnemonic::CLI, Mnemonic::CLV, Mnemonic::CMP, Mnemonic::CPX, Mnemonic::CPY, Mnemonic::SEC,
            Mnemonic::SED, Mnemonic::SEI, Mnemonic::PHA, Mnemonic::PHP, Mnemonic::PLA, Mnemonic::PLP,
            Mnemonic::BRK, Mnemonic::NOP,
        ];

        let mut covered = 0;
        for &m in &mnemonics {
            for &mode in &modes {
                if let Some(opcode) = encode(m, mode) {
                    covered += 1;
                    assert_eq!(decode(opcode), Some((m, mode)), "opcode ${:02X}", opcode);
                }
            }
        }
        assert_eq!(covered, 151, "expected exactly 151 standard opcodes");
    }

    #[test]
    fn illegal_opcode_has_no_decoding() {
        // 0x02 is a documented illegal/undefined opcode on the NMOS 6502.
        assert_eq!(decode(0x02), None);
    }

    #[test]
    fn operand_lengths_match_table_4_4_3() {
        assert_eq!(AddressingMode::Imp.operand_len(), 0);
        assert_eq!(AddressingMode::Acc.operand_len(), 0);
        assert_eq!(AddressingMode::Imm.operand_len(), 1);
        assert_eq!(AddressingMode::Zp.operand_len(), 1);
        assert_eq!(AddressingMode::Rel.operand_len(), 1);
        assert_eq!(AddressingMode::Abs.operand_len(), 2);
        assert_eq!(AddressingMode::Ind.operand_len(), 2);
    }
}
