//! Operand-token classification.
//!
//! The lexer hands the code generator a bare, already-whitespace-isolated
//! token such as `#$2a`, `$00,x`, `($24,x)`, or `loop`. This module turns
//! that string into a structured [`OperandToken`] using `nom` combinators.

use std::str;

use nom::{digit, hex_digit, IResult};

use crate::opcodes::AddressingMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    X,
    Y,
}

/// The lexical shape of an operand, before the code generator has decided
/// how many bytes it needs or which opcode it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandToken {
    Accumulator,
    Immediate(u8),
    ZeroPage(u8),
    ZeroPageIndexed(u8, Index),
    Absolute(u16),
    AbsoluteIndexed(u16, Index),
    Indirect(u16),
    IndexedIndirect(u8), // (d,X)
    IndirectIndexed(u8), // (d),Y
    Label(String),
}

impl OperandToken {
    /// The addressing mode this lexical shape maps onto for mnemonics that
    /// are not `JMP`/`JSR` (those re-derive mode from the label's byte width
    /// at back-patch time instead; see `codegen`).
    pub fn addressing_mode(&self) -> AddressingMode {
        match self {
            OperandToken::Accumulator => AddressingMode::Acc,
            OperandToken::Immediate(_) => AddressingMode::Imm,
            OperandToken::ZeroPage(_) => AddressingMode::Zp,
            OperandToken::ZeroPageIndexed(_, Index::X) => AddressingMode::Zpx,
            OperandToken::ZeroPageIndexed(_, Index::Y) => AddressingMode::Zpy,
            OperandToken::Absolute(_) => AddressingMode::Abs,
            OperandToken::AbsoluteIndexed(_, Index::X) => AddressingMode::Abx,
            OperandToken::AbsoluteIndexed(_, Index::Y) => AddressingMode::Aby,
            OperandToken::Indirect(_) => AddressingMode::Ind,
            OperandToken::IndexedIndirect(_) => AddressingMode::Inx,
            OperandToken::IndirectIndexed(_) => AddressingMode::Iny,
            // A bare label reference is resolved by the caller (branch vs. jmp/jsr).
            OperandToken::Label(_) => AddressingMode::Rel,
        }
    }
}

fn to_u8_hex(digits: &[u8]) -> Option<u8> {
    u8::from_str_radix(str::from_utf8(digits).ok()?, 16).ok()
}

fn to_u16_hex(digits: &[u8]) -> Option<u16> {
    u16::from_str_radix(str::from_utf8(digits).ok()?, 16).ok()
}

fn to_u8_dec(digits: &[u8]) -> Option<u8> {
    str::from_utf8(digits).ok()?.parse().ok()
}

named!(index_suffix<&[u8], Index>,
    do_parse!(
        tag!(",") >>
        idx: alt!(
            map!(alt!(tag!("x")), |_| Index::X) |
            map!(alt!(tag!("y")), |_| Index::Y)
        ) >>
        (idx)
    )
);

named!(immediate<&[u8], OperandToken>,
    do_parse!(
        tag!("#") >>
        value: alt!(
            map_opt!(preceded!(tag!("$"), hex_digit), to_u8_hex) |
            map_opt!(digit, to_u8_dec)
        ) >>
        (OperandToken::Immediate(value))
    )
);

named!(indexed_indirect<&[u8], OperandToken>,
    do_parse!(
        tag!("(") >>
        tag!("$") >>
        zp: map_opt!(hex_digit, to_u8_hex) >>
        tag!(",x)") >>
        (OperandToken::IndexedIndirect(zp))
    )
);

named!(indirect_indexed<&[u8], OperandToken>,
    do_parse!(
        tag!("(") >>
        tag!("$") >>
        zp: map_opt!(hex_digit, to_u8_hex) >>
        tag!("),y") >>
        (OperandToken::IndirectIndexed(zp))
    )
);

named!(indirect<&[u8], OperandToken>,
    do_parse!(
        tag!("(") >>
        tag!("$") >>
        addr: map_opt!(hex_digit, to_u16_hex) >>
        tag!(")") >>
        (OperandToken::Indirect(addr))
    )
);

named!(direct<&[u8], OperandToken>,
    do_parse!(
        tag!("$") >>
        digits: hex_digit >>
        idx: opt!(complete!(index_suffix)) >>
        (match (digits.len(), idx) {
            (1...2, None) => OperandToken::ZeroPage(to_u8_hex(digits).unwrap_or(0)),
            (1...2, Some(i)) => OperandToken::ZeroPageIndexed(to_u8_hex(digits).unwrap_or(0), i),
            (_, None) => OperandToken::Absolute(to_u16_hex(digits).unwrap_or(0)),
            (_, Some(i)) => OperandToken::AbsoluteIndexed(to_u16_hex(digits).unwrap_or(0), i),
        })
    )
);

named!(accumulator<&[u8], OperandToken>,
    map!(alt!(tag!("a")), |_| OperandToken::Accumulator)
);

fn is_label_char(c: u8) -> bool {
    let c = c as char;
    c.is_alphanumeric() || c == '_'
}

named!(label<&[u8], OperandToken>,
    map!(
        map_opt!(take_while1!(is_label_char), |b| str::from_utf8(b).ok()),
        |s: &str| OperandToken::Label(s.to_string())
    )
);

named!(operand_token<&[u8], OperandToken>,
    alt!(
        complete!(immediate) |
        complete!(indexed_indirect) |
        complete!(indirect_indexed) |
        complete!(indirect) |
        complete!(direct) |
        complete!(accumulator) |
        complete!(label)
    )
);

/// Classify a single already-whitespace-isolated token into its operand shape.
/// `None` means the token is lexically malformed.
pub fn classify(token: &str) -> Option<OperandToken> {
    match operand_token(token.as_bytes()) {
        IResult::Done(rest, value) if rest.is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_hex_and_decimal() {
        assert_eq!(classify("#$2a"), Some(OperandToken::Immediate(0x2a)));
        assert_eq!(classify("#42"), Some(OperandToken::Immediate(42)));
    }

    #[test]
    fn zero_page_vs_absolute_by_digit_count() {
        assert_eq!(classify("$ee"), Some(OperandToken::ZeroPage(0xee)));
        assert_eq!(classify("$16a0"), Some(OperandToken::Absolute(0x16a0)));
    }

    #[test]
    fn indexed_forms() {
        assert_eq!(
            classify("$00,x"),
            Some(OperandToken::ZeroPageIndexed(0x00, Index::X))
        );
        assert_eq!(
            classify("$1000,y"),
            Some(OperandToken::AbsoluteIndexed(0x1000, Index::Y))
        );
    }

    #[test]
    fn indirect_forms() {
        assert_eq!(classify("($0020)"), Some(OperandToken::Indirect(0x0020)));
        assert_eq!(classify("($40,x)"), Some(OperandToken::IndexedIndirect(0x40)));
        assert_eq!(classify("($46),y"), Some(OperandToken::IndirectIndexed(0x46)));
    }

    #[test]
    fn accumulator_and_label() {
        assert_eq!(classify("a"), Some(OperandToken::Accumulator));
        assert_eq!(classify("loop"), Some(OperandToken::Label("loop".to_string())));
    }
}
