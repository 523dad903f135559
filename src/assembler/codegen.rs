//! Two-pass code generation: a forward walk that emits bytes and placeholder
//! fix-ups, followed by a back-patch sweep once every label's address is
//! known. Grounded on `original_source/assembler.py`'s `Assembler.assemble`
//! and `get_op_codes`/`op_with_arg`, reshaped into typed Rust with a
//! `Result`-based error path instead of bare exceptions.

use std::collections::HashMap;

use crate::assembler::lexer::Lexer;
use crate::assembler::operand::{self, OperandToken};
use crate::error::AssembleError;
use crate::opcodes::{self, AddressingMode, Mnemonic, IMPLICIT_MNEMONICS};

/// Default load/start address used when none is specified, per spec.md §4.3.
pub const DEFAULT_START_ADDRESS: u16 = 0x0600;

/// Output of a successful assembly: the byte image plus the PC -> source
/// line map a debugger/trace collaborator consumes (spec.md §3).
pub struct Assembled {
    pub image: Vec<u8>,
    pub line_map: HashMap<u16, u32>,
}

struct RelativeFixup {
    offset: usize,
    label: String,
    line: u32,
}

struct AbsoluteFixup {
    offset: usize,
    label: String,
}

pub fn assemble(program: &str, start_address: u16) -> Result<Assembled, AssembleError> {
    let mut lexer = Lexer::new(program);
    let mut labels: HashMap<String, u16> = HashMap::new();
    let mut relatives: Vec<RelativeFixup> = Vec::new();
    let mut absolutes: Vec<AbsoluteFixup> = Vec::new();
    let mut line_map: HashMap<u16, u32> = HashMap::new();
    let mut image: Vec<u8> = Vec::new();

    while let Some(token) = lexer.next() {
        let pc = start_address.wrapping_add(image.len() as u16);
        let line = lexer.line();
        line_map.insert(pc, line);

        if let Some(label_name) = token.strip_suffix(':') {
            if labels.contains_key(label_name) {
                return Err(AssembleError::DuplicateLabel {
                    label: label_name.to_string(),
                    line,
                });
            }
            labels.insert(label_name.to_string(), pc);
            continue;
        }

        let mnemonic = parse_mnemonic(&token).ok_or_else(|| AssembleError::MalformedOperand {
            line,
            token: token.clone(),
        })?;

        if IMPLICIT_MNEMONICS.contains(&mnemonic) {
            let opcode = opcodes::encode(mnemonic, AddressingMode::Imp).ok_or_else(|| {
                AssembleError::UnknownEncoding {
                    line,
                    mnemonic: token.clone(),
                    mode: AddressingMode::Imp,
                }
            })?;
            image.push(opcode);
            continue;
        }

        let operand_text = lexer.next().ok_or_else(|| AssembleError::MalformedOperand {
            line,
            token: token.clone(),
        })?;
        let operand = operand::classify(&operand_text).ok_or_else(|| AssembleError::MalformedOperand {
            line,
            token: operand_text.clone(),
        })?;

        emit(
            mnemonic,
            &token,
            operand,
            line,
            &mut image,
            &mut relatives,
            &mut absolutes,
        )?;
    }

    back_patch(&mut image, &relatives, &absolutes, &labels, start_address)?;

    debug!(
        "assembled {} bytes at ${:04X} ({} labels, {} fix-ups)",
        image.len(),
        start_address,
        labels.len(),
        relatives.len() + absolutes.len()
    );

    Ok(Assembled { image, line_map })
}

fn emit(
    mnemonic: Mnemonic,
    mnemonic_text: &str,
    operand: OperandToken,
    line: u32,
    image: &mut Vec<u8>,
    relatives: &mut Vec<RelativeFixup>,
    absolutes: &mut Vec<AbsoluteFixup>,
) -> Result<(), AssembleError> {
    if let OperandToken::Label(label) = operand {
        return match mnemonic {
            Mnemonic::JMP | Mnemonic::JSR => {
                let opcode = opcodes::encode(mnemonic, AddressingMode::Abs).ok_or_else(|| {
                    AssembleError::UnknownEncoding {
                        line,
                        mnemonic: mnemonic_text.to_string(),
                        mode: AddressingMode::Abs,
                    }
                })?;
                image.push(opcode);
                absolutes.push(AbsoluteFixup {
                    offset: image.len(),
                    label,
                });
                image.push(0);
                image.push(0);
                Ok(())
            }
            _ => {
                let opcode = opcodes::encode(mnemonic, AddressingMode::Rel).ok_or_else(|| {
                    AssembleError::UnknownEncoding {
                        line,
                        mnemonic: mnemonic_text.to_string(),
                        mode: AddressingMode::Rel,
                    }
                })?;
                image.push(opcode);
                relatives.push(RelativeFixup {
                    offset: image.len(),
                    label,
                    line,
                });
                image.push(0);
                Ok(())
            }
        };
    }

    let mode = operand.addressing_mode();
    let opcode = opcodes::encode(mnemonic, mode).ok_or_else(|| AssembleError::UnknownEncoding {
        line,
        mnemonic: mnemonic_text.to_string(),
        mode,
    })?;
    image.push(opcode);

    match operand {
        OperandToken::Accumulator => {}
        OperandToken::Immediate(v)
        | OperandToken::ZeroPage(v)
        | OperandToken::ZeroPageIndexed(v, _)
        | OperandToken::IndexedIndirect(v)
        | OperandToken::IndirectIndexed(v) => image.push(v),
        OperandToken::Absolute(v) | OperandToken::AbsoluteIndexed(v, _) | OperandToken::Indirect(v) => {
            image.push((v & 0xff) as u8);
            image.push((v >> 8) as u8);
        }
        OperandToken::Label(_) => unreachable!("handled above"),
    }

    Ok(())
}

fn back_patch(
    image: &mut [u8],
    relatives: &[RelativeFixup],
    absolutes: &[AbsoluteFixup],
    labels: &HashMap<String, u16>,
    start_address: u16,
) -> Result<(), AssembleError> {
    for fixup in relatives {
        let target = *labels.get(&fixup.label).ok_or_else(|| AssembleError::UndefinedLabel {
            label: fixup.label.clone(),
        })?;
        // Distance from the byte after the branch operand to the target.
        let from = start_address as i32 + fixup.offset as i32 + 1;
        let distance = target as i32 - from;
        if !(-128..=127).contains(&distance) {
            return Err(AssembleError::BranchOutOfRange {
                label: fixup.label.clone(),
                line: fixup.line,
                offset: distance,
            });
        }
        image[fixup.offset] = distance as i8 as u8;
    }

    for fixup in absolutes {
        let target = *labels.get(&fixup.label).ok_or_else(|| AssembleError::UndefinedLabel {
            label: fixup.label.clone(),
        })?;
        image[fixup.offset] = (target & 0xff) as u8;
        image[fixup.offset + 1] = (target >> 8) as u8;
    }

    Ok(())
}

fn parse_mnemonic(token: &str) -> Option<Mnemonic> {
    use Mnemonic::*;
    Some(match token {
        "lda" => LDA, "ldx" => LDX, "ldy" => LDY, "sta" => STA, "stx" => STX, "sty" => STY,
        "tax" => TAX, "tay" => TAY, "tsx" => TSX, "txa" => TXA, "txs" => TXS, "tya" => TYA,
        "adc" => ADC, "dec" => DEC, "dex" => DEX, "dey" => DEY, "inc" => INC, "inx" => INX,
        "iny" => INY, "sbc" => SBC,
        "and" => AND, "asl" => ASL, "bit" => BIT, "eor" => EOR, "lsr" => LSR, "ora" => ORA,
        "rol" => ROL, "ror" => ROR,
        "bcc" => BCC, "bcs" => BCS, "beq" => BEQ, "bmi" => BMI, "bne" => BNE, "bpl" => BPL,
        "bvc" => BVC, "bvs" => BVS,
        "jmp" => JMP, "jsr" => JSR, "rti" => RTI, "rts" => RTS,
        "clc" => CLC, "cld" => CLD, "cli" => CLI, "clv" => CLV, "cmp" => CMP, "cpx" => CPX,
        "cpy" => CPY, "sec" => SEC, "sed" => SED, "sei" => SEI,
        "pha" => PHA, "php" => PHP, "pla" => PLA, "plp" => PLP,
        "brk" => BRK, "nop" => NOP,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_store() {
        let out = assemble("LDA #$2A\nSTA $0000", DEFAULT_START_ADDRESS).unwrap();
        assert_eq!(out.image, vec![0xa9, 0x2a, 0x8d, 0x00, 0x00]);
    }

    #[test]
    fn countdown_with_backward_branch() {
        let src = "LDX #$08\ndec: DEX\nSTX $00\nCPX #$03\nBNE dec\nSTX $01\nBRK";
        let out = assemble(src, DEFAULT_START_ADDRESS).unwrap();
        // LDX #$08; dec: DEX; STX $00; CPX #$03; BNE dec; STX $01; BRK
        assert_eq!(
            out.image,
            vec![
                0xa2, 0x08, // LDX #$08
                0xca, // dec: DEX
                0x86, 0x00, // STX $00
                0xe0, 0x03, // CPX #$03
                0xd0, 0xf9, // BNE dec  (back 7 bytes)
                0x86, 0x01, // STX $01
                0x00, // BRK
            ]
        );
    }

    #[test]
    fn subroutine_call_and_return() {
        let src = "JSR there\nINX\nBRK\nthere: LDX #$01\nRTS";
        let out = assemble(src, DEFAULT_START_ADDRESS).unwrap();
        assert_eq!(
            out.image,
            vec![
                0x20, 0x05, 0x06, // JSR $0605
                0xe8, // INX
                0x00, // BRK
                0xa2, 0x01, // there: LDX #$01
                0x60, // RTS
            ]
        );
    }

    #[test]
    fn duplicate_label_is_fatal() {
        let err = assemble("loop: NOP\nloop: NOP", DEFAULT_START_ADDRESS).unwrap_err();
        assert!(matches!(err, AssembleError::DuplicateLabel { .. }));
    }

    #[test]
    fn undefined_label_is_fatal() {
        let err = assemble("JMP nowhere", DEFAULT_START_ADDRESS).unwrap_err();
        assert!(matches!(err, AssembleError::UndefinedLabel { .. }));
    }

    #[test]
    fn out_of_range_branch_is_fatal() {
        let mut src = String::from("start: NOP\n");
        for _ in 0..200 {
            src.push_str("NOP\n");
        }
        src.push_str("BNE start");
        let err = assemble(&src, DEFAULT_START_ADDRESS).unwrap_err();
        assert!(matches!(err, AssembleError::BranchOutOfRange { .. }));
    }

    #[test]
    fn branch_offset_extremes() {
        // A branch whose target sits exactly 128 bytes back must encode as $80.
        let mut src = String::from("start: NOP\n");
        for _ in 0..126 {
            src.push_str("NOP\n");
        }
        src.push_str("BEQ start");
        let out = assemble(&src, DEFAULT_START_ADDRESS).unwrap();
        assert_eq!(*out.image.last().unwrap(), 0x80);
    }
}
