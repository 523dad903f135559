//! Colorized per-instruction debug trace, printed when `--debug` is passed.
//!
//! Adapts the layout of the teacher's `cpu::disassembler::InstructionDeNovo`
//! `Display` impl (address, raw bytes, mnemonic, operand) from a one-shot
//! ROM disassembly into a live trace line emitted before every `Cpu::step`,
//! with register and flag state appended and colored via `ansi_term`.

use ansi_term::Colour;

use crate::cpu::Cpu;
use crate::opcodes::{self, AddressingMode};

/// Renders one trace line for the instruction about to execute at `cpu.pc`.
/// Returns `None` for an opcode byte that doesn't decode, since a fault is
/// about to be raised for it anyway and the caller can report that instead.
pub fn trace_line(cpu: &Cpu) -> Option<String> {
    let pc = cpu.pc;
    let opcode = cpu.read(pc);
    let (mnemonic, mode) = opcodes::decode(opcode)?;

    let operand_text = match mode {
        AddressingMode::Imp => String::new(),
        AddressingMode::Acc => "A".to_string(),
        AddressingMode::Imm => format!("#${:02X}", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Zp => format!("${:02X}", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Zpx => format!("${:02X},X", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Zpy => format!("${:02X},Y", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Abs => format!("${:04X}", cpu.read_u16(pc.wrapping_add(1))),
        AddressingMode::Abx => format!("${:04X},X", cpu.read_u16(pc.wrapping_add(1))),
        AddressingMode::Aby => format!("${:04X},Y", cpu.read_u16(pc.wrapping_add(1))),
        AddressingMode::Ind => format!("(${:04X})", cpu.read_u16(pc.wrapping_add(1))),
        AddressingMode::Inx => format!("(${:02X},X)", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Iny => format!("(${:02X}),Y", cpu.read(pc.wrapping_add(1))),
        AddressingMode::Rel => {
            let offset = cpu.read(pc.wrapping_add(1)) as i8;
            let target = (pc as i32 + 2 + offset as i32) as u16;
            format!("${:04X}", target)
        }
    };

    let instruction = Colour::Yellow.paint(format!("{} {}", mnemonic, operand_text));
    let registers = Colour::Cyan.paint(format!(
        "A={:02X} X={:02X} Y={:02X} SP={:02X}",
        cpu.a, cpu.x, cpu.y, cpu.sp
    ));
    let flags = Colour::Purple.paint(format!("{:08b}", cpu.status.bits()));

    Some(format!(
        "${:04X}  {:<20} {}  P={}",
        pc, instruction, registers, flags
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_an_implicit_instruction() {
        let mut cpu = Cpu::new();
        cpu.load(&[0xea], 0x0600);
        cpu.reset(0x0600);
        let line = trace_line(&cpu).unwrap();
        assert!(line.contains("NOP"));
        assert!(line.contains("$0600"));
    }

    #[test]
    fn traces_an_immediate_operand() {
        let mut cpu = Cpu::new();
        cpu.load(&[0xa9, 0x2a], 0x0600);
        cpu.reset(0x0600);
        let line = trace_line(&cpu).unwrap();
        assert!(line.contains("LDA"));
        assert!(line.contains("#$2A"));
    }

    #[test]
    fn returns_none_for_an_illegal_opcode() {
        let mut cpu = Cpu::new();
        cpu.load(&[0x02], 0x0600);
        cpu.reset(0x0600);
        assert!(trace_line(&cpu).is_none());
    }
}
