//! Instruction semantics: one fetch-decode-execute cycle per call to `step`.
//!
//! Grounded on `original_source/ops.py`'s per-mnemonic handlers for the
//! arithmetic and flag semantics, with the four corrections spec.md calls
//! out: canonical overflow/negative flag derivation, hardware-correct
//! zero-page-indexed wraparound, INX/DEX/INY/DEY updating N and Z like every
//! other load/transfer instruction, and `(d),Y` adding Y to the pointer
//! after it is fetched for both reads and writes.

use super::addressing::{Accumulator, Addressing, Immediate};
use super::{Cpu, StatusRegister};
use crate::error::CpuFault;
use crate::opcodes::{self, AddressingMode, Mnemonic};

pub fn step(cpu: &mut Cpu) -> Result<bool, CpuFault> {
    let pc = cpu.pc;
    let opcode = cpu.read(pc);
    let (mnemonic, mode) = opcodes::decode(opcode).ok_or_else(|| {
        warn!("illegal opcode ${:02X} at ${:04X}", opcode, pc);
        CpuFault::IllegalOpcode { opcode, pc }
    })?;
    cpu.pc = pc.wrapping_add(1 + mode.operand_len());

    match mnemonic {
        Mnemonic::JMP => {
            cpu.pc = resolve_address(cpu, pc, mode);
            return Ok(true);
        }
        Mnemonic::JSR => {
            let target = resolve_address(cpu, pc, mode);
            let return_to = pc.wrapping_add(2);
            cpu.push((return_to >> 8) as u8);
            cpu.push((return_to & 0xff) as u8);
            cpu.pc = target;
            return Ok(true);
        }
        _ => {}
    }

    if mode == AddressingMode::Rel {
        let offset = cpu.read(pc.wrapping_add(1)) as i8;
        execute_branch(cpu, mnemonic, offset);
        return Ok(true);
    }

    if mode == AddressingMode::Imp {
        if mnemonic == Mnemonic::BRK {
            return Ok(false);
        }
        execute_implicit(cpu, mnemonic);
        return Ok(true);
    }

    let operand = resolve(cpu, pc, mode);
    execute_with_operand(cpu, mnemonic, operand.as_ref(), pc)?;
    Ok(true)
}

fn resolve_address(cpu: &mut Cpu, pc: u16, mode: AddressingMode) -> u16 {
    let ptr = cpu.read_u16(pc.wrapping_add(1));
    match mode {
        AddressingMode::Ind => cpu.indirect(ptr),
        _ => ptr,
    }
}

fn resolve(cpu: &mut Cpu, pc: u16, mode: AddressingMode) -> Box<dyn Addressing> {
    match mode {
        AddressingMode::Acc => Box::new(Accumulator),
        AddressingMode::Imm => Box::new(Immediate(cpu.read(pc.wrapping_add(1)))),
        AddressingMode::Zp => {
            let operand = cpu.read(pc.wrapping_add(1));
            Box::new(cpu.zero_page(operand))
        }
        AddressingMode::Zpx => {
            let operand = cpu.read(pc.wrapping_add(1));
            Box::new(cpu.zero_page_indexed(operand, cpu.x))
        }
        AddressingMode::Zpy => {
            let operand = cpu.read(pc.wrapping_add(1));
            Box::new(cpu.zero_page_indexed(operand, cpu.y))
        }
        AddressingMode::Abs => {
            let operand = cpu.read_u16(pc.wrapping_add(1));
            Box::new(cpu.absolute(operand))
        }
        AddressingMode::Abx => {
            let operand = cpu.read_u16(pc.wrapping_add(1));
            Box::new(cpu.absolute_indexed(operand, cpu.x))
        }
        AddressingMode::Aby => {
            let operand = cpu.read_u16(pc.wrapping_add(1));
            Box::new(cpu.absolute_indexed(operand, cpu.y))
        }
        AddressingMode::Inx => {
            let operand = cpu.read(pc.wrapping_add(1));
            Box::new(cpu.indexed_indirect(operand))
        }
        AddressingMode::Iny => {
            let operand = cpu.read(pc.wrapping_add(1));
            Box::new(cpu.indirect_indexed(operand))
        }
        AddressingMode::Imp | AddressingMode::Rel | AddressingMode::Ind => {
            unreachable!("handled before reaching resolve()")
        }
    }
}

fn execute_with_operand(
    cpu: &mut Cpu,
    mnemonic: Mnemonic,
    operand: &dyn Addressing,
    pc: u16,
) -> Result<(), CpuFault> {
    use Mnemonic::*;
    match mnemonic {
        LDA => {
            cpu.a = operand.read(cpu);
            cpu.set_zn(cpu.a);
        }
        LDX => {
            cpu.x = operand.read(cpu);
            cpu.set_zn(cpu.x);
        }
        LDY => {
            cpu.y = operand.read(cpu);
            cpu.set_zn(cpu.y);
        }
        STA => operand.write(cpu, cpu.a),
        STX => operand.write(cpu, cpu.x),
        STY => operand.write(cpu, cpu.y),
        ADC => {
            let value = operand.read(cpu);
            adc(cpu, value, pc)?;
        }
        SBC => {
            let value = !operand.read(cpu);
            adc(cpu, value, pc)?;
        }
        AND => {
            cpu.a &= operand.read(cpu);
            cpu.set_zn(cpu.a);
        }
        ORA => {
            cpu.a |= operand.read(cpu);
            cpu.set_zn(cpu.a);
        }
        EOR => {
            cpu.a ^= operand.read(cpu);
            cpu.set_zn(cpu.a);
        }
        ASL => {
            let value = operand.read(cpu);
            cpu.set_flag(StatusRegister::C, value & 0x80 != 0);
            let result = value << 1;
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        LSR => {
            let value = operand.read(cpu);
            cpu.set_flag(StatusRegister::C, value & 0x01 != 0);
            let result = value >> 1;
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        ROL => {
            let value = operand.read(cpu);
            let carry_in = cpu.status.contains(StatusRegister::C) as u8;
            cpu.set_flag(StatusRegister::C, value & 0x80 != 0);
            let result = (value << 1) | carry_in;
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        ROR => {
            let value = operand.read(cpu);
            let carry_in = cpu.status.contains(StatusRegister::C) as u8;
            cpu.set_flag(StatusRegister::C, value & 0x01 != 0);
            let result = (value >> 1) | (carry_in << 7);
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        BIT => {
            let value = operand.read(cpu);
            cpu.set_flag(StatusRegister::Z, (cpu.a & value) == 0);
            cpu.set_flag(StatusRegister::N, value & 0x80 != 0);
            cpu.set_flag(StatusRegister::V, value & 0x40 != 0);
        }
        INC => {
            let result = operand.read(cpu).wrapping_add(1);
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        DEC => {
            let result = operand.read(cpu).wrapping_sub(1);
            operand.write(cpu, result);
            cpu.set_zn(result);
        }
        CMP => {
            let value = operand.read(cpu);
            let register = cpu.a;
            compare(cpu, register, value);
        }
        CPX => {
            let value = operand.read(cpu);
            let register = cpu.x;
            compare(cpu, register, value);
        }
        CPY => {
            let value = operand.read(cpu);
            let register = cpu.y;
            compare(cpu, register, value);
        }
        _ => unreachable!("{:?} does not take an addressed operand", mnemonic),
    }
    Ok(())
}

fn adc(cpu: &mut Cpu, operand: u8, pc: u16) -> Result<(), CpuFault> {
    if cpu.status.contains(StatusRegister::D) {
        return Err(CpuFault::DecimalModeUnsupported { pc });
    }
    let carry_in = cpu.status.contains(StatusRegister::C) as u8;
    let a = cpu.a;
    let (partial, carry1) = a.overflowing_add(operand);
    let (result, carry2) = partial.overflowing_add(carry_in);
    let overflow = (a ^ result) & (operand ^ result) & 0x80 != 0;
    cpu.a = result;
    cpu.set_flag(StatusRegister::C, carry1 || carry2);
    cpu.set_flag(StatusRegister::V, overflow);
    cpu.set_zn(result);
    Ok(())
}

fn compare(cpu: &mut Cpu, register: u8, operand: u8) {
    let result = register.wrapping_sub(operand);
    cpu.set_flag(StatusRegister::C, register >= operand);
    cpu.set_zn(result);
}

fn execute_implicit(cpu: &mut Cpu, mnemonic: Mnemonic) {
    use Mnemonic::*;
    match mnemonic {
        TAX => {
            cpu.x = cpu.a;
            cpu.set_zn(cpu.x);
        }
        TAY => {
            cpu.y = cpu.a;
            cpu.set_zn(cpu.y);
        }
        TSX => {
            cpu.x = cpu.sp;
            cpu.set_zn(cpu.x);
        }
        TXA => {
            cpu.a = cpu.x;
            cpu.set_zn(cpu.a);
        }
        TXS => cpu.sp = cpu.x,
        TYA => {
            cpu.a = cpu.y;
            cpu.set_zn(cpu.a);
        }
        INX => {
            cpu.x = cpu.x.wrapping_add(1);
            cpu.set_zn(cpu.x);
        }
        DEX => {
            cpu.x = cpu.x.wrapping_sub(1);
            cpu.set_zn(cpu.x);
        }
        INY => {
            cpu.y = cpu.y.wrapping_add(1);
            cpu.set_zn(cpu.y);
        }
        DEY => {
            cpu.y = cpu.y.wrapping_sub(1);
            cpu.set_zn(cpu.y);
        }
        CLC => cpu.set_flag(StatusRegister::C, false),
        SEC => cpu.set_flag(StatusRegister::C, true),
        CLI => cpu.set_flag(StatusRegister::I, false),
        SEI => cpu.set_flag(StatusRegister::I, true),
        CLD => cpu.set_flag(StatusRegister::D, false),
        SED => cpu.set_flag(StatusRegister::D, true),
        CLV => cpu.set_flag(StatusRegister::V, false),
        PHA => cpu.push(cpu.a),
        PHP => {
            let pushed = (cpu.status | StatusRegister::B | StatusRegister::U).bits();
            cpu.push(pushed);
        }
        PLA => {
            cpu.a = cpu.pop();
            cpu.set_zn(cpu.a);
        }
        PLP => {
            let bits = cpu.pop();
            cpu.status = StatusRegister::from_bits_truncate(bits);
        }
        RTS => {
            let lo = cpu.pop() as u16;
            let hi = cpu.pop() as u16;
            cpu.pc = ((hi << 8) | lo).wrapping_add(1);
        }
        RTI => {
            let bits = cpu.pop();
            cpu.status = StatusRegister::from_bits_truncate(bits) | StatusRegister::B | StatusRegister::U;
            let lo = cpu.pop() as u16;
            let hi = cpu.pop() as u16;
            cpu.pc = (hi << 8) | lo;
        }
        NOP => {}
        BRK => unreachable!("BRK halts before reaching execute_implicit"),
        _ => unreachable!("{:?} is not an implicit-mode instruction", mnemonic),
    }
}

fn execute_branch(cpu: &mut Cpu, mnemonic: Mnemonic, offset: i8) {
    use Mnemonic::*;
    let taken = match mnemonic {
        BPL => !cpu.status.contains(StatusRegister::N),
        BMI => cpu.status.contains(StatusRegister::N),
        BVC => !cpu.status.contains(StatusRegister::V),
        BVS => cpu.status.contains(StatusRegister::V),
        BCC => !cpu.status.contains(StatusRegister::C),
        BCS => cpu.status.contains(StatusRegister::C),
        BNE => !cpu.status.contains(StatusRegister::Z),
        BEQ => cpu.status.contains(StatusRegister::Z),
        _ => unreachable!("{:?} is not a branch instruction", mnemonic),
    };
    if taken {
        cpu.pc = (cpu.pc as i32 + offset as i32) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load(program, 0x0600);
        cpu.reset(0x0600);
        cpu.run().unwrap();
        cpu
    }

    #[test]
    fn adc_sets_carry_and_canonical_overflow() {
        // LDA #$7f; ADC #$01; BRK -- 127 + 1 signed-overflows into negative.
        let cpu = run(&[0xa9, 0x7f, 0x69, 0x01, 0x00]);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.status.contains(StatusRegister::V));
        assert!(cpu.status.contains(StatusRegister::N));
        assert!(!cpu.status.contains(StatusRegister::C));
    }

    #[test]
    fn adc_honors_incoming_carry() {
        // SEC; LDA #$01; ADC #$01; BRK -- with carry-in, 1 + 1 + 1 = 3.
        let cpu = run(&[0x38, 0xa9, 0x01, 0x69, 0x01, 0x00]);
        assert_eq!(cpu.a, 0x03);
    }

    #[test]
    fn inx_updates_zero_and_negative_flags() {
        // LDX #$ff; INX; BRK -- wraps to 0, must set Z.
        let cpu = run(&[0xa2, 0xff, 0xe8, 0x00]);
        assert_eq!(cpu.x, 0x00);
        assert!(cpu.status.contains(StatusRegister::Z));
    }

    #[test]
    fn jsr_and_rts_round_trip_the_stack() {
        // JSR sub; BRK; sub: INX; RTS
        let cpu = run(&[0x20, 0x05, 0x06, 0x00, 0x00, 0xe8, 0x60]);
        assert_eq!(cpu.x, 1);
        assert_eq!(cpu.sp, 0xff);
    }

    #[test]
    fn decimal_mode_is_rejected() {
        let mut cpu = Cpu::new();
        cpu.load(&[0xf8, 0xa9, 0x01, 0x69, 0x01, 0x00], 0x0600);
        cpu.reset(0x0600);
        let err = cpu.run().unwrap_err();
        assert!(matches!(err, CpuFault::DecimalModeUnsupported { .. }));
    }

    #[test]
    fn illegal_opcode_is_reported() {
        let mut cpu = Cpu::new();
        cpu.load(&[0x02], 0x0600);
        cpu.reset(0x0600);
        let err = cpu.run().unwrap_err();
        assert_eq!(err, CpuFault::IllegalOpcode { opcode: 0x02, pc: 0x0600 });
    }

    #[test]
    fn plp_leaves_b_and_u_exactly_as_pulled() {
        // PLP; BRK, with a status byte on the stack that has B and U clear.
        let mut cpu = Cpu::new();
        cpu.load(&[0x28, 0x00], 0x0600);
        cpu.reset(0x0600);
        cpu.sp = 0xfe;
        cpu.write(0x01ff, 0x00);
        cpu.run().unwrap();
        assert!(!cpu.status.contains(StatusRegister::B));
        assert!(!cpu.status.contains(StatusRegister::U));
    }

    #[test]
    fn plp_can_pull_b_set() {
        // Same as above, but the pulled byte has B and U set; PLP must not clear them.
        let mut cpu = Cpu::new();
        cpu.load(&[0x28, 0x00], 0x0600);
        cpu.reset(0x0600);
        cpu.sp = 0xfe;
        cpu.write(0x01ff, (StatusRegister::B | StatusRegister::U).bits());
        cpu.run().unwrap();
        assert!(cpu.status.contains(StatusRegister::B));
        assert!(cpu.status.contains(StatusRegister::U));
    }

    #[test]
    fn rti_forces_b_and_u_high_regardless_of_what_was_pulled() {
        // RTI pulls a status byte with B and U clear, then resumes at $0601 (a BRK).
        let mut cpu = Cpu::new();
        cpu.load(&[0x40], 0x0600);
        cpu.reset(0x0600);
        cpu.sp = 0xfc;
        cpu.write(0x01fd, 0x00);
        cpu.write(0x01fe, 0x01);
        cpu.write(0x01ff, 0x06);
        cpu.run().unwrap();
        assert!(cpu.status.contains(StatusRegister::B));
        assert!(cpu.status.contains(StatusRegister::U));
    }
}
