//! Typed error kinds for the assembler and the CPU, per spec.md §7.
//!
//! Nothing here is recoverable: both the assembler and the CPU are
//! deterministic batch components, so every variant is a fatal condition
//! that aborts the call in progress. `Display` renders the single
//! diagnostic line a caller should show the user.

use crate::opcodes::AddressingMode;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum AssembleError {
    #[error("line {line}: malformed operand `{token}`")]
    MalformedOperand { line: u32, token: String },

    #[error("line {line}: no such instruction `{mnemonic}` in addressing mode {mode:?}")]
    UnknownEncoding {
        line: u32,
        mnemonic: String,
        mode: AddressingMode,
    },

    #[error("undefined label `{label}`")]
    UndefinedLabel { label: String },

    #[error("line {line}: label `{label}` is already defined")]
    DuplicateLabel { label: String, line: u32 },

    #[error("line {line}: branch to `{label}` is out of 8-bit range ({offset} bytes)")]
    BranchOutOfRange {
        label: String,
        line: u32,
        offset: i32,
    },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum CpuFault {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    #[error("decimal mode is not supported (ADC/SBC at ${pc:04X} with D set)")]
    DecimalModeUnsupported { pc: u16 },
}
