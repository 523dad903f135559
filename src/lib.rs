//! A two-pass 6502 assembler and CPU emulator.
//!
//! `assembler::assemble` turns source text into a byte image; `cpu::Cpu`
//! loads that image and runs it. `peripherals` supplies a handful of
//! memory-mapped devices for programs that want I/O, and `trace` renders a
//! colorized per-instruction debug log.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate nom;
#[macro_use]
extern crate log;
extern crate ansi_term;
extern crate rand;
extern crate thiserror;

pub mod assembler;
pub mod cpu;
pub mod error;
pub mod opcodes;
pub mod peripherals;
pub mod trace;

pub use cpu::Cpu;
pub use error::{AssembleError, CpuFault};
