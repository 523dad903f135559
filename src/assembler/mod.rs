//! Two-pass assembler: turns 6502 source text into a byte image.

mod codegen;
mod lexer;
mod operand;

pub use codegen::{assemble, Assembled, DEFAULT_START_ADDRESS};
