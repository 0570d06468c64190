//! CIL instruction model and encoding selection.
//!
//! Method bodies are held as decoded [`Instruction`] lists. This module defines the
//! opcode table and operand types, and the macro optimizer that re-selects the most
//! compact encoding of a list after it was rewritten.
//!
//! # Key Types
//! - [`Instruction`] - An opcode with its operand
//! - [`OpCode`] - The closed opcode set, with mnemonics and encodings
//! - [`Operand`] / [`Immediate`] - Instruction operands
//! - [`OperandType`] - Inline operand kinds and their sizes
//!
//! # Main Functions
//! - [`optimize_macros`] - Select the shortest encoding for every instruction
//! - [`code_size`] - Total encoded size of an instruction list

mod instruction;
mod macros;
pub mod opcodes;

pub use instruction::{Immediate, Instruction, OpCode, Operand, OperandType};
pub use macros::{code_size, optimize_macros};
