//! # unhoist Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the unhoist library. Import this module to get quick access to the module model,
//! the instruction types and the deobfuscation passes.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all unhoist operations
pub use crate::Error;

/// The result type used throughout unhoist
pub use crate::Result;

// ================================================================================================
// Module Model
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// The module container and its types
pub use crate::metadata::{module::Module, typedef::TypeDef};

/// Fields and their attributes
pub use crate::metadata::field::{ConstantValue, Field, FieldAccess, FieldAttributes};

/// Methods, bodies and locals
pub use crate::metadata::method::{LocalVariable, Method, MethodBody};

/// Types of fields and locals
pub use crate::metadata::signatures::TypeSignature;

// ================================================================================================
// Instructions
// ================================================================================================

/// Decoded instructions and their parts
pub use crate::assembly::{Immediate, Instruction, OpCode, Operand, OperandType};

/// Shortest-encoding selection
pub use crate::assembly::optimize_macros;

// ================================================================================================
// Deobfuscation
// ================================================================================================

/// Engine, configuration and results
pub use crate::deobfuscation::{
    DeobfuscationEngine, DeobfuscationResult, EngineConfig, LocalsConfig,
};

/// Pass trait and reporting
pub use crate::deobfuscation::{EventKind, EventLog, ModulePass, Severity, Summary};

/// Built-in passes
pub use crate::deobfuscation::passes::{AccessKind, HoistedLocalsPass};
