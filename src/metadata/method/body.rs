//! Decoded CIL method bodies.
//!
//! # Examples
//!
//! ```rust
//! use unhoist::assembly::{Instruction, OpCode};
//! use unhoist::metadata::{method::{LocalVariable, MethodBody}, signatures::TypeSignature};
//!
//! let mut body = MethodBody::new(vec![Instruction::simple(OpCode::Ret)]);
//! let index = body.add_local(LocalVariable::new(TypeSignature::I4));
//! assert_eq!(index, Some(0));
//! assert_eq!(body.code_size(), 1);
//! ```

use crate::{
    assembly::{code_size, optimize_macros, Instruction},
    metadata::method::LocalVariable,
};

/// The decoded body of a method: header values, locals and instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    /// Maximum number of items on the operand stack
    pub max_stack: usize,
    /// Flag, indicating to call default constructor on all local variables
    pub is_init_local: bool,
    /// The local variables, indexed by `ldloc`/`stloc` operands
    pub locals: Vec<LocalVariable>,
    /// The instructions, in order
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    /// Creates a body without locals
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        MethodBody {
            max_stack: 8,
            is_init_local: true,
            locals: Vec::new(),
            instructions,
        }
    }

    /// Appends a local variable and returns its index.
    ///
    /// Returns `None` if the body already holds the 65535 locals a 16-bit index
    /// can address; the local is not added in that case.
    pub fn add_local(&mut self, local: LocalVariable) -> Option<u16> {
        let index = u16::try_from(self.locals.len())
            .ok()
            .filter(|index| *index < u16::MAX)?;

        self.locals.push(local);
        Some(index)
    }

    /// Size of the encoded instruction stream in bytes
    #[must_use]
    pub fn code_size(&self) -> usize {
        code_size(&self.instructions)
    }

    /// Re-selects the shortest encoding of every instruction.
    ///
    /// Returns the number of instructions whose encoding changed.
    pub fn optimize_macros(&mut self) -> usize {
        optimize_macros(&mut self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::{OpCode, Operand},
        metadata::signatures::TypeSignature,
    };

    #[test]
    fn test_add_local_returns_sequential_indices() {
        let mut body = MethodBody::new(Vec::new());
        assert_eq!(body.add_local(LocalVariable::new(TypeSignature::I4)), Some(0));
        assert_eq!(body.add_local(LocalVariable::new(TypeSignature::String)), Some(1));
        assert_eq!(body.locals[1].signature, TypeSignature::String);
    }

    #[test]
    fn test_add_local_limit() {
        let mut body = MethodBody::new(Vec::new());
        body.locals = vec![LocalVariable::new(TypeSignature::I4); usize::from(u16::MAX)];
        assert_eq!(body.add_local(LocalVariable::new(TypeSignature::I4)), None);
        assert_eq!(body.locals.len(), usize::from(u16::MAX));
    }

    #[test]
    fn test_optimize_macros_shrinks_body() {
        let mut body = MethodBody::new(vec![
            Instruction::new(OpCode::Ldloc, Operand::Local(1)).unwrap(),
            Instruction::simple(OpCode::Ret),
        ]);
        assert_eq!(body.code_size(), 5);
        assert_eq!(body.optimize_macros(), 1);
        assert_eq!(body.code_size(), 2);
    }
}
