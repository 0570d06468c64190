//! CIL instruction representation, opcodes and operand types.
//!
//! # Key Components
//!
//! - [`OpCode`] - The closed set of opcodes understood by the instruction model
//! - [`OperandType`] - What kind of inline operand an opcode carries
//! - [`Operand`] - Type-safe operand representation
//! - [`Immediate`] - Immediate value types embedded in the instruction stream
//! - [`Instruction`] - An opcode paired with its operand
//!
//! Instructions are held in decoded form. Branch targets are instruction indices
//! within the owning body rather than byte offsets, which keeps a body valid while
//! the encodings of individual instructions change (see
//! [`crate::assembly::optimize_macros`]).
//!
//! # Usage Examples
//!
//! ```rust
//! use unhoist::assembly::{Instruction, OpCode, Operand};
//! use unhoist::metadata::token::Token;
//!
//! let load = Instruction::field(OpCode::Ldsfld, Token::new(0x0400_0001));
//! assert_eq!(load.to_string(), "ldsfld 0x04000001");
//! assert_eq!(load.size(), 5);
//!
//! let local = Instruction::new(OpCode::LdlocS, Operand::Local(7))?;
//! assert_eq!(local.local_index(), Some(7));
//! # Ok::<(), unhoist::Error>(())
//! ```

use std::fmt;

use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::{assembly::opcodes, metadata::token::Token, Result};

/// Types of inline operands for CIL instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand present
    None,
    /// Unsigned 8-bit local or argument index
    ShortVariable,
    /// Unsigned 16-bit local or argument index
    Variable,
    /// Signed 8-bit integer
    ShortInteger,
    /// Signed 32-bit integer
    Integer,
    /// Signed 64-bit integer
    Long,
    /// 64-bit floating point
    Double,
    /// `Field` or `MemberRef` token
    Field,
    /// `MethodDef`, `MemberRef` or `MethodSpec` token
    Method,
    /// `TypeDef`, `TypeRef` or `TypeSpec` token
    Type,
    /// User string token
    String,
    /// Any metadata token (`ldtoken`)
    Token,
    /// Signed 8-bit branch displacement
    ShortBranch,
    /// Signed 32-bit branch displacement
    Branch,
}

impl OperandType {
    /// Returns the size in bytes of this operand type.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            OperandType::None => 0,
            OperandType::ShortVariable | OperandType::ShortInteger | OperandType::ShortBranch => 1,
            OperandType::Variable => 2,
            OperandType::Integer
            | OperandType::Field
            | OperandType::Method
            | OperandType::Type
            | OperandType::String
            | OperandType::Token
            | OperandType::Branch => 4,
            OperandType::Long | OperandType::Double => 8,
        }
    }
}

/// The opcodes understood by the instruction model.
///
/// The `Display` output is the ECMA-335 mnemonic.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum OpCode {
    #[strum(serialize = "nop")]
    Nop,
    #[strum(serialize = "ldarg.0")]
    Ldarg0,
    #[strum(serialize = "ldarg.1")]
    Ldarg1,
    #[strum(serialize = "ldarg.2")]
    Ldarg2,
    #[strum(serialize = "ldarg.3")]
    Ldarg3,
    #[strum(serialize = "ldloc.0")]
    Ldloc0,
    #[strum(serialize = "ldloc.1")]
    Ldloc1,
    #[strum(serialize = "ldloc.2")]
    Ldloc2,
    #[strum(serialize = "ldloc.3")]
    Ldloc3,
    #[strum(serialize = "stloc.0")]
    Stloc0,
    #[strum(serialize = "stloc.1")]
    Stloc1,
    #[strum(serialize = "stloc.2")]
    Stloc2,
    #[strum(serialize = "stloc.3")]
    Stloc3,
    #[strum(serialize = "ldarg.s")]
    LdargS,
    #[strum(serialize = "ldarga.s")]
    LdargaS,
    #[strum(serialize = "starg.s")]
    StargS,
    #[strum(serialize = "ldloc.s")]
    LdlocS,
    #[strum(serialize = "ldloca.s")]
    LdlocaS,
    #[strum(serialize = "stloc.s")]
    StlocS,
    #[strum(serialize = "ldnull")]
    Ldnull,
    #[strum(serialize = "ldc.i4.m1")]
    LdcI4M1,
    #[strum(serialize = "ldc.i4.0")]
    LdcI4_0,
    #[strum(serialize = "ldc.i4.1")]
    LdcI4_1,
    #[strum(serialize = "ldc.i4.2")]
    LdcI4_2,
    #[strum(serialize = "ldc.i4.3")]
    LdcI4_3,
    #[strum(serialize = "ldc.i4.4")]
    LdcI4_4,
    #[strum(serialize = "ldc.i4.5")]
    LdcI4_5,
    #[strum(serialize = "ldc.i4.6")]
    LdcI4_6,
    #[strum(serialize = "ldc.i4.7")]
    LdcI4_7,
    #[strum(serialize = "ldc.i4.8")]
    LdcI4_8,
    #[strum(serialize = "ldc.i4.s")]
    LdcI4S,
    #[strum(serialize = "ldc.i4")]
    LdcI4,
    #[strum(serialize = "ldc.i8")]
    LdcI8,
    #[strum(serialize = "ldc.r8")]
    LdcR8,
    #[strum(serialize = "dup")]
    Dup,
    #[strum(serialize = "pop")]
    Pop,
    #[strum(serialize = "call")]
    Call,
    #[strum(serialize = "ret")]
    Ret,
    #[strum(serialize = "br.s")]
    BrS,
    #[strum(serialize = "brfalse.s")]
    BrfalseS,
    #[strum(serialize = "brtrue.s")]
    BrtrueS,
    #[strum(serialize = "beq.s")]
    BeqS,
    #[strum(serialize = "bge.s")]
    BgeS,
    #[strum(serialize = "bgt.s")]
    BgtS,
    #[strum(serialize = "ble.s")]
    BleS,
    #[strum(serialize = "blt.s")]
    BltS,
    #[strum(serialize = "bne.un.s")]
    BneUnS,
    #[strum(serialize = "br")]
    Br,
    #[strum(serialize = "brfalse")]
    Brfalse,
    #[strum(serialize = "brtrue")]
    Brtrue,
    #[strum(serialize = "beq")]
    Beq,
    #[strum(serialize = "bge")]
    Bge,
    #[strum(serialize = "bgt")]
    Bgt,
    #[strum(serialize = "ble")]
    Ble,
    #[strum(serialize = "blt")]
    Blt,
    #[strum(serialize = "bne.un")]
    BneUn,
    #[strum(serialize = "ldind.i4")]
    LdindI4,
    #[strum(serialize = "stind.i4")]
    StindI4,
    #[strum(serialize = "add")]
    Add,
    #[strum(serialize = "sub")]
    Sub,
    #[strum(serialize = "mul")]
    Mul,
    #[strum(serialize = "div")]
    Div,
    #[strum(serialize = "rem")]
    Rem,
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "xor")]
    Xor,
    #[strum(serialize = "conv.i4")]
    ConvI4,
    #[strum(serialize = "callvirt")]
    Callvirt,
    #[strum(serialize = "ldstr")]
    Ldstr,
    #[strum(serialize = "newobj")]
    Newobj,
    #[strum(serialize = "throw")]
    Throw,
    #[strum(serialize = "ldfld")]
    Ldfld,
    #[strum(serialize = "ldflda")]
    Ldflda,
    #[strum(serialize = "stfld")]
    Stfld,
    #[strum(serialize = "ldsfld")]
    Ldsfld,
    #[strum(serialize = "ldsflda")]
    Ldsflda,
    #[strum(serialize = "stsfld")]
    Stsfld,
    #[strum(serialize = "ldtoken")]
    Ldtoken,
    #[strum(serialize = "ceq")]
    Ceq,
    #[strum(serialize = "cgt")]
    Cgt,
    #[strum(serialize = "clt")]
    Clt,
    #[strum(serialize = "ldarg")]
    Ldarg,
    #[strum(serialize = "ldarga")]
    Ldarga,
    #[strum(serialize = "starg")]
    Starg,
    #[strum(serialize = "ldloc")]
    Ldloc,
    #[strum(serialize = "ldloca")]
    Ldloca,
    #[strum(serialize = "stloc")]
    Stloc,
}

impl OpCode {
    /// The ECMA-335 mnemonic of this opcode
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.into()
    }

    /// Returns `(prefix, opcode)`; `prefix` is `0` for single-byte opcodes.
    #[must_use]
    pub const fn encoding(&self) -> (u8, u8) {
        match self {
            OpCode::Nop => (0, opcodes::NOP),
            OpCode::Ldarg0 => (0, opcodes::LDARG_0),
            OpCode::Ldarg1 => (0, opcodes::LDARG_1),
            OpCode::Ldarg2 => (0, opcodes::LDARG_2),
            OpCode::Ldarg3 => (0, opcodes::LDARG_3),
            OpCode::Ldloc0 => (0, opcodes::LDLOC_0),
            OpCode::Ldloc1 => (0, opcodes::LDLOC_1),
            OpCode::Ldloc2 => (0, opcodes::LDLOC_2),
            OpCode::Ldloc3 => (0, opcodes::LDLOC_3),
            OpCode::Stloc0 => (0, opcodes::STLOC_0),
            OpCode::Stloc1 => (0, opcodes::STLOC_1),
            OpCode::Stloc2 => (0, opcodes::STLOC_2),
            OpCode::Stloc3 => (0, opcodes::STLOC_3),
            OpCode::LdargS => (0, opcodes::LDARG_S),
            OpCode::LdargaS => (0, opcodes::LDARGA_S),
            OpCode::StargS => (0, opcodes::STARG_S),
            OpCode::LdlocS => (0, opcodes::LDLOC_S),
            OpCode::LdlocaS => (0, opcodes::LDLOCA_S),
            OpCode::StlocS => (0, opcodes::STLOC_S),
            OpCode::Ldnull => (0, opcodes::LDNULL),
            OpCode::LdcI4M1 => (0, opcodes::LDC_I4_M1),
            OpCode::LdcI4_0 => (0, opcodes::LDC_I4_0),
            OpCode::LdcI4_1 => (0, opcodes::LDC_I4_1),
            OpCode::LdcI4_2 => (0, opcodes::LDC_I4_2),
            OpCode::LdcI4_3 => (0, opcodes::LDC_I4_3),
            OpCode::LdcI4_4 => (0, opcodes::LDC_I4_4),
            OpCode::LdcI4_5 => (0, opcodes::LDC_I4_5),
            OpCode::LdcI4_6 => (0, opcodes::LDC_I4_6),
            OpCode::LdcI4_7 => (0, opcodes::LDC_I4_7),
            OpCode::LdcI4_8 => (0, opcodes::LDC_I4_8),
            OpCode::LdcI4S => (0, opcodes::LDC_I4_S),
            OpCode::LdcI4 => (0, opcodes::LDC_I4),
            OpCode::LdcI8 => (0, opcodes::LDC_I8),
            OpCode::LdcR8 => (0, opcodes::LDC_R8),
            OpCode::Dup => (0, opcodes::DUP),
            OpCode::Pop => (0, opcodes::POP),
            OpCode::Call => (0, opcodes::CALL),
            OpCode::Ret => (0, opcodes::RET),
            OpCode::BrS => (0, opcodes::BR_S),
            OpCode::BrfalseS => (0, opcodes::BRFALSE_S),
            OpCode::BrtrueS => (0, opcodes::BRTRUE_S),
            OpCode::BeqS => (0, opcodes::BEQ_S),
            OpCode::BgeS => (0, opcodes::BGE_S),
            OpCode::BgtS => (0, opcodes::BGT_S),
            OpCode::BleS => (0, opcodes::BLE_S),
            OpCode::BltS => (0, opcodes::BLT_S),
            OpCode::BneUnS => (0, opcodes::BNE_UN_S),
            OpCode::Br => (0, opcodes::BR),
            OpCode::Brfalse => (0, opcodes::BRFALSE),
            OpCode::Brtrue => (0, opcodes::BRTRUE),
            OpCode::Beq => (0, opcodes::BEQ),
            OpCode::Bge => (0, opcodes::BGE),
            OpCode::Bgt => (0, opcodes::BGT),
            OpCode::Ble => (0, opcodes::BLE),
            OpCode::Blt => (0, opcodes::BLT),
            OpCode::BneUn => (0, opcodes::BNE_UN),
            OpCode::LdindI4 => (0, opcodes::LDIND_I4),
            OpCode::StindI4 => (0, opcodes::STIND_I4),
            OpCode::Add => (0, opcodes::ADD),
            OpCode::Sub => (0, opcodes::SUB),
            OpCode::Mul => (0, opcodes::MUL),
            OpCode::Div => (0, opcodes::DIV),
            OpCode::Rem => (0, opcodes::REM),
            OpCode::And => (0, opcodes::AND),
            OpCode::Or => (0, opcodes::OR),
            OpCode::Xor => (0, opcodes::XOR),
            OpCode::ConvI4 => (0, opcodes::CONV_I4),
            OpCode::Callvirt => (0, opcodes::CALLVIRT),
            OpCode::Ldstr => (0, opcodes::LDSTR),
            OpCode::Newobj => (0, opcodes::NEWOBJ),
            OpCode::Throw => (0, opcodes::THROW),
            OpCode::Ldfld => (0, opcodes::LDFLD),
            OpCode::Ldflda => (0, opcodes::LDFLDA),
            OpCode::Stfld => (0, opcodes::STFLD),
            OpCode::Ldsfld => (0, opcodes::LDSFLD),
            OpCode::Ldsflda => (0, opcodes::LDSFLDA),
            OpCode::Stsfld => (0, opcodes::STSFLD),
            OpCode::Ldtoken => (0, opcodes::LDTOKEN),
            OpCode::Ceq => (opcodes::FE_PREFIX, opcodes::FE_CEQ),
            OpCode::Cgt => (opcodes::FE_PREFIX, opcodes::FE_CGT),
            OpCode::Clt => (opcodes::FE_PREFIX, opcodes::FE_CLT),
            OpCode::Ldarg => (opcodes::FE_PREFIX, opcodes::FE_LDARG),
            OpCode::Ldarga => (opcodes::FE_PREFIX, opcodes::FE_LDARGA),
            OpCode::Starg => (opcodes::FE_PREFIX, opcodes::FE_STARG),
            OpCode::Ldloc => (opcodes::FE_PREFIX, opcodes::FE_LDLOC),
            OpCode::Ldloca => (opcodes::FE_PREFIX, opcodes::FE_LDLOCA),
            OpCode::Stloc => (opcodes::FE_PREFIX, opcodes::FE_STLOC),
        }
    }

    /// Looks up an opcode by its encoding.
    #[must_use]
    pub fn from_encoding(prefix: u8, opcode: u8) -> Option<OpCode> {
        OpCode::iter().find(|op| op.encoding() == (prefix, opcode))
    }

    /// The kind of inline operand this opcode carries.
    #[must_use]
    pub const fn operand_type(&self) -> OperandType {
        match self {
            OpCode::LdargS
            | OpCode::LdargaS
            | OpCode::StargS
            | OpCode::LdlocS
            | OpCode::LdlocaS
            | OpCode::StlocS => OperandType::ShortVariable,
            OpCode::Ldarg
            | OpCode::Ldarga
            | OpCode::Starg
            | OpCode::Ldloc
            | OpCode::Ldloca
            | OpCode::Stloc => OperandType::Variable,
            OpCode::LdcI4S => OperandType::ShortInteger,
            OpCode::LdcI4 => OperandType::Integer,
            OpCode::LdcI8 => OperandType::Long,
            OpCode::LdcR8 => OperandType::Double,
            OpCode::Call | OpCode::Callvirt | OpCode::Newobj => OperandType::Method,
            OpCode::Ldstr => OperandType::String,
            OpCode::Ldtoken => OperandType::Token,
            OpCode::Ldfld
            | OpCode::Ldflda
            | OpCode::Stfld
            | OpCode::Ldsfld
            | OpCode::Ldsflda
            | OpCode::Stsfld => OperandType::Field,
            OpCode::BrS
            | OpCode::BrfalseS
            | OpCode::BrtrueS
            | OpCode::BeqS
            | OpCode::BgeS
            | OpCode::BgtS
            | OpCode::BleS
            | OpCode::BltS
            | OpCode::BneUnS => OperandType::ShortBranch,
            OpCode::Br
            | OpCode::Brfalse
            | OpCode::Brtrue
            | OpCode::Beq
            | OpCode::Bge
            | OpCode::Bgt
            | OpCode::Ble
            | OpCode::Blt
            | OpCode::BneUn => OperandType::Branch,
            _ => OperandType::None,
        }
    }

    /// Encoded size of an instruction with this opcode, operand included.
    #[must_use]
    pub const fn size(&self) -> usize {
        let (prefix, _) = self.encoding();
        let opcode_size = if prefix == 0 { 1 } else { 2 };
        opcode_size + self.operand_type().size()
    }

    /// The short form of a long branch, if this is one.
    #[must_use]
    pub const fn short_branch(&self) -> Option<OpCode> {
        match self {
            OpCode::Br => Some(OpCode::BrS),
            OpCode::Brfalse => Some(OpCode::BrfalseS),
            OpCode::Brtrue => Some(OpCode::BrtrueS),
            OpCode::Beq => Some(OpCode::BeqS),
            OpCode::Bge => Some(OpCode::BgeS),
            OpCode::Bgt => Some(OpCode::BgtS),
            OpCode::Ble => Some(OpCode::BleS),
            OpCode::Blt => Some(OpCode::BltS),
            OpCode::BneUn => Some(OpCode::BneUnS),
            _ => None,
        }
    }
}

/// Represents an immediate value embedded in CIL instructions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// Signed 8-bit immediate value
    Int8(i8),
    /// Signed 32-bit immediate value
    Int32(i32),
    /// Signed 64-bit immediate value
    Int64(i64),
    /// 64-bit floating point immediate value
    Float64(f64),
}

/// Operand of a decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// Immediate value
    Immediate(Immediate),
    /// Branch target, as an index into the owning instruction list
    Target(usize),
    /// Metadata token (field, method, type or string)
    Token(Token),
    /// Local variable index
    Local(u16),
    /// Argument index
    Argument(u16),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Immediate(Immediate::Int8(v)) => write!(f, "{v}"),
            Operand::Immediate(Immediate::Int32(v)) => write!(f, "{v}"),
            Operand::Immediate(Immediate::Int64(v)) => write!(f, "{v}"),
            Operand::Immediate(Immediate::Float64(v)) => write!(f, "{v}"),
            Operand::Target(index) => write!(f, "IL_{index:04}"),
            Operand::Token(token) => write!(f, "{token}"),
            Operand::Local(index) => write!(f, "V_{index}"),
            Operand::Argument(index) => write!(f, "A_{index}"),
        }
    }
}

/// A decoded CIL instruction: an opcode and its operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode
    pub opcode: OpCode,
    /// The inline operand
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction, checking that the operand fits the opcode.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the operand kind does not match the
    /// opcode's operand type, or a short-form index does not fit in a byte.
    pub fn new(opcode: OpCode, operand: Operand) -> Result<Self> {
        let valid = match (opcode.operand_type(), &operand) {
            (OperandType::None, Operand::None)
            | (OperandType::Variable, Operand::Local(_) | Operand::Argument(_))
            | (OperandType::ShortInteger, Operand::Immediate(Immediate::Int8(_)))
            | (OperandType::Integer, Operand::Immediate(Immediate::Int32(_)))
            | (OperandType::Long, Operand::Immediate(Immediate::Int64(_)))
            | (OperandType::Double, Operand::Immediate(Immediate::Float64(_)))
            | (
                OperandType::Field
                | OperandType::Method
                | OperandType::Type
                | OperandType::String
                | OperandType::Token,
                Operand::Token(_),
            )
            | (OperandType::ShortBranch | OperandType::Branch, Operand::Target(_)) => true,
            (OperandType::ShortVariable, Operand::Local(index) | Operand::Argument(index)) => {
                *index <= u16::from(u8::MAX)
            }
            _ => false,
        };

        if !valid {
            return Err(malformed_error!(
                "Operand {:?} does not fit opcode {}",
                operand,
                opcode
            ));
        }

        Ok(Instruction { opcode, operand })
    }

    /// An instruction without operand
    #[must_use]
    pub fn simple(opcode: OpCode) -> Self {
        Instruction {
            opcode,
            operand: Operand::None,
        }
    }

    /// A field access (`ldsfld`, `stfld`, ...) referencing `token`
    #[must_use]
    pub fn field(opcode: OpCode, token: Token) -> Self {
        Instruction {
            opcode,
            operand: Operand::Token(token),
        }
    }

    /// The most compact `ldc.i4` form loading `value`
    #[must_use]
    pub fn ldc_i4(value: i32) -> Self {
        match value {
            -1 => Instruction::simple(OpCode::LdcI4M1),
            0 => Instruction::simple(OpCode::LdcI4_0),
            1 => Instruction::simple(OpCode::LdcI4_1),
            2 => Instruction::simple(OpCode::LdcI4_2),
            3 => Instruction::simple(OpCode::LdcI4_3),
            4 => Instruction::simple(OpCode::LdcI4_4),
            5 => Instruction::simple(OpCode::LdcI4_5),
            6 => Instruction::simple(OpCode::LdcI4_6),
            7 => Instruction::simple(OpCode::LdcI4_7),
            8 => Instruction::simple(OpCode::LdcI4_8),
            _ => match i8::try_from(value) {
                Ok(short) => Instruction {
                    opcode: OpCode::LdcI4S,
                    operand: Operand::Immediate(Immediate::Int8(short)),
                },
                Err(_) => Instruction {
                    opcode: OpCode::LdcI4,
                    operand: Operand::Immediate(Immediate::Int32(value)),
                },
            },
        }
    }

    /// Encoded size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.opcode.size()
    }

    /// The field token of a field access instruction
    #[must_use]
    pub fn field_token(&self) -> Option<Token> {
        match (self.opcode.operand_type(), &self.operand) {
            (OperandType::Field, Operand::Token(token)) => Some(*token),
            _ => None,
        }
    }

    /// The local index accessed by any `ldloc`/`stloc`/`ldloca` form
    #[must_use]
    pub fn local_index(&self) -> Option<u16> {
        match self.opcode {
            OpCode::Ldloc0 | OpCode::Stloc0 => Some(0),
            OpCode::Ldloc1 | OpCode::Stloc1 => Some(1),
            OpCode::Ldloc2 | OpCode::Stloc2 => Some(2),
            OpCode::Ldloc3 | OpCode::Stloc3 => Some(3),
            OpCode::LdlocS
            | OpCode::StlocS
            | OpCode::LdlocaS
            | OpCode::Ldloc
            | OpCode::Stloc
            | OpCode::Ldloca => match self.operand {
                Operand::Local(index) => Some(index),
                _ => None,
            },
            _ => None,
        }
    }

    /// The argument index accessed by any `ldarg`/`starg`/`ldarga` form
    #[must_use]
    pub fn argument_index(&self) -> Option<u16> {
        match self.opcode {
            OpCode::Ldarg0 => Some(0),
            OpCode::Ldarg1 => Some(1),
            OpCode::Ldarg2 => Some(2),
            OpCode::Ldarg3 => Some(3),
            OpCode::LdargS
            | OpCode::StargS
            | OpCode::LdargaS
            | OpCode::Ldarg
            | OpCode::Starg
            | OpCode::Ldarga => match self.operand {
                Operand::Argument(index) => Some(index),
                _ => None,
            },
            _ => None,
        }
    }

    /// The value pushed by any `ldc.i4` form
    #[must_use]
    pub fn ldc_i4_value(&self) -> Option<i32> {
        match (self.opcode, &self.operand) {
            (OpCode::LdcI4M1, _) => Some(-1),
            (OpCode::LdcI4_0, _) => Some(0),
            (OpCode::LdcI4_1, _) => Some(1),
            (OpCode::LdcI4_2, _) => Some(2),
            (OpCode::LdcI4_3, _) => Some(3),
            (OpCode::LdcI4_4, _) => Some(4),
            (OpCode::LdcI4_5, _) => Some(5),
            (OpCode::LdcI4_6, _) => Some(6),
            (OpCode::LdcI4_7, _) => Some(7),
            (OpCode::LdcI4_8, _) => Some(8),
            (OpCode::LdcI4S, Operand::Immediate(Immediate::Int8(v))) => Some(i32::from(*v)),
            (OpCode::LdcI4, Operand::Immediate(Immediate::Int32(v))) => Some(*v),
            _ => None,
        }
    }

    /// The branch target index of a branch instruction
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        match (self.opcode.operand_type(), &self.operand) {
            (OperandType::ShortBranch | OperandType::Branch, Operand::Target(index)) => {
                Some(*index)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            _ => write!(f, "{} {}", self.opcode, self.operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_mnemonics() {
        assert_eq!(OpCode::Ldsfld.mnemonic(), "ldsfld");
        assert_eq!(OpCode::LdlocaS.to_string(), "ldloca.s");
        assert_eq!(OpCode::LdcI4M1.to_string(), "ldc.i4.m1");
        assert_eq!(OpCode::BneUnS.to_string(), "bne.un.s");
    }

    #[test]
    fn test_opcode_encoding_is_unique() {
        for op in OpCode::iter() {
            let (prefix, byte) = op.encoding();
            assert_eq!(OpCode::from_encoding(prefix, byte), Some(op), "{op}");
        }
        assert_eq!(OpCode::from_encoding(0xFE, 0x0C), Some(OpCode::Ldloc));
        assert_eq!(OpCode::from_encoding(0xFE, 0x7F), None);
    }

    #[test]
    fn test_opcode_sizes() {
        assert_eq!(OpCode::Ldloc0.size(), 1);
        assert_eq!(OpCode::LdlocS.size(), 2);
        assert_eq!(OpCode::Ldloc.size(), 4);
        assert_eq!(OpCode::Ldsfld.size(), 5);
        assert_eq!(OpCode::LdcI8.size(), 9);
        assert_eq!(OpCode::BrS.size(), 2);
        assert_eq!(OpCode::Br.size(), 5);
    }

    #[test]
    fn test_new_validates_operand() {
        assert!(Instruction::new(OpCode::Ldsfld, Operand::Token(Token::new(0x0400_0001))).is_ok());
        assert!(Instruction::new(OpCode::Ldsfld, Operand::Local(0)).is_err());
        assert!(Instruction::new(OpCode::LdlocS, Operand::Local(255)).is_ok());
        assert!(Instruction::new(OpCode::LdlocS, Operand::Local(256)).is_err());
        assert!(Instruction::new(OpCode::Ret, Operand::None).is_ok());
        assert!(Instruction::new(OpCode::Ret, Operand::Target(0)).is_err());
    }

    #[test]
    fn test_ldc_i4_selection() {
        assert_eq!(Instruction::ldc_i4(-1).opcode, OpCode::LdcI4M1);
        assert_eq!(Instruction::ldc_i4(8).opcode, OpCode::LdcI4_8);
        assert_eq!(Instruction::ldc_i4(-128).opcode, OpCode::LdcI4S);
        assert_eq!(Instruction::ldc_i4(128).opcode, OpCode::LdcI4);
        for value in [-200, -128, -1, 0, 5, 127, 1000] {
            assert_eq!(Instruction::ldc_i4(value).ldc_i4_value(), Some(value));
        }
    }

    #[test]
    fn test_index_accessors() {
        assert_eq!(Instruction::simple(OpCode::Stloc2).local_index(), Some(2));
        assert_eq!(
            Instruction::new(OpCode::Ldloca, Operand::Local(300))
                .unwrap()
                .local_index(),
            Some(300)
        );
        assert_eq!(Instruction::simple(OpCode::Ldarg3).argument_index(), Some(3));
        assert_eq!(Instruction::simple(OpCode::Ldarg3).local_index(), None);

        let field = Instruction::field(OpCode::Stsfld, Token::new(0x0400_0009));
        assert_eq!(field.field_token(), Some(Token::new(0x0400_0009)));
        assert_eq!(Instruction::simple(OpCode::Nop).field_token(), None);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(Instruction::simple(OpCode::Ret).to_string(), "ret");
        assert_eq!(
            Instruction::new(OpCode::StlocS, Operand::Local(4))
                .unwrap()
                .to_string(),
            "stloc.s V_4"
        );
        assert_eq!(
            Instruction::new(OpCode::Br, Operand::Target(12))
                .unwrap()
                .to_string(),
            "br IL_0012"
        );
    }
}
