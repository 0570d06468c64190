use std::fmt;

use crate::metadata::token::Token;

/// A type as it appears in field and local variable signatures (II.23.2.12).
///
/// Only the element types that can be stored in a field or local are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSignature {
    #[default]
    /// Not defined, or could not be resolved
    Unknown,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// CIL value-type
    // TypeDefOrRefOrSpecEncoded
    ValueType(Token),
    /// CIL Class
    // TypeDefOrRefOrSpecEncoded
    Class(Token),
    /// Single dimension array
    SzArray(Box<TypeSignature>),
}

impl TypeSignature {
    /// Returns true if the signature could not be resolved to a concrete type.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeSignature::Unknown)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Unknown => f.write_str("?"),
            TypeSignature::Boolean => f.write_str("bool"),
            TypeSignature::Char => f.write_str("char"),
            TypeSignature::I1 => f.write_str("int8"),
            TypeSignature::U1 => f.write_str("uint8"),
            TypeSignature::I2 => f.write_str("int16"),
            TypeSignature::U2 => f.write_str("uint16"),
            TypeSignature::I4 => f.write_str("int32"),
            TypeSignature::U4 => f.write_str("uint32"),
            TypeSignature::I8 => f.write_str("int64"),
            TypeSignature::U8 => f.write_str("uint64"),
            TypeSignature::R4 => f.write_str("float32"),
            TypeSignature::R8 => f.write_str("float64"),
            TypeSignature::I => f.write_str("native int"),
            TypeSignature::U => f.write_str("native uint"),
            TypeSignature::String => f.write_str("string"),
            TypeSignature::Object => f.write_str("object"),
            TypeSignature::ByRef(inner) => write!(f, "{inner}&"),
            TypeSignature::ValueType(token) => write!(f, "valuetype {token}"),
            TypeSignature::Class(token) => write!(f, "class {token}"),
            TypeSignature::SzArray(inner) => write!(f, "{inner}[]"),
        }
    }
}
