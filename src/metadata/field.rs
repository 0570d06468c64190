//! Field definitions, their attribute flags and constant values.
//!
//! # Key Types
//! - [`Field`]: a field row with resolved name, signature and default value
//! - [`FieldAttributes`]: the raw `FieldAttributes` bitmask (II.23.1.5)
//! - [`FieldAccess`]: the decoded accessibility stored in the access mask
//! - [`ConstantValue`]: the value of a `Constant` row owned by a field

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::metadata::{signatures::TypeSignature, token::Token};

/// Bitmask for `FIELD_ACCESS` extraction
pub const FIELD_ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// All possible flags for `FieldAttributes`
    pub struct FieldAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEMBLY = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is compile time constant
        const LITERAL = 0x0040;
        /// Reserved (to indicate this field should not be serialized when type is remoted)
        const NOT_SERIALIZED = 0x0080;
        /// Field has RVA
        const HAS_FIELD_RVA = 0x0100;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the field
        const RTSPECIAL_NAME = 0x0400;
        /// Field has marshalling information
        const HAS_FIELD_MARSHAL = 0x1000;
        /// Implementation is forwarded through `PInvoke`
        const PINVOKE_IMPL = 0x2000;
        /// Field has default
        const HAS_DEFAULT = 0x8000;
    }
}

/// Accessibility of a field, stored in the low three bits of its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum FieldAccess {
    /// Member not referenceable (`privatescope`)
    #[strum(serialize = "privatescope")]
    CompilerControlled,
    /// Accessible only by the parent type
    #[strum(serialize = "private")]
    Private,
    /// Accessible by sub-types only in this Assembly
    #[strum(serialize = "famandassem")]
    FamAndAssem,
    /// Accessible by anyone in the Assembly
    #[strum(serialize = "assembly")]
    Assembly,
    /// Accessible only by type and sub-types
    #[strum(serialize = "family")]
    Family,
    /// Accessible by sub-types anywhere, plus anyone in assembly
    #[strum(serialize = "famorassem")]
    FamOrAssem,
    /// Accessible by anyone
    #[strum(serialize = "public")]
    Public,
}

impl FieldAccess {
    /// Decode the access level from raw field flags
    #[must_use]
    pub fn from_field_flags(flags: u32) -> Self {
        match flags & FIELD_ACCESS_MASK {
            0x0001 => FieldAccess::Private,
            0x0002 => FieldAccess::FamAndAssem,
            0x0003 => FieldAccess::Assembly,
            0x0004 => FieldAccess::Family,
            0x0005 => FieldAccess::FamOrAssem,
            0x0006 => FieldAccess::Public,
            // 0x0000 and the reserved 0x0007
            _ => FieldAccess::CompilerControlled,
        }
    }

    /// Returns true for access levels that keep the field out of reach of other types.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self, FieldAccess::Private | FieldAccess::CompilerControlled)
    }
}

/// The value of a `Constant` row attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// A boolean constant
    Boolean(bool),
    /// A 32-bit (or narrower) integer constant
    I4(i32),
    /// A 64-bit integer constant
    I8(i64),
    /// A floating point constant
    R8(f64),
    /// A string constant
    String(String),
    /// The null reference
    Null,
}

/// A field definition with resolved name, signature and default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Token
    pub token: Token,
    /// The name of the field
    pub name: String,
    /// Field attribute flags
    pub flags: FieldAttributes,
    /// The declared type of the field
    pub signature: TypeSignature,
    /// A default value (flags.HasDefault)
    pub default: Option<ConstantValue>,
}

impl Field {
    /// Creates a field without a default value.
    #[must_use]
    pub fn new(
        token: Token,
        name: impl Into<String>,
        flags: FieldAttributes,
        signature: TypeSignature,
    ) -> Self {
        Field {
            token,
            name: name.into(),
            flags,
            signature,
            default: None,
        }
    }

    /// Attaches a constant value and sets `HAS_DEFAULT`.
    #[must_use]
    pub fn with_default(mut self, value: ConstantValue) -> Self {
        self.flags |= FieldAttributes::HAS_DEFAULT;
        self.default = Some(value);
        self
    }

    /// Returns true if the field is defined on its type rather than per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldAttributes::STATIC)
    }

    /// The decoded accessibility of this field
    #[must_use]
    pub fn access(&self) -> FieldAccess {
        FieldAccess::from_field_flags(self.flags.bits())
    }

    /// Returns true if the field carries an explicit default value
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.flags.contains(FieldAttributes::HAS_DEFAULT) || self.default.is_some()
    }
}
