//! Supporting types for method bodies.

use crate::metadata::signatures::TypeSignature;

/// Represents a local variable in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// The type of this variable
    pub signature: TypeSignature,
    /// This variable is pinned
    pub is_pinned: bool,
}

impl LocalVariable {
    /// Creates an unpinned local of the given type.
    #[must_use]
    pub fn new(signature: TypeSignature) -> Self {
        LocalVariable {
            signature,
            is_pinned: false,
        }
    }
}
