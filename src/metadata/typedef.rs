//! Type definitions owned by a module.

use crate::metadata::{field::Field, method::Method, token::Token};

/// Name of the synthetic type that holds module-level (global) members
pub const MODULE_TYPE_NAME: &str = "<Module>";

/// A `TypeDef` row with its fields and methods.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Token
    pub token: Token,
    /// The namespace, empty for the global namespace
    pub namespace: String,
    /// The name of the type
    pub name: String,
    /// The fields declared by this type
    pub fields: Vec<Field>,
    /// The methods declared by this type
    pub methods: Vec<Method>,
}

impl TypeDef {
    /// Creates an empty type
    #[must_use]
    pub fn new(token: Token, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDef {
            token,
            namespace: namespace.into(),
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns true if this is the synthetic `<Module>` type
    #[must_use]
    pub fn is_module_type(&self) -> bool {
        self.namespace.is_empty() && self.name == MODULE_TYPE_NAME
    }

    /// Namespace-qualified name
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Looks up a declared field by token
    #[must_use]
    pub fn field(&self, token: Token) -> Option<&Field> {
        self.fields.iter().find(|field| field.token == token)
    }

    /// Looks up a declared method by token
    #[must_use]
    pub fn method(&self, token: Token) -> Option<&Method> {
        self.methods.iter().find(|method| method.token == token)
    }
}
