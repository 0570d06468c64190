//! The in-memory module a pass operates on.
//!
//! A [`Module`] owns every [`TypeDef`] of one assembly module, including the
//! synthetic `<Module>` type that holds global fields and methods. Loaders populate
//! it from metadata; passes mutate it in place.
//!
//! # Examples
//!
//! ```rust
//! use unhoist::metadata::{module::Module, token::Token, typedef::TypeDef};
//!
//! let mut module = Module::new("sample.dll");
//! module.get_or_create_module_type();
//! module.add_type(TypeDef::new(Token::new(0x0200_0002), "Sample", "Program"));
//!
//! assert_eq!(module.type_tokens().len(), 2);
//! assert!(module.module_type().is_some());
//! ```

use crate::{
    metadata::{
        field::Field,
        method::Method,
        token::Token,
        typedef::{TypeDef, MODULE_TYPE_NAME},
    },
    Error, Result,
};

/// A module and all types it defines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// The module name (usually the file name)
    pub name: String,
    /// All type definitions, `<Module>` first when present
    pub types: Vec<TypeDef>,
}

impl Module {
    /// Creates an empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Adds a type definition
    pub fn add_type(&mut self, ty: TypeDef) {
        self.types.push(ty);
    }

    /// Tokens of all types, in declaration order
    #[must_use]
    pub fn type_tokens(&self) -> Vec<Token> {
        self.types.iter().map(|ty| ty.token).collect()
    }

    /// The synthetic `<Module>` type, if the module has one
    #[must_use]
    pub fn module_type(&self) -> Option<&TypeDef> {
        self.types.iter().find(|ty| ty.is_module_type())
    }

    /// Mutable access to the synthetic `<Module>` type
    pub fn module_type_mut(&mut self) -> Option<&mut TypeDef> {
        self.types.iter_mut().find(|ty| ty.is_module_type())
    }

    /// Returns the `<Module>` type, creating it first if the module has none.
    ///
    /// A created type takes the first free `TypeDef` row and is placed first in
    /// declaration order, as the runtime expects.
    pub fn get_or_create_module_type(&mut self) -> &mut TypeDef {
        let position = match self.types.iter().position(TypeDef::is_module_type) {
            Some(position) => position,
            None => {
                let row = self
                    .types
                    .iter()
                    .map(|ty| ty.token.row())
                    .max()
                    .map_or(1, |row| row + 1);
                let token = Token::from_parts(Token::TYPEDEF, row);
                self.types
                    .insert(0, TypeDef::new(token, "", MODULE_TYPE_NAME));
                0
            }
        };

        &mut self.types[position]
    }

    /// Looks up a type by token
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if no type has this token.
    pub fn type_by_token(&self, token: Token) -> Result<&TypeDef> {
        self.types
            .iter()
            .find(|ty| ty.token == token)
            .ok_or(Error::TypeNotFound(token))
    }

    /// Mutable lookup of a type by token
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if no type has this token.
    pub fn type_mut(&mut self, token: Token) -> Result<&mut TypeDef> {
        self.types
            .iter_mut()
            .find(|ty| ty.token == token)
            .ok_or(Error::TypeNotFound(token))
    }

    /// Looks up a method in any type by token
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotFound`] if no type declares this method.
    pub fn method(&self, token: Token) -> Result<&Method> {
        self.types
            .iter()
            .find_map(|ty| ty.method(token))
            .ok_or(Error::MethodNotFound(token))
    }

    /// Looks up a field in any type by token
    #[must_use]
    pub fn field(&self, token: Token) -> Option<&Field> {
        self.types.iter().find_map(|ty| ty.field(token))
    }
}
