//! Method definitions and their decoded bodies.
//!
//! # Key Types
//! - [`Method`]: a `MethodDef` row with an optional decoded body
//! - [`MethodBody`]: locals and instructions of a method
//! - [`LocalVariable`]: one entry of a body's local variable list

mod body;
mod types;

pub use body::MethodBody;
pub use types::LocalVariable;

use crate::metadata::token::Token;

/// A method definition.
///
/// Abstract, runtime-provided and P/Invoke methods carry no body.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Token
    pub token: Token,
    /// The name of the method
    pub name: String,
    /// The decoded body, if the method has IL code
    pub body: Option<MethodBody>,
}

impl Method {
    /// Creates a method with a body
    #[must_use]
    pub fn new(token: Token, name: impl Into<String>, body: MethodBody) -> Self {
        Method {
            token,
            name: name.into(),
            body: Some(body),
        }
    }

    /// Creates a method without IL code
    #[must_use]
    pub fn without_body(token: Token, name: impl Into<String>) -> Self {
        Method {
            token,
            name: name.into(),
            body: None,
        }
    }
}
