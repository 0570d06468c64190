//! In-memory metadata model for .NET modules.
//!
//! This module holds the decoded view of a module that passes operate on: types,
//! their fields and methods, method bodies with locals and instructions, and the
//! tokens and signatures that tie them together. Reading and writing the PE and
//! metadata encodings is left to the loader that populates a [`module::Module`].
//!
//! # Key Components
//!
//! - [`module`] - The [`module::Module`] container and the synthetic `<Module>` type
//! - [`typedef`] - Type definitions
//! - [`field`] - Field definitions, attribute flags and constant values
//! - [`method`] - Methods, method bodies and local variables
//! - [`signatures`] - Field and local variable types
//! - [`token`] - Metadata table row references used throughout .NET
//!
//! # Examples
//!
//! ```rust
//! use unhoist::metadata::{
//!     field::{Field, FieldAttributes},
//!     module::Module,
//!     signatures::TypeSignature,
//!     token::Token,
//! };
//!
//! let mut module = Module::new("sample.dll");
//! module.get_or_create_module_type().fields.push(Field::new(
//!     Token::new(0x0400_0001),
//!     "counter",
//!     FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
//!     TypeSignature::I4,
//! ));
//!
//! let global = module.module_type().unwrap();
//! assert_eq!(global.fields.len(), 1);
//! ```

/// Field definitions and attributes
pub mod field;
/// Methods and decoded method bodies
pub mod method;
/// The module container
pub mod module;
/// Field and local variable signatures
pub mod signatures;
/// Commonly used metadata token type
pub mod token;
/// Type definitions
pub mod typedef;
