// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # unhoist
//!
//! A deobfuscation pass for .NET modules that turns static fields back into the
//! method locals they replaced.
//!
//! Several obfuscators "hoist" local variables: every local of every method is
//! replaced by a static field on the global `<Module>` type, so `stloc.0` becomes
//! `stsfld <Module>::a` and `ldloc.0` becomes `ldsfld <Module>::a`. Decompilers
//! then show shared global state where the original code had plain locals.
//! `unhoist` detects those fields, rewrites their accesses into accesses of fresh
//! per-method locals and deletes the fields.
//!
//! ## Features
//!
//! - **In-memory module model** - Types, fields, methods, bodies, locals and tokens
//! - **Instruction model** - CIL opcodes with encodings, operand types and sizes
//! - **Macro optimization** - Re-selects `ldloc.0`, `.s` forms, `ldc.i4.N` and short branches
//! - **Event log** - Every detection, rewrite and removal is recorded
//! - **Pass engine** - Runs passes over a module and collects summaries
//!
//! ## Quick Start
//!
//! ```rust
//! use unhoist::prelude::*;
//!
//! let field = Token::new(0x0400_0001);
//! let mut module = Module::new("sample.dll");
//! module.get_or_create_module_type().fields.push(Field::new(
//!     field,
//!     "a",
//!     FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
//!     TypeSignature::String,
//! ));
//!
//! let mut program = TypeDef::new(Token::new(0x0200_0002), "Sample", "Program");
//! program.methods.push(Method::new(
//!     Token::new(0x0600_0001),
//!     "Main",
//!     MethodBody::new(vec![
//!         Instruction::field(OpCode::Ldsfld, field),
//!         Instruction::simple(OpCode::Ret),
//!     ]),
//! ));
//! module.add_type(program);
//!
//! let mut pass = HoistedLocalsPass::new();
//! let events = EventLog::new();
//! pass.process(&mut module, Token::new(0x0200_0002), &events)?;
//! pass.finalize(&mut module, &events)?;
//!
//! let body = module.method(Token::new(0x0600_0001))?.body.as_ref().unwrap();
//! assert_eq!(body.instructions[0].opcode, OpCode::Ldloc0);
//! assert_eq!(body.locals[0].signature, TypeSignature::String);
//! # Ok::<(), unhoist::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The module model a loader populates and passes mutate
//! - [`assembly`] - Instructions, opcodes and the macro optimizer
//! - [`deobfuscation`] - Pass trait, engine, events and the built-in passes
//!
//! Reading and writing PE files is not part of this crate.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade. Install any
//! logger in the host application to see candidate detection and field removal
//! at `debug` level and pass summaries at `info` level.
//!
//! ## Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use unhoist::prelude::*;
///
/// let engine = DeobfuscationEngine::new(EngineConfig::default());
/// assert_eq!(engine.pass_names(), vec!["hoisted-locals"]);
/// ```
pub mod prelude;

/// CIL instructions and encoding selection
///
/// This module models decoded CIL instructions and picks their encodings:
///
/// - **Opcodes**: every opcode the passes produce or inspect, with encoding bytes
/// - **Operands**: immediates, tokens, local and argument slots, branch targets
/// - **Macro optimization**: shortest encodings after a rewrite
///
/// # Key Types
///
/// - [`assembly::Instruction`] - A decoded instruction
/// - [`assembly::OpCode`] - Opcode with mnemonic, encoding and operand type
/// - [`assembly::Operand`] - Instruction operands
///
/// # Examples
///
/// ```rust
/// use unhoist::assembly::{optimize_macros, Instruction, OpCode, Operand};
///
/// let mut code = vec![
///     Instruction::new(OpCode::Stloc, Operand::Local(0))?,
///     Instruction::simple(OpCode::Ret),
/// ];
/// assert_eq!(optimize_macros(&mut code), 1);
/// assert_eq!(code[0].opcode, OpCode::Stloc0);
/// # Ok::<(), unhoist::Error>(())
/// ```
pub mod assembly;

/// Deobfuscation passes and the engine that runs them
///
/// # Key Components
///
/// - [`deobfuscation::DeobfuscationEngine`] - Runs passes over a module
/// - [`deobfuscation::ModulePass`] - Trait implemented by every pass
/// - [`deobfuscation::passes::HoistedLocalsPass`] - Converts hoisted fields back to locals
/// - [`deobfuscation::EventLog`] - Change tracking
///
/// # Examples
///
/// ```rust
/// use unhoist::deobfuscation::{DeobfuscationEngine, EngineConfig, LocalsConfig};
/// use unhoist::metadata::module::Module;
///
/// let config = EngineConfig::default().with_locals(LocalsConfig::keep_fields());
/// let mut engine = DeobfuscationEngine::new(config);
/// let result = engine.run(&mut Module::new("empty.dll"))?;
/// assert!(result.summaries.is_empty());
/// # Ok::<(), unhoist::Error>(())
/// ```
pub mod deobfuscation;

/// The in-memory module model
///
/// # Key Components
///
/// - [`metadata::module`] - The module and its `<Module>` type
/// - [`metadata::typedef`] - Type definitions
/// - [`metadata::field`] - Fields, flags and constants
/// - [`metadata::method`] - Methods, bodies and locals
/// - [`metadata::signatures`] - Types of fields and locals
/// - [`metadata::token`] - Metadata tokens for cross-references
pub mod metadata;

/// `unhoist` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use unhoist::{metadata::{module::Module, token::Token}, Result};
///
/// fn type_name(module: &Module, token: Token) -> Result<String> {
///     Ok(module.type_by_token(token)?.fullname())
/// }
///
/// assert!(type_name(&Module::new("a.dll"), Token::new(0x0200_0001)).is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `unhoist` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use unhoist::{Error, metadata::{module::Module, token::Token}};
///
/// match Module::new("a.dll").method(Token::new(0x0600_0001)) {
///     Ok(method) => println!("found {}", method.name),
///     Err(Error::MethodNotFound(token)) => println!("missing {}", token),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;
