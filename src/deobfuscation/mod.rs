//! Deobfuscation framework for .NET modules.
//!
//! This module hosts the pass infrastructure and the built-in passes that undo
//! obfuscator transformations on the in-memory [`Module`](crate::metadata::module::Module)
//! model.
//!
//! # Architecture
//!
//! ```text
//! Module ──► DeobfuscationEngine ──► for each pass:
//!                                      process(type) for every type
//!                                      finalize(module)
//!                                      summary()
//!                                 ──► DeobfuscationResult (events, summaries)
//! ```
//!
//! # Key Components
//!
//! - [`DeobfuscationEngine`] - Runs passes over a module and collects results
//! - [`ModulePass`] - The trait every pass implements
//! - [`EventLog`] - Tracks detections and changes made by passes
//! - [`Summary`] / [`Severity`] - Human-readable pass reports
//! - [`EngineConfig`] / [`LocalsConfig`] - Pass selection and tuning
//!
//! # Built-in Passes
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`HoistedLocalsPass`](crate::deobfuscation::passes::HoistedLocalsPass) | Converts static `<Module>` fields used as locals back into method locals |
//!
//! # Usage
//!
//! ```rust
//! use unhoist::assembly::{Instruction, OpCode};
//! use unhoist::deobfuscation::{DeobfuscationEngine, EngineConfig};
//! use unhoist::metadata::{
//!     field::{Field, FieldAttributes},
//!     method::{Method, MethodBody},
//!     module::Module,
//!     signatures::TypeSignature,
//!     token::Token,
//!     typedef::TypeDef,
//! };
//!
//! let field = Token::new(0x0400_0001);
//! let mut module = Module::new("sample.dll");
//! module.get_or_create_module_type().fields.push(Field::new(
//!     field,
//!     "F",
//!     FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
//!     TypeSignature::I4,
//! ));
//!
//! let mut program = TypeDef::new(Token::new(0x0200_0002), "Sample", "Program");
//! program.methods.push(Method::new(
//!     Token::new(0x0600_0001),
//!     "Main",
//!     MethodBody::new(vec![
//!         Instruction::ldc_i4(1),
//!         Instruction::field(OpCode::Stsfld, field),
//!         Instruction::field(OpCode::Ldsfld, field),
//!         Instruction::simple(OpCode::Ret),
//!     ]),
//! ));
//! module.add_type(program);
//!
//! let mut engine = DeobfuscationEngine::new(EngineConfig::default());
//! let result = engine.run(&mut module)?;
//!
//! assert_eq!(result.summaries[0].message, "Removed 2 local-to-field implementations");
//! assert!(module.field(field).is_none());
//! # Ok::<(), unhoist::Error>(())
//! ```

mod config;
mod engine;
mod events;
mod pass;
mod result;
mod summary;

pub mod passes;

pub use config::{EngineConfig, LocalsConfig};
pub use engine::DeobfuscationEngine;
pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use pass::ModulePass;
pub use result::DeobfuscationResult;
pub use summary::{Severity, Summary};
