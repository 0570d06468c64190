//! Built-in deobfuscation passes.
//!
//! Each pass implements [`ModulePass`](crate::deobfuscation::ModulePass) and
//! records its modifications in an [`EventLog`](crate::deobfuscation::EventLog).
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`HoistedLocalsPass`] | Converts static `<Module>` fields used as locals back into method locals |

mod hoisted;

pub use hoisted::{AccessKind, CandidateField, HoistedLocalsPass};
