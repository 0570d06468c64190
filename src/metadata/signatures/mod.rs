//! Type signatures for fields and local variables.
//!
//! Only the decoded form is modelled here; reading and writing the compressed
//! blob encoding (II.23.2) belongs to the loader that populates a
//! [`crate::metadata::module::Module`].

mod types;

pub use types::TypeSignature;
