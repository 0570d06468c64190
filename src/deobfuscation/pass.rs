//! Pass trait for the deobfuscation pipeline.
//!
//! A [`ModulePass`] rewrites the types of one module in place. The driver calls
//! [`ModulePass::process`] once for every type, then [`ModulePass::finalize`]
//! once, then collects [`ModulePass::summary`].

use crate::{
    deobfuscation::{events::EventLog, summary::Summary},
    metadata::{module::Module, token::Token},
    Result,
};

/// A deobfuscation pass that operates on the types of a module.
///
/// Passes own all state they accumulate across types. One instance is meant for
/// one module; running independent modules in parallel uses independent
/// instances.
///
/// # Lifecycle
///
/// 1. `process` for every type token of the module, in declaration order
/// 2. `finalize` once all types were processed
/// 3. `summary` to report what was changed
pub trait ModulePass: Send {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Should this pass run on a specific type?
    ///
    /// Called before `process`. Override to skip types that don't need this
    /// pass.
    fn should_run(&self, _type_token: Token, _module: &Module) -> bool {
        true
    }

    /// Run the pass on the methods of a single type.
    ///
    /// Returns `true` if any changes were made, `false` otherwise. Events should
    /// be recorded directly to `events`.
    ///
    /// # Arguments
    ///
    /// * `module` - The module being transformed.
    /// * `type_token` - The type whose methods are processed.
    /// * `events` - Log receiving change and diagnostic events.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist or a body cannot be rewritten.
    fn process(&mut self, module: &mut Module, type_token: Token, events: &EventLog)
        -> Result<bool>;

    /// Called once after every type was processed.
    ///
    /// Use this for module-level cleanup such as removing dead declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if finalization fails.
    fn finalize(&mut self, _module: &mut Module, _events: &EventLog) -> Result<()> {
        Ok(())
    }

    /// Number of changes this pass made so far.
    ///
    /// The engine sums these into [`DeobfuscationResult::changes`], independent of
    /// which events were recorded.
    ///
    /// [`DeobfuscationResult::changes`]: crate::deobfuscation::DeobfuscationResult::changes
    fn change_count(&self) -> usize {
        0
    }

    /// Human-readable records of what this pass changed.
    ///
    /// The iterator can be requested any number of times and reflects the state
    /// at the time of the call.
    fn summary(&self) -> Box<dyn Iterator<Item = Summary> + '_> {
        Box::new(std::iter::empty())
    }
}
