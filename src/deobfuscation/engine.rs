//! The deobfuscation engine.
//!
//! [`DeobfuscationEngine`] runs a sequence of [`ModulePass`]es over a module:
//! every pass processes all types, then finalizes, then reports its summary.

use std::time::Instant;

use crate::{
    deobfuscation::{
        config::EngineConfig,
        events::{EventKind, EventLog},
        pass::ModulePass,
        passes::HoistedLocalsPass,
        result::DeobfuscationResult,
        summary::Summary,
    },
    metadata::module::Module,
    Result,
};

/// Drives deobfuscation passes over a module.
///
/// Passes run in registration order. Built-in passes enabled by the
/// [`EngineConfig`] are registered first; additional passes can be added with
/// [`DeobfuscationEngine::with_pass`].
///
/// Pass instances keep their state for the lifetime of the engine, so one engine
/// should process one module.
///
/// # Example
///
/// ```rust
/// use unhoist::deobfuscation::{DeobfuscationEngine, EngineConfig};
/// use unhoist::metadata::module::Module;
///
/// let mut module = Module::new("sample.dll");
/// module.get_or_create_module_type();
///
/// let mut engine = DeobfuscationEngine::new(EngineConfig::default());
/// assert_eq!(engine.pass_names(), vec!["hoisted-locals"]);
///
/// let result = engine.run(&mut module)?;
/// assert_eq!(result.passes, 1);
/// # Ok::<(), unhoist::Error>(())
/// ```
pub struct DeobfuscationEngine {
    /// Configuration.
    config: EngineConfig,
    /// Passes, in execution order.
    passes: Vec<Box<dyn ModulePass>>,
}

impl Default for DeobfuscationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DeobfuscationEngine {
    /// Creates a new engine with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration selecting and tuning built-in passes.
    ///
    /// # Returns
    ///
    /// A new `DeobfuscationEngine` instance ready to process a module.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut passes: Vec<Box<dyn ModulePass>> = Vec::new();
        if config.enable_hoisted_locals {
            passes.push(Box::new(HoistedLocalsPass::with_config(
                config.locals.clone(),
            )));
        }

        Self { config, passes }
    }

    /// Appends a pass that runs after all previously registered passes.
    #[must_use]
    pub fn with_pass(mut self, pass: Box<dyn ModulePass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// The configuration this engine was created with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Names of the registered passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Runs every registered pass over `module`.
    ///
    /// For each pass the type list is snapshotted before processing, so types a
    /// pass adds are not visited by that pass.
    ///
    /// # Arguments
    ///
    /// * `module` - The module to transform in place.
    ///
    /// # Returns
    ///
    /// A [`DeobfuscationResult`] with all events and pass summaries.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a pass. Events recorded up to that
    /// point are discarded.
    pub fn run(&mut self, module: &mut Module) -> Result<DeobfuscationResult> {
        let start = Instant::now();
        let events = EventLog::new();
        let mut summaries: Vec<Summary> = Vec::new();
        let mut changes = 0usize;

        for pass in &mut self.passes {
            log::debug!("Running pass {} on {}", pass.name(), module.name);
            events
                .record(EventKind::PassStarted)
                .message(format!("Starting pass: {}", pass.name()))
                .pass(pass.name());

            let mut changed_types = 0usize;
            for type_token in module.type_tokens() {
                if !pass.should_run(type_token, module) {
                    continue;
                }

                match pass.process(module, type_token, &events) {
                    Ok(true) => changed_types += 1,
                    Ok(false) => {}
                    Err(e) => {
                        log::error!(
                            "Pass {} failed on 0x{:08X}: {}",
                            pass.name(),
                            type_token.value(),
                            e
                        );
                        return Err(e);
                    }
                }
            }

            pass.finalize(module, &events)?;
            changes += pass.change_count();

            for summary in pass.summary() {
                log::info!("{}: {}", pass.name(), summary);
                summaries.push(summary);
            }

            events
                .record(EventKind::PassCompleted)
                .message(format!(
                    "Completed pass: {} ({} types changed)",
                    pass.name(),
                    changed_types
                ))
                .pass(pass.name());
        }

        Ok(DeobfuscationResult::new(events, summaries)
            .with_changes(changes)
            .with_timing(start.elapsed(), self.passes.len()))
    }
}
