//! Configuration for the deobfuscation engine.
//!
//! This module provides configuration types for controlling the deobfuscation
//! pipeline: which built-in passes are registered and how the hoisted-locals
//! pass rewrites and cleans up.

/// Configuration for the deobfuscation engine.
///
/// Controls which built-in passes the engine registers and how they behave.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Register the hoisted-locals pass (default: true).
    pub enable_hoisted_locals: bool,

    /// Settings of the hoisted-locals pass.
    pub locals: LocalsConfig,
}

/// Configuration for the hoisted-locals pass.
///
/// Controls what the pass records and what it removes once every type was
/// processed.
#[derive(Debug, Clone)]
pub struct LocalsConfig {
    /// Remove converted fields from `<Module>` in `finalize` (default: true).
    pub remove_converted_fields: bool,

    /// Record an event for every rewritten instruction (default: true).
    ///
    /// Large modules produce one event per field access; turn this off to keep
    /// only the per-field events.
    pub record_rewrites: bool,

    /// Re-select short instruction encodings in rewritten bodies (default: true).
    pub optimize_macros: bool,
}

impl Default for LocalsConfig {
    fn default() -> Self {
        Self {
            remove_converted_fields: true,
            record_rewrites: true,
            optimize_macros: true,
        }
    }
}

impl LocalsConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that rewrites accesses but keeps every field.
    #[must_use]
    pub fn keep_fields() -> Self {
        Self {
            remove_converted_fields: false,
            ..Self::default()
        }
    }

    /// Enables or disables per-instruction events.
    #[must_use]
    pub fn with_record_rewrites(mut self, enabled: bool) -> Self {
        self.record_rewrites = enabled;
        self
    }

    /// Enables or disables short-form re-selection after rewriting.
    #[must_use]
    pub fn with_optimize_macros(mut self, enabled: bool) -> Self {
        self.optimize_macros = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_hoisted_locals: true,
            locals: LocalsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default settings.
    ///
    /// # Returns
    ///
    /// A new `EngineConfig` with every built-in pass registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration without built-in passes.
    ///
    /// Passes are then added with
    /// [`DeobfuscationEngine::with_pass`](crate::deobfuscation::DeobfuscationEngine::with_pass).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            enable_hoisted_locals: false,
            ..Self::default()
        }
    }

    /// Sets the hoisted-locals pass configuration.
    ///
    /// # Arguments
    ///
    /// * `locals` - The settings to use for the pass.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_locals(mut self, locals: LocalsConfig) -> Self {
        self.locals = locals;
        self
    }

    /// Enables or disables the hoisted-locals pass.
    #[must_use]
    pub fn with_hoisted_locals(mut self, enabled: bool) -> Self {
        self.enable_hoisted_locals = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.enable_hoisted_locals);
        assert!(config.locals.remove_converted_fields);
        assert!(config.locals.record_rewrites);
        assert!(config.locals.optimize_macros);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::empty()
            .with_locals(LocalsConfig::keep_fields().with_record_rewrites(false));
        assert!(!config.enable_hoisted_locals);
        assert!(!config.locals.remove_converted_fields);
        assert!(!config.locals.record_rewrites);
        assert!(config.locals.optimize_macros);

        assert!(config.with_hoisted_locals(true).enable_hoisted_locals);
    }
}
