//! Hoisted Locals Pass.
//!
//! Some obfuscators move the local variables of many methods into static fields
//! of the global `<Module>` type, so that every read and write of a local becomes
//! a field access. This pass reverses that idiom.
//!
//! # Algorithm
//!
//! 1. **Locate**: collect the static fields of `<Module>` that are not private,
//!    not `privatescope` and carry no default value. Done once per pass instance.
//! 2. **Rewrite**: in every method body, replace `ldsfld`/`stsfld`/`ldsflda` of a
//!    candidate with `ldloc`/`stloc`/`ldloca` of a local of the field's type. Each
//!    method gets its own local per field.
//! 3. **Re-optimize**: select the short forms of every rewritten body.
//! 4. **Remove**: once all types were processed, delete the converted fields.
//!
//! Instance field opcodes (`ldfld`, `stfld`, `ldflda`) naming a candidate are not
//! a hoisting pattern and keep their form. They still bind a local and count
//! towards the reported total, so the field is removed with the others and
//! [`HoistedLocalsPass::finalize`] warns about the reference left behind.
//!
//! # Example
//!
//! ```text
//! // Before
//! .field assembly static int32 F
//!
//! ldc.i4.5
//! stsfld int32 <Module>::F
//! ldsfld int32 <Module>::F
//! ret
//!
//! // After
//! .locals init (int32 V_0)
//!
//! ldc.i4.5
//! stloc.0
//! ldloc.0
//! ret
//! ```
//!
//! The rewrite assumes a candidate field behaves like a method-local value. A
//! field that is genuinely shared between methods is a false positive and will be
//! split into independent locals.

use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    assembly::{Instruction, OpCode, Operand},
    deobfuscation::{
        config::LocalsConfig,
        events::{EventKind, EventLog},
        pass::ModulePass,
        summary::Summary,
    },
    metadata::{
        field::Field,
        method::{LocalVariable, MethodBody},
        module::Module,
        signatures::TypeSignature,
        token::Token,
    },
    Error, Result,
};

const PASS_NAME: &str = "hoisted-locals";

/// How an instruction uses a candidate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// `ldsfld`
    Read,
    /// `stsfld`
    Write,
    /// `ldsflda`
    Address,
    /// Any other field opcode (`ldfld`, `stfld`, `ldflda`)
    Other,
}

impl AccessKind {
    /// Classifies a field access opcode.
    #[must_use]
    pub fn from_opcode(opcode: OpCode) -> Self {
        match opcode {
            OpCode::Ldsfld => AccessKind::Read,
            OpCode::Stsfld => AccessKind::Write,
            OpCode::Ldsflda => AccessKind::Address,
            _ => AccessKind::Other,
        }
    }

    /// The local variable opcode with the same effect, `None` for [`AccessKind::Other`].
    #[must_use]
    pub fn local_opcode(&self) -> Option<OpCode> {
        match self {
            AccessKind::Read => Some(OpCode::Ldloc),
            AccessKind::Write => Some(OpCode::Stloc),
            AccessKind::Address => Some(OpCode::Ldloca),
            AccessKind::Other => None,
        }
    }
}

/// A `<Module>` field that looks like a hoisted local.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateField {
    /// Token of the field
    pub token: Token,
    /// Name of the field
    pub name: String,
    /// The declared type, given to every local that replaces the field
    pub signature: TypeSignature,
}

impl CandidateField {
    /// Returns true if `field` qualifies: static, not private or `privatescope`,
    /// and without a default value.
    #[must_use]
    pub fn is_eligible(field: &Field) -> bool {
        field.is_static() && !field.access().is_restricted() && !field.has_default()
    }

    fn from_field(field: &Field) -> Self {
        CandidateField {
            token: field.token,
            name: field.name.clone(),
            signature: field.signature.clone(),
        }
    }
}

/// Converts static `<Module>` fields used as locals back into method locals.
///
/// All state lives in the instance: the candidate set (computed on the first
/// [`ModulePass::process`] call), the `(field, method)` to local index bindings,
/// and the number of rewritten instructions.
pub struct HoistedLocalsPass {
    config: LocalsConfig,
    candidates: FxHashMap<Token, CandidateField>,
    located: bool,
    bindings: FxHashMap<(Token, Token), u16>,
    rewrites: usize,
}

impl Default for HoistedLocalsPass {
    fn default() -> Self {
        Self::new()
    }
}

impl HoistedLocalsPass {
    /// Creates a new pass with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LocalsConfig::default())
    }

    /// Creates a new pass with the given configuration.
    #[must_use]
    pub fn with_config(config: LocalsConfig) -> Self {
        HoistedLocalsPass {
            config,
            candidates: FxHashMap::default(),
            located: false,
            bindings: FxHashMap::default(),
            rewrites: 0,
        }
    }

    /// Builds the candidate set from the `<Module>` fields of `module`.
    ///
    /// Only the first call inspects the module; later calls return the cached set
    /// even if the module changed in between. A module without `<Module>` type
    /// yields an empty set.
    pub fn locate(
        &mut self,
        module: &Module,
        events: &EventLog,
    ) -> &FxHashMap<Token, CandidateField> {
        if !self.located {
            self.located = true;

            if let Some(global) = module.module_type() {
                for field in global.fields.iter().filter(|f| CandidateField::is_eligible(f)) {
                    log::debug!(
                        "Hoisted local candidate: {} 0x{:08X} ({})",
                        field.name,
                        field.token.value(),
                        field.signature
                    );
                    events
                        .record(EventKind::CandidateIdentified)
                        .message(format!(
                            "Candidate field {} 0x{:08X}",
                            field.name,
                            field.token.value()
                        ))
                        .pass(PASS_NAME);

                    self.candidates
                        .insert(field.token, CandidateField::from_field(field));
                }
            }
        }

        &self.candidates
    }

    /// Number of candidate field accesses handled so far, including the
    /// instance opcodes that keep their form.
    #[must_use]
    pub fn rewrite_count(&self) -> usize {
        self.rewrites
    }

    /// Tokens of all candidates that were rewritten at least once.
    #[must_use]
    pub fn converted_fields(&self) -> FxHashSet<Token> {
        self.bindings.keys().map(|(field, _)| *field).collect()
    }

    /// The local index bound to `field` in `method`, if any access was handled.
    #[must_use]
    pub fn binding(&self, field: Token, method: Token) -> Option<u16> {
        self.bindings.get(&(field, method)).copied()
    }

    /// Warns about every instruction that still names one of the `removed` fields.
    fn report_dangling(module: &Module, removed: &FxHashSet<Token>, events: &EventLog) {
        for method in module.types.iter().flat_map(|ty| &ty.methods) {
            let Some(body) = method.body.as_ref() else {
                continue;
            };

            for (index, instruction) in body.instructions.iter().enumerate() {
                let Some(field) = instruction.field_token() else {
                    continue;
                };
                if !removed.contains(&field) {
                    continue;
                }

                log::warn!(
                    "{} in 0x{:08X} at IL_{:04} still references removed field 0x{:08X}",
                    instruction.opcode,
                    method.token.value(),
                    index,
                    field.value()
                );
                events
                    .record(EventKind::Warning)
                    .at(method.token, index)
                    .message(format!(
                        "{} references removed field 0x{:08X}",
                        instruction.opcode,
                        field.value()
                    ))
                    .pass(PASS_NAME);
            }
        }
    }

    fn rewrite_body(
        &mut self,
        method_token: Token,
        body: &mut MethodBody,
        events: &EventLog,
    ) -> Result<bool> {
        let mut changed = false;

        for index in 0..body.instructions.len() {
            let Some(field) = body.instructions[index].field_token() else {
                continue;
            };
            let Some(candidate) = self.candidates.get(&field) else {
                continue;
            };

            let original = body.instructions[index].opcode;
            let local = match self.bindings.entry((field, method_token)) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let local = body
                        .add_local(LocalVariable::new(candidate.signature.clone()))
                        .ok_or(Error::LocalLimit(method_token))?;
                    changed = true;

                    if candidate.signature.is_unknown() {
                        log::warn!(
                            "Field {} 0x{:08X} has no resolvable type, V_{} in 0x{:08X} uses a placeholder",
                            candidate.name,
                            field.value(),
                            local,
                            method_token.value()
                        );
                        events
                            .record(EventKind::Warning)
                            .method(method_token)
                            .message(format!(
                                "Unknown type for field {} 0x{:08X}",
                                candidate.name,
                                field.value()
                            ))
                            .pass(PASS_NAME);
                    }

                    events
                        .record(EventKind::LocalCreated)
                        .method(method_token)
                        .message(format!(
                            "V_{} ({}) replaces field {}",
                            local, candidate.signature, candidate.name
                        ))
                        .pass(PASS_NAME);

                    *entry.insert(local)
                }
            };

            // Every candidate access counts, instance opcodes keep their form
            self.rewrites += 1;
            let Some(opcode) = AccessKind::from_opcode(original).local_opcode() else {
                log::debug!(
                    "Leaving {} of candidate 0x{:08X} in 0x{:08X} at IL_{:04}",
                    original,
                    field.value(),
                    method_token.value(),
                    index
                );
                continue;
            };

            body.instructions[index] = Instruction::new(opcode, Operand::Local(local))?;
            changed = true;

            if self.config.record_rewrites {
                events
                    .record(EventKind::AccessRewritten)
                    .at(method_token, index)
                    .message(format!(
                        "{} 0x{:08X} -> {} V_{}",
                        original,
                        field.value(),
                        opcode,
                        local
                    ))
                    .pass(PASS_NAME);
            }
        }

        if changed && self.config.optimize_macros {
            body.optimize_macros();
        }

        Ok(changed)
    }
}

impl ModulePass for HoistedLocalsPass {
    fn name(&self) -> &'static str {
        PASS_NAME
    }

    fn description(&self) -> &'static str {
        "Converts static <Module> fields used as locals back into method locals"
    }

    fn process(
        &mut self,
        module: &mut Module,
        type_token: Token,
        events: &EventLog,
    ) -> Result<bool> {
        self.locate(module, events);

        let ty = module.type_mut(type_token)?;
        if self.candidates.is_empty() {
            return Ok(false);
        }

        let mut changed = false;
        for method in &mut ty.methods {
            let Some(body) = method.body.as_mut() else {
                continue;
            };

            if self.rewrite_body(method.token, body, events)? {
                changed = true;
            }
        }

        Ok(changed)
    }

    fn finalize(&mut self, module: &mut Module, events: &EventLog) -> Result<()> {
        if !self.config.remove_converted_fields {
            return Ok(());
        }

        let converted = self.converted_fields();
        if converted.is_empty() {
            return Ok(());
        }

        let Some(global) = module.module_type_mut() else {
            return Ok(());
        };

        let (removed, kept): (Vec<Field>, Vec<Field>) = global
            .fields
            .drain(..)
            .partition(|field| converted.contains(&field.token));
        global.fields = kept;

        for field in &removed {
            log::debug!("Removing field {} 0x{:08X}", field.name, field.token.value());
            events
                .record(EventKind::ArtifactRemoved)
                .message(format!("Removing field 0x{:08X}", field.token.value()))
                .pass(PASS_NAME);
        }

        let removed: FxHashSet<Token> = removed.iter().map(|field| field.token).collect();
        Self::report_dangling(module, &removed, events);

        Ok(())
    }

    fn change_count(&self) -> usize {
        self.rewrites
    }

    fn summary(&self) -> Box<dyn Iterator<Item = Summary> + '_> {
        Box::new(
            (self.rewrites > 0)
                .then(|| {
                    Summary::success(format!(
                        "Removed {} local-to-field implementations",
                        self.rewrites
                    ))
                })
                .into_iter(),
        )
    }
}
