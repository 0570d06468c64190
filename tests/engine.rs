//! Integration tests for the deobfuscation engine.
//!
//! These drive whole modules through `DeobfuscationEngine::run` and check the
//! resulting module, event log and summaries.

use unhoist::{prelude::*, Result};

fn field_token(rid: u32) -> Token {
    Token::from_parts(Token::FIELD, rid)
}

fn method_token(rid: u32) -> Token {
    Token::from_parts(Token::METHODDEF, rid)
}

/// A module shaped like obfuscator output: two hoisted fields used by methods of
/// two types, one field with a default value and one private field.
fn obfuscated_module() -> Module {
    let mut module = Module::new("obfuscated.dll");
    let global = module.get_or_create_module_type();
    for (rid, name, signature) in [
        (1, "a", TypeSignature::I4),
        (2, "b", TypeSignature::String),
    ] {
        global.fields.push(Field::new(
            field_token(rid),
            name,
            FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
            signature,
        ));
    }
    global.fields.push(
        Field::new(
            field_token(3),
            "version",
            FieldAttributes::STATIC | FieldAttributes::PUBLIC,
            TypeSignature::I4,
        )
        .with_default(ConstantValue::I4(2)),
    );
    global.fields.push(Field::new(
        field_token(4),
        "secret",
        FieldAttributes::STATIC | FieldAttributes::PRIVATE,
        TypeSignature::I4,
    ));

    let mut first = TypeDef::new(Token::new(0x0200_0002), "App", "First");
    first.methods.push(Method::new(
        method_token(1),
        "Run",
        MethodBody::new(vec![
            Instruction::ldc_i4(10),
            Instruction::field(OpCode::Stsfld, field_token(1)),
            Instruction::new(OpCode::Ldstr, Operand::Token(Token::new(0x7000_0001)))
                .unwrap(),
            Instruction::field(OpCode::Stsfld, field_token(2)),
            Instruction::field(OpCode::Ldsfld, field_token(1)),
            Instruction::field(OpCode::Ldsfld, field_token(3)),
            Instruction::simple(OpCode::Add),
            Instruction::simple(OpCode::Ret),
        ]),
    ));
    module.add_type(first);

    let mut second = TypeDef::new(Token::new(0x0200_0003), "App", "Second");
    second.methods.push(Method::new(
        method_token(2),
        "Helper",
        MethodBody::new(vec![
            Instruction::field(OpCode::Ldsfld, field_token(2)),
            Instruction::field(OpCode::Ldsfld, field_token(4)),
            Instruction::simple(OpCode::Pop),
            Instruction::simple(OpCode::Ret),
        ]),
    ));
    second
        .methods
        .push(Method::without_body(method_token(3), "Native"));
    module.add_type(second);

    module
}

#[test]
fn test_default_engine_removes_hoisted_fields() -> Result<()> {
    let mut module = obfuscated_module();
    let mut engine = DeobfuscationEngine::default();

    let result = engine.run(&mut module)?;

    assert!(module.field(field_token(1)).is_none());
    assert!(module.field(field_token(2)).is_none());
    assert!(module.field(field_token(3)).is_some());
    assert!(module.field(field_token(4)).is_some());

    let run = module.method(method_token(1))?.body.as_ref().unwrap();
    assert_eq!(run.locals.len(), 2);
    assert_eq!(run.locals[0].signature, TypeSignature::I4);
    assert_eq!(run.locals[1].signature, TypeSignature::String);

    let helper = module.method(method_token(2))?.body.as_ref().unwrap();
    assert_eq!(helper.instructions[0].opcode, OpCode::Ldloc0);
    assert_eq!(
        helper.instructions[1],
        Instruction::field(OpCode::Ldsfld, field_token(4))
    );

    assert_eq!(result.passes, 1);
    assert_eq!(result.accesses_rewritten(), 4);
    assert_eq!(result.artifacts_removed(), 2);
    assert_eq!(result.summaries.len(), 1);
    assert_eq!(
        result.summaries[0].message,
        "Removed 4 local-to-field implementations"
    );
    assert_eq!(result.events.count_kind(EventKind::PassStarted), 1);
    assert_eq!(result.events.count_kind(EventKind::PassCompleted), 1);
    assert!(result.detailed_summary().contains("[success] Removed 4"));

    Ok(())
}

#[test]
fn test_engine_without_passes_changes_nothing() -> Result<()> {
    let mut module = obfuscated_module();
    let before = module.clone();
    let mut engine = DeobfuscationEngine::new(EngineConfig::empty());

    let result = engine.run(&mut module)?;

    assert_eq!(module, before);
    assert!(result.events.is_empty());
    assert!(result.summaries.is_empty());
    assert_eq!(result.passes, 0);

    Ok(())
}

#[test]
fn test_engine_keeps_fields_when_configured() -> Result<()> {
    let mut module = obfuscated_module();
    let config = EngineConfig::default()
        .with_locals(LocalsConfig::keep_fields().with_record_rewrites(false));
    let mut engine = DeobfuscationEngine::new(config);

    let result = engine.run(&mut module)?;

    assert!(module.field(field_token(1)).is_some());
    assert!(module.field(field_token(2)).is_some());
    assert_eq!(result.accesses_rewritten(), 4);
    assert_eq!(result.artifacts_removed(), 0);
    assert_eq!(result.summaries.len(), 1);

    Ok(())
}

#[test]
fn test_rewrite_count_without_rewrite_events() -> Result<()> {
    let mut module = obfuscated_module();
    let config = EngineConfig::default()
        .with_locals(LocalsConfig::default().with_record_rewrites(false));
    let mut engine = DeobfuscationEngine::new(config);

    let result = engine.run(&mut module)?;

    assert!(!result.events.has(EventKind::AccessRewritten));
    assert_eq!(result.accesses_rewritten(), 4);
    assert_eq!(result.changes, 4);
    assert_eq!(
        result.summaries[0].message,
        "Removed 4 local-to-field implementations"
    );
    assert_eq!(result.artifacts_removed(), 2);

    Ok(())
}

/// Records every type it sees and fails on a chosen one.
struct TracingPass {
    fail_on: Option<Token>,
}

impl ModulePass for TracingPass {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn process(
        &mut self,
        _module: &mut Module,
        type_token: Token,
        events: &EventLog,
    ) -> Result<bool> {
        if Some(type_token) == self.fail_on {
            return Err(Error::TypeNotFound(type_token));
        }
        events
            .record(EventKind::Info)
            .message(format!("visited {type_token}"));
        Ok(false)
    }

    fn summary(&self) -> Box<dyn Iterator<Item = Summary> + '_> {
        Box::new(std::iter::once(Summary::new("traced", Severity::Info)))
    }
}

#[test]
fn test_custom_pass_runs_after_builtin() -> Result<()> {
    let mut module = obfuscated_module();
    let mut engine =
        DeobfuscationEngine::default().with_pass(Box::new(TracingPass { fail_on: None }));
    assert_eq!(engine.pass_names(), vec!["hoisted-locals", "tracing"]);

    let result = engine.run(&mut module)?;

    assert_eq!(result.passes, 2);
    assert_eq!(result.events.count_kind(EventKind::Info), 3);
    assert_eq!(result.summaries.len(), 2);
    assert_eq!(result.summaries[1].severity, Severity::Info);

    Ok(())
}

#[test]
fn test_pass_error_aborts_run() {
    let mut module = obfuscated_module();
    let failing = Token::new(0x0200_0003);
    let mut engine = DeobfuscationEngine::new(EngineConfig::empty())
        .with_pass(Box::new(TracingPass { fail_on: Some(failing) }));

    let result = engine.run(&mut module);

    assert!(matches!(result, Err(Error::TypeNotFound(token)) if token == failing));
}
