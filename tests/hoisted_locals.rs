//! Integration tests for the hoisted-locals pass.
//!
//! Each test builds a small module by hand, runs the pass through the same
//! `process` / `finalize` / `summary` sequence the engine uses, and checks the
//! exact instructions, locals and fields left behind.

use unhoist::{prelude::*, Result};

const GLOBAL_TYPE: Token = Token(0x0200_0001);

fn field_token(rid: u32) -> Token {
    Token::from_parts(Token::FIELD, rid)
}

fn method_token(rid: u32) -> Token {
    Token::from_parts(Token::METHODDEF, rid)
}

fn global(rid: u32, name: &str, signature: TypeSignature) -> Field {
    Field::new(
        field_token(rid),
        name,
        FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
        signature,
    )
}

fn method(rid: u32, name: &str, instructions: Vec<Instruction>) -> Method {
    Method::new(method_token(rid), name, MethodBody::new(instructions))
}

/// `<Module>` with `globals` plus one type `Test.Program` holding `methods`.
fn module_with(globals: Vec<Field>, methods: Vec<Method>) -> Module {
    let mut module = Module::new("hoisted.dll");
    module.get_or_create_module_type().fields = globals;

    let mut program = TypeDef::new(Token::new(0x0200_0002), "Test", "Program");
    program.methods = methods;
    module.add_type(program);
    module
}

/// Runs the pass over every type, finalizes and returns the pass with its events.
fn run(module: &mut Module) -> Result<(HoistedLocalsPass, EventLog)> {
    let mut pass = HoistedLocalsPass::new();
    let events = EventLog::new();
    for token in module.type_tokens() {
        pass.process(module, token, &events)?;
    }
    pass.finalize(module, &events)?;
    Ok((pass, events))
}

fn body(module: &Module, rid: u32) -> &MethodBody {
    module
        .method(method_token(rid))
        .unwrap()
        .body
        .as_ref()
        .unwrap()
}

fn opcodes(module: &Module, rid: u32) -> Vec<OpCode> {
    body(module, rid)
        .instructions
        .iter()
        .map(|i| i.opcode)
        .collect()
}

/// Two methods each store to and load from `F`: four rewrites, `F` removed.
#[test]
fn test_two_methods_share_one_field() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I4)],
        vec![
            method(
                1,
                "A",
                vec![
                    Instruction::ldc_i4(1),
                    Instruction::field(OpCode::Stsfld, f),
                    Instruction::field(OpCode::Ldsfld, f),
                    Instruction::simple(OpCode::Ret),
                ],
            ),
            method(
                2,
                "B",
                vec![
                    Instruction::ldc_i4(2),
                    Instruction::field(OpCode::Stsfld, f),
                    Instruction::field(OpCode::Ldsfld, f),
                    Instruction::simple(OpCode::Ret),
                ],
            ),
        ],
    );

    let (pass, events) = run(&mut module)?;

    for rid in [1, 2] {
        assert_eq!(
            opcodes(&module, rid)[1..3].to_vec(),
            vec![OpCode::Stloc0, OpCode::Ldloc0]
        );
        assert_eq!(body(&module, rid).locals.len(), 1);
        assert_eq!(body(&module, rid).locals[0].signature, TypeSignature::I4);
    }

    assert!(module.field(f).is_none());
    assert_eq!(pass.rewrite_count(), 4);
    assert_eq!(events.count_kind(EventKind::AccessRewritten), 4);
    assert_eq!(events.count_kind(EventKind::ArtifactRemoved), 1);

    let summaries: Vec<Summary> = pass.summary().collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(
        summaries[0].message,
        "Removed 4 local-to-field implementations"
    );
    assert_eq!(summaries[0].severity, Severity::Success);

    Ok(())
}

/// A field with a default value is not a candidate: nothing changes.
#[test]
fn test_field_with_default_is_untouched() -> Result<()> {
    let g = field_token(1);
    let original = vec![
        Instruction::field(OpCode::Ldsfld, g),
        Instruction::simple(OpCode::Ret),
    ];
    let mut module = module_with(
        vec![global(1, "G", TypeSignature::I4).with_default(ConstantValue::I4(3))],
        vec![method(1, "M", original.clone())],
    );

    let (pass, events) = run(&mut module)?;

    assert_eq!(body(&module, 1).instructions, original);
    assert!(body(&module, 1).locals.is_empty());
    assert!(module.field(g).is_some());
    assert_eq!(pass.rewrite_count(), 0);
    assert_eq!(pass.summary().count(), 0);
    assert!(!events.has(EventKind::CandidateIdentified));

    Ok(())
}

/// Private, `privatescope` and instance fields are never converted.
#[test]
fn test_restricted_and_instance_fields_are_excluded() -> Result<()> {
    let private = Field::new(
        field_token(1),
        "p",
        FieldAttributes::STATIC | FieldAttributes::PRIVATE,
        TypeSignature::I4,
    );
    let scoped = Field::new(
        field_token(2),
        "s",
        FieldAttributes::STATIC,
        TypeSignature::I4,
    );
    let instance = Field::new(
        field_token(3),
        "i",
        FieldAttributes::PUBLIC,
        TypeSignature::I4,
    );
    let code: Vec<Instruction> = (1..=3)
        .map(|rid| Instruction::field(OpCode::Ldsfld, field_token(rid)))
        .chain(std::iter::once(Instruction::simple(OpCode::Ret)))
        .collect();
    let mut module = module_with(
        vec![private, scoped, instance],
        vec![method(1, "M", code.clone())],
    );

    let (pass, _) = run(&mut module)?;

    assert_eq!(body(&module, 1).instructions, code);
    assert_eq!(module.module_type().unwrap().fields.len(), 3);
    assert_eq!(pass.rewrite_count(), 0);

    Ok(())
}

/// Reads, writes and address loads keep their meaning.
#[test]
fn test_access_kinds_are_preserved() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I8)],
        vec![method(
            1,
            "M",
            vec![
                Instruction::new(OpCode::LdcI8, Operand::Immediate(Immediate::Int64(7)))?,
                Instruction::field(OpCode::Stsfld, f),
                Instruction::field(OpCode::Ldsflda, f),
                Instruction::simple(OpCode::Pop),
                Instruction::field(OpCode::Ldsfld, f),
                Instruction::simple(OpCode::Ret),
            ],
        )],
    );

    run(&mut module)?;

    let instructions = &body(&module, 1).instructions;
    assert_eq!(instructions[1].opcode, OpCode::Stloc0);
    assert_eq!(instructions[2].opcode, OpCode::LdlocaS);
    assert_eq!(instructions[2].operand, Operand::Local(0));
    assert_eq!(instructions[4].opcode, OpCode::Ldloc0);

    Ok(())
}

/// Every local created for a field carries exactly the field's type.
#[test]
fn test_local_types_match_fields() -> Result<()> {
    let signatures = [
        TypeSignature::String,
        TypeSignature::SzArray(Box::new(TypeSignature::U1)),
        TypeSignature::ValueType(Token::new(0x0200_0010)),
        TypeSignature::Class(Token::new(0x0200_0011)),
    ];
    let globals: Vec<Field> = signatures
        .iter()
        .zip(1u32..)
        .map(|(sig, rid)| global(rid, &format!("f{rid}"), sig.clone()))
        .collect();
    let mut code: Vec<Instruction> = (1..=4)
        .map(|rid| Instruction::field(OpCode::Ldsfld, field_token(rid)))
        .collect();
    code.push(Instruction::simple(OpCode::Ret));
    let mut module = module_with(globals, vec![method(1, "M", code)]);

    let (pass, _) = run(&mut module)?;

    let locals = &body(&module, 1).locals;
    assert_eq!(locals.len(), 4);
    for (rid, sig) in (1u32..).zip(signatures.iter()) {
        let index = pass.binding(field_token(rid), method_token(1)).unwrap();
        assert_eq!(&locals[usize::from(index)].signature, sig);
    }
    assert_eq!(
        opcodes(&module, 1),
        vec![
            OpCode::Ldloc0,
            OpCode::Ldloc1,
            OpCode::Ldloc2,
            OpCode::Ldloc3,
            OpCode::Ret
        ]
    );

    Ok(())
}

/// Each method gets its own local; bindings are not shared across bodies.
#[test]
fn test_locals_are_per_method() -> Result<()> {
    let f = field_token(1);
    let mut existing = method(2, "B", vec![Instruction::field(OpCode::Ldsfld, f)]);
    if let Some(body) = existing.body.as_mut() {
        body.locals = vec![
            LocalVariable::new(TypeSignature::Boolean),
            LocalVariable::new(TypeSignature::Object),
        ];
    }
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::R8)],
        vec![
            method(1, "A", vec![Instruction::field(OpCode::Ldsfld, f)]),
            existing,
        ],
    );

    let (pass, events) = run(&mut module)?;

    assert_eq!(pass.binding(f, method_token(1)), Some(0));
    assert_eq!(pass.binding(f, method_token(2)), Some(2));
    assert_eq!(opcodes(&module, 1), vec![OpCode::Ldloc0]);
    assert_eq!(opcodes(&module, 2), vec![OpCode::Ldloc2]);
    assert_eq!(body(&module, 2).locals[2].signature, TypeSignature::R8);
    assert_eq!(events.count_kind(EventKind::LocalCreated), 2);

    Ok(())
}

/// Only converted candidates are removed; unreferenced ones stay.
#[test]
fn test_only_converted_fields_are_removed() -> Result<()> {
    let used = field_token(1);
    let unused = field_token(2);
    let mut module = module_with(
        vec![
            global(1, "used", TypeSignature::I4),
            global(2, "unused", TypeSignature::I4),
        ],
        vec![method(
            1,
            "M",
            vec![
                Instruction::field(OpCode::Ldsfld, used),
                Instruction::simple(OpCode::Ret),
            ],
        )],
    );

    let (pass, events) = run(&mut module)?;

    assert!(module.field(used).is_none());
    assert!(module.field(unused).is_some());
    assert_eq!(pass.converted_fields().len(), 1);
    assert_eq!(events.count_kind(EventKind::CandidateIdentified), 2);

    Ok(())
}

/// Finalizing a second time removes nothing more and records nothing.
#[test]
fn test_finalize_is_idempotent() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I4), global(2, "K", TypeSignature::I4)],
        vec![method(1, "M", vec![Instruction::field(OpCode::Ldsfld, f)])],
    );

    let (mut pass, events) = run(&mut module)?;
    let after_first = module.clone();
    pass.finalize(&mut module, &events)?;

    assert_eq!(module, after_first);
    assert_eq!(events.count_kind(EventKind::ArtifactRemoved), 1);
    assert_eq!(pass.summary().count(), 1);

    Ok(())
}

/// A second full run changes nothing, on the same instance and on a fresh one.
#[test]
fn test_second_run_is_a_no_op() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I4), global(2, "K", TypeSignature::I4)],
        vec![method(
            1,
            "M",
            vec![
                Instruction::field(OpCode::Stsfld, f),
                Instruction::field(OpCode::Ldsfld, f),
            ],
        )],
    );

    let (mut pass, events) = run(&mut module)?;
    let after_first = module.clone();
    assert_eq!(pass.rewrite_count(), 2);

    for token in module.type_tokens() {
        assert!(!pass.process(&mut module, token, &events)?);
    }
    pass.finalize(&mut module, &events)?;
    assert_eq!(pass.rewrite_count(), 2);
    assert_eq!(module, after_first);

    let (fresh, _) = run(&mut module)?;
    assert_eq!(fresh.rewrite_count(), 0);
    assert_eq!(module, after_first);

    Ok(())
}

/// The counter equals the number of rewritten instructions, and the summary can
/// be requested repeatedly.
#[test]
fn test_counter_matches_rewrites() -> Result<()> {
    let a = field_token(1);
    let b = field_token(2);
    let mut code = Vec::new();
    for _ in 0..3 {
        code.push(Instruction::field(OpCode::Ldsfld, a));
        code.push(Instruction::field(OpCode::Stsfld, b));
    }
    code.push(Instruction::simple(OpCode::Ret));
    let mut module = module_with(
        vec![global(1, "a", TypeSignature::I4), global(2, "b", TypeSignature::I4)],
        vec![method(1, "M", code)],
    );

    let (pass, events) = run(&mut module)?;

    assert_eq!(pass.rewrite_count(), 6);
    assert_eq!(events.count_kind(EventKind::AccessRewritten), 6);
    for _ in 0..2 {
        let messages: Vec<String> = pass.summary().map(|s| s.message).collect();
        assert_eq!(messages, vec!["Removed 6 local-to-field implementations"]);
    }

    Ok(())
}

/// Instance field opcodes naming a candidate keep their form but are counted.
#[test]
fn test_instance_opcodes_are_counted_but_kept() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I4)],
        vec![method(
            1,
            "M",
            vec![
                Instruction::simple(OpCode::Ldnull),
                Instruction::field(OpCode::Ldfld, f),
                Instruction::field(OpCode::Ldsfld, f),
                Instruction::simple(OpCode::Ret),
            ],
        )],
    );

    let (pass, events) = run(&mut module)?;

    let method_body = body(&module, 1);
    assert_eq!(method_body.instructions[1], Instruction::field(OpCode::Ldfld, f));
    assert_eq!(method_body.instructions[2].opcode, OpCode::Ldloc0);
    assert_eq!(method_body.locals.len(), 1);
    assert_eq!(pass.rewrite_count(), 2);
    assert_eq!(pass.binding(f, method_token(1)), Some(0));

    let messages: Vec<String> = pass.summary().map(|s| s.message).collect();
    assert_eq!(messages, vec!["Removed 2 local-to-field implementations"]);

    // The field goes with the others, the kept ldfld is reported
    assert!(module.field(f).is_none());
    assert_eq!(events.warnings().count(), 1);

    Ok(())
}

/// A field without resolvable type still converts, with a warning.
#[test]
fn test_unknown_field_type_warns() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::Unknown)],
        vec![method(1, "M", vec![Instruction::field(OpCode::Ldsfld, f)])],
    );

    let (pass, events) = run(&mut module)?;

    assert_eq!(pass.rewrite_count(), 1);
    assert!(body(&module, 1).locals[0].signature.is_unknown());
    assert_eq!(events.warnings().count(), 1);
    assert!(module.field(f).is_none());

    Ok(())
}

/// Bodies shrink after rewriting, so long branches become short ones.
#[test]
fn test_branches_shrink_after_rewrite() -> Result<()> {
    let f = field_token(1);
    let mut code = vec![Instruction::new(OpCode::Br, Operand::Target(31))?];
    for _ in 0..30 {
        code.push(Instruction::field(OpCode::Ldsfld, f));
    }
    code.push(Instruction::simple(OpCode::Ret));
    let mut module = module_with(
        vec![global(1, "F", TypeSignature::I4)],
        vec![method(1, "M", code)],
    );
    assert_eq!(body(&module, 1).code_size(), 5 + 30 * 5 + 1);

    run(&mut module)?;

    let rewritten = body(&module, 1);
    assert_eq!(rewritten.instructions[0].opcode, OpCode::BrS);
    assert_eq!(rewritten.instructions[0].operand, Operand::Target(31));
    assert_eq!(rewritten.code_size(), 2 + 30 + 1);

    Ok(())
}

/// A module without `<Module>` type has no candidates and stays unchanged.
#[test]
fn test_module_without_global_type() -> Result<()> {
    let mut module = Module::new("plain.dll");
    let mut program = TypeDef::new(Token::new(0x0200_0002), "Test", "Program");
    program
        .methods
        .push(method(1, "M", vec![Instruction::simple(OpCode::Ret)]));
    program.methods.push(Method::without_body(method_token(2), "Extern"));
    module.add_type(program);
    let before = module.clone();

    let (pass, events) = run(&mut module)?;

    assert_eq!(module, before);
    assert_eq!(pass.summary().count(), 0);
    assert!(events.is_empty());

    Ok(())
}

/// The `<Module>` type's own methods are processed like any other type.
#[test]
fn test_global_methods_are_rewritten() -> Result<()> {
    let f = field_token(1);
    let mut module = module_with(vec![global(1, "F", TypeSignature::Char)], Vec::new());
    module
        .type_mut(GLOBAL_TYPE)?
        .methods
        .push(method(5, ".cctor", vec![Instruction::field(OpCode::Ldsfld, f)]));

    let (pass, _) = run(&mut module)?;

    assert_eq!(opcodes(&module, 5), vec![OpCode::Ldloc0]);
    assert_eq!(pass.rewrite_count(), 1);

    Ok(())
}
