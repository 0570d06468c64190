//! Shortest-encoding selection for decoded instruction lists.
//!
//! After a pass rewrites instructions in place, their opcodes are usually the
//! long canonical forms (`ldloc`, `stloc`, `ldc.i4`, `br`). [`optimize_macros`]
//! re-selects the most compact encoding with identical semantics:
//!
//! - `ldloc`/`stloc` with index 0..=3 become `ldloc.N`/`stloc.N`, indices up to
//!   255 use the `.s` form; `ldloca` only has a `.s` form
//! - `ldarg` mirrors `ldloc`; `starg`/`ldarga` only have `.s` forms
//! - `ldc.i4` becomes `ldc.i4.m1`/`ldc.i4.N`/`ldc.i4.s` where the value allows it
//! - long branches whose displacement fits a signed byte become short branches
//!
//! Short forms that no longer fit (for example after a local was renumbered) are
//! widened again, so the result is always encodable.

use crate::assembly::instruction::{Instruction, OpCode, Operand};

/// How an instruction touches a local or argument slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotAccess {
    LoadLocal,
    StoreLocal,
    LocalAddress,
    LoadArgument,
    StoreArgument,
    ArgumentAddress,
}

fn slot_access(instruction: &Instruction) -> Option<(SlotAccess, u16)> {
    let access = match instruction.opcode {
        OpCode::Ldloc0
        | OpCode::Ldloc1
        | OpCode::Ldloc2
        | OpCode::Ldloc3
        | OpCode::LdlocS
        | OpCode::Ldloc => SlotAccess::LoadLocal,
        OpCode::Stloc0
        | OpCode::Stloc1
        | OpCode::Stloc2
        | OpCode::Stloc3
        | OpCode::StlocS
        | OpCode::Stloc => SlotAccess::StoreLocal,
        OpCode::LdlocaS | OpCode::Ldloca => SlotAccess::LocalAddress,
        OpCode::Ldarg0
        | OpCode::Ldarg1
        | OpCode::Ldarg2
        | OpCode::Ldarg3
        | OpCode::LdargS
        | OpCode::Ldarg => SlotAccess::LoadArgument,
        OpCode::StargS | OpCode::Starg => SlotAccess::StoreArgument,
        OpCode::LdargaS | OpCode::Ldarga => SlotAccess::ArgumentAddress,
        _ => return None,
    };

    let index = match access {
        SlotAccess::LoadLocal | SlotAccess::StoreLocal | SlotAccess::LocalAddress => {
            instruction.local_index()?
        }
        _ => instruction.argument_index()?,
    };

    Some((access, index))
}

fn compact_slot(access: SlotAccess, index: u16) -> Instruction {
    const SHORT_MAX: u16 = u8::MAX as u16;

    let local = |opcode| Instruction {
        opcode,
        operand: Operand::Local(index),
    };
    let argument = |opcode| Instruction {
        opcode,
        operand: Operand::Argument(index),
    };

    match (access, index) {
        (SlotAccess::LoadLocal, 0) => Instruction::simple(OpCode::Ldloc0),
        (SlotAccess::LoadLocal, 1) => Instruction::simple(OpCode::Ldloc1),
        (SlotAccess::LoadLocal, 2) => Instruction::simple(OpCode::Ldloc2),
        (SlotAccess::LoadLocal, 3) => Instruction::simple(OpCode::Ldloc3),
        (SlotAccess::LoadLocal, i) if i <= SHORT_MAX => local(OpCode::LdlocS),
        (SlotAccess::LoadLocal, _) => local(OpCode::Ldloc),

        (SlotAccess::StoreLocal, 0) => Instruction::simple(OpCode::Stloc0),
        (SlotAccess::StoreLocal, 1) => Instruction::simple(OpCode::Stloc1),
        (SlotAccess::StoreLocal, 2) => Instruction::simple(OpCode::Stloc2),
        (SlotAccess::StoreLocal, 3) => Instruction::simple(OpCode::Stloc3),
        (SlotAccess::StoreLocal, i) if i <= SHORT_MAX => local(OpCode::StlocS),
        (SlotAccess::StoreLocal, _) => local(OpCode::Stloc),

        (SlotAccess::LocalAddress, i) if i <= SHORT_MAX => local(OpCode::LdlocaS),
        (SlotAccess::LocalAddress, _) => local(OpCode::Ldloca),

        (SlotAccess::LoadArgument, 0) => Instruction::simple(OpCode::Ldarg0),
        (SlotAccess::LoadArgument, 1) => Instruction::simple(OpCode::Ldarg1),
        (SlotAccess::LoadArgument, 2) => Instruction::simple(OpCode::Ldarg2),
        (SlotAccess::LoadArgument, 3) => Instruction::simple(OpCode::Ldarg3),
        (SlotAccess::LoadArgument, i) if i <= SHORT_MAX => argument(OpCode::LdargS),
        (SlotAccess::LoadArgument, _) => argument(OpCode::Ldarg),

        (SlotAccess::StoreArgument, i) if i <= SHORT_MAX => argument(OpCode::StargS),
        (SlotAccess::StoreArgument, _) => argument(OpCode::Starg),

        (SlotAccess::ArgumentAddress, i) if i <= SHORT_MAX => argument(OpCode::LdargaS),
        (SlotAccess::ArgumentAddress, _) => argument(OpCode::Ldarga),
    }
}

fn long_branch(opcode: OpCode) -> Option<OpCode> {
    match opcode {
        OpCode::BrS => Some(OpCode::Br),
        OpCode::BrfalseS => Some(OpCode::Brfalse),
        OpCode::BrtrueS => Some(OpCode::Brtrue),
        OpCode::BeqS => Some(OpCode::Beq),
        OpCode::BgeS => Some(OpCode::Bge),
        OpCode::BgtS => Some(OpCode::Bgt),
        OpCode::BleS => Some(OpCode::Ble),
        OpCode::BltS => Some(OpCode::Blt),
        OpCode::BneUnS => Some(OpCode::BneUn),
        _ => None,
    }
}

/// Byte offset of every instruction, plus the total code size as the last entry.
fn offsets(instructions: &[Instruction]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(instructions.len() + 1);
    let mut offset = 0;
    for instruction in instructions {
        offsets.push(offset);
        offset += instruction.size();
    }
    offsets.push(offset);
    offsets
}

/// Displacement of a branch at `index` to `target`, measured from the end of the
/// branch as it would be encoded with `opcode`.
fn displacement(offsets: &[usize], index: usize, target: usize, opcode: OpCode) -> Option<i64> {
    let start = i64::try_from(*offsets.get(index)?).ok()?;
    let target_offset = i64::try_from(*offsets.get(target)?).ok()?;
    let current_size = i64::try_from(offsets.get(index + 1)? - offsets.get(index)?).ok()?;
    let new_size = i64::try_from(opcode.size()).ok()?;

    // A forward target moves by the size difference of the branch itself
    let target_offset = if target > index {
        target_offset - current_size + new_size
    } else {
        target_offset
    };

    Some(target_offset - (start + new_size))
}

fn fits_short(value: i64) -> bool {
    i8::try_from(value).is_ok()
}

/// Widens short branches that no longer reach their target. Returns true if any changed.
fn widen_branches(instructions: &mut [Instruction]) -> bool {
    let mut changed = false;
    loop {
        let offsets = offsets(instructions);
        let mut widened = false;
        for index in 0..instructions.len() {
            let Some(target) = instructions[index].target() else {
                continue;
            };
            let Some(long) = long_branch(instructions[index].opcode) else {
                continue;
            };
            let current = instructions[index].opcode;
            if !displacement(&offsets, index, target, current).is_some_and(fits_short) {
                instructions[index].opcode = long;
                widened = true;
            }
        }
        if !widened {
            return changed;
        }
        changed = true;
    }
}

/// Shortens long branches whose displacement fits a signed byte. Returns true if any changed.
fn shorten_branches(instructions: &mut [Instruction]) -> bool {
    let mut changed = false;
    loop {
        let offsets = offsets(instructions);
        let mut shortened = false;
        for index in 0..instructions.len() {
            let Some(target) = instructions[index].target() else {
                continue;
            };
            let Some(short) = instructions[index].opcode.short_branch() else {
                continue;
            };
            // Shrinking other branches only brings targets closer, so a decision made
            // with stale offsets stays valid for the rest of the sweep
            if displacement(&offsets, index, target, short).is_some_and(fits_short) {
                instructions[index].opcode = short;
                shortened = true;
            }
        }
        if !shortened {
            return changed;
        }
        changed = true;
    }
}

/// Re-selects the most compact encoding of every instruction in `instructions`.
///
/// Returns the number of instructions whose encoding changed.
///
/// # Examples
///
/// ```rust
/// use unhoist::assembly::{optimize_macros, Instruction, OpCode, Operand};
///
/// let mut body = vec![
///     Instruction::new(OpCode::Stloc, Operand::Local(0))?,
///     Instruction::new(OpCode::Ldloc, Operand::Local(4))?,
///     Instruction::simple(OpCode::Ret),
/// ];
///
/// assert_eq!(optimize_macros(&mut body), 2);
/// assert_eq!(body[0].opcode, OpCode::Stloc0);
/// assert_eq!(body[1].opcode, OpCode::LdlocS);
/// # Ok::<(), unhoist::Error>(())
/// ```
pub fn optimize_macros(instructions: &mut [Instruction]) -> usize {
    let before: Vec<OpCode> = instructions.iter().map(|i| i.opcode).collect();

    for instruction in instructions.iter_mut() {
        if let Some((access, index)) = slot_access(instruction) {
            *instruction = compact_slot(access, index);
        } else if let Some(value) = instruction.ldc_i4_value() {
            *instruction = Instruction::ldc_i4(value);
        }
    }

    widen_branches(instructions);
    shorten_branches(instructions);

    before
        .iter()
        .zip(instructions.iter())
        .filter(|(old, new)| **old != new.opcode)
        .count()
}

/// Total encoded size of an instruction list in bytes.
#[must_use]
pub fn code_size(instructions: &[Instruction]) -> usize {
    instructions.iter().map(Instruction::size).sum()
}
