//! CIL opcode byte constants (ECMA-335).
//!
//! Raw byte values for the opcodes the instruction model understands. Single-byte
//! opcodes are named after their mnemonic (e.g. [`CALL`] = `0x28`). Two-byte
//! opcodes that use the `0xFE` prefix have their second byte stored with an
//! `FE_` prefix (e.g. [`FE_CEQ`] = `0x01` for the `ceq` instruction `0xFE 0x01`).
//!
//! The [`FE_PREFIX`] constant holds the shared first byte `0xFE`.
#![allow(missing_docs)]

// ── Single-byte opcodes ─────────────────────────────────────────────────────

// Misc
pub const NOP: u8 = 0x00;

// Load argument shorthand
pub const LDARG_0: u8 = 0x02;
pub const LDARG_1: u8 = 0x03;
pub const LDARG_2: u8 = 0x04;
pub const LDARG_3: u8 = 0x05;

// Load/store local shorthand
pub const LDLOC_0: u8 = 0x06;
pub const LDLOC_1: u8 = 0x07;
pub const LDLOC_2: u8 = 0x08;
pub const LDLOC_3: u8 = 0x09;
pub const STLOC_0: u8 = 0x0A;
pub const STLOC_1: u8 = 0x0B;
pub const STLOC_2: u8 = 0x0C;
pub const STLOC_3: u8 = 0x0D;

// Load/store argument/local (short form)
pub const LDARG_S: u8 = 0x0E;
pub const LDARGA_S: u8 = 0x0F;
pub const STARG_S: u8 = 0x10;
pub const LDLOC_S: u8 = 0x11;
pub const LDLOCA_S: u8 = 0x12;
pub const STLOC_S: u8 = 0x13;

// Null / constant loaders
pub const LDNULL: u8 = 0x14;
pub const LDC_I4_M1: u8 = 0x15;
pub const LDC_I4_0: u8 = 0x16;
pub const LDC_I4_1: u8 = 0x17;
pub const LDC_I4_2: u8 = 0x18;
pub const LDC_I4_3: u8 = 0x19;
pub const LDC_I4_4: u8 = 0x1A;
pub const LDC_I4_5: u8 = 0x1B;
pub const LDC_I4_6: u8 = 0x1C;
pub const LDC_I4_7: u8 = 0x1D;
pub const LDC_I4_8: u8 = 0x1E;
pub const LDC_I4_S: u8 = 0x1F;
pub const LDC_I4: u8 = 0x20;
pub const LDC_I8: u8 = 0x21;
pub const LDC_R8: u8 = 0x23;

// Stack manipulation
pub const DUP: u8 = 0x25;
pub const POP: u8 = 0x26;

// Call / return
pub const CALL: u8 = 0x28;
pub const RET: u8 = 0x2A;

// Branch (short form)
pub const BR_S: u8 = 0x2B;
pub const BRFALSE_S: u8 = 0x2C;
pub const BRTRUE_S: u8 = 0x2D;
pub const BEQ_S: u8 = 0x2E;
pub const BGE_S: u8 = 0x2F;
pub const BGT_S: u8 = 0x30;
pub const BLE_S: u8 = 0x31;
pub const BLT_S: u8 = 0x32;
pub const BNE_UN_S: u8 = 0x33;

// Branch (long form)
pub const BR: u8 = 0x38;
pub const BRFALSE: u8 = 0x39;
pub const BRTRUE: u8 = 0x3A;
pub const BEQ: u8 = 0x3B;
pub const BGE: u8 = 0x3C;
pub const BGT: u8 = 0x3D;
pub const BLE: u8 = 0x3E;
pub const BLT: u8 = 0x3F;
pub const BNE_UN: u8 = 0x40;

// Indirect load / store
pub const LDIND_I4: u8 = 0x4A;
pub const STIND_I4: u8 = 0x54;

// Arithmetic
pub const ADD: u8 = 0x58;
pub const SUB: u8 = 0x59;
pub const MUL: u8 = 0x5A;
pub const DIV: u8 = 0x5B;
pub const REM: u8 = 0x5D;

// Bitwise / logical
pub const AND: u8 = 0x5F;
pub const OR: u8 = 0x60;
pub const XOR: u8 = 0x61;

// Conversion
pub const CONV_I4: u8 = 0x69;

// Virtual call / object model
pub const CALLVIRT: u8 = 0x6F;
pub const LDSTR: u8 = 0x72;
pub const NEWOBJ: u8 = 0x73;

// Exception
pub const THROW: u8 = 0x7A;

// Field access
pub const LDFLD: u8 = 0x7B;
pub const LDFLDA: u8 = 0x7C;
pub const STFLD: u8 = 0x7D;
pub const LDSFLD: u8 = 0x7E;
pub const LDSFLDA: u8 = 0x7F;
pub const STSFLD: u8 = 0x80;

// Token
pub const LDTOKEN: u8 = 0xD0;

// ── Two-byte opcodes (0xFE prefix) ─────────────────────────────────────────
//
// The first byte is always FE_PREFIX; the constants below are the second byte.
pub const FE_PREFIX: u8 = 0xFE;
pub const FE_CEQ: u8 = 0x01;
pub const FE_CGT: u8 = 0x02;
pub const FE_CLT: u8 = 0x04;
pub const FE_LDARG: u8 = 0x09;
pub const FE_LDARGA: u8 = 0x0A;
pub const FE_STARG: u8 = 0x0B;
pub const FE_LDLOC: u8 = 0x0C;
pub const FE_LDLOCA: u8 = 0x0D;
pub const FE_STLOC: u8 = 0x0E;
