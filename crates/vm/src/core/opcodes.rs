//! Opcode constants and static opcode information.
//!
//! The representative instruction set covered by this core: pure stack and
//! arithmetic operations. Opcodes outside this table are rejected by the
//! baseline semantics with [`Error::UnsupportedOpcode`](crate::Error).

use super::schedule::GasCategory;

/// Information about an opcode: name, stack arity, gas category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpCodeInfo {
    /// Name
    name: &'static str,
    /// Stack inputs.
    inputs: u8,
    /// Stack outputs.
    outputs: u8,
    /// If the opcode stops execution. aka STOP, RETURN, ..
    terminating: bool,
    /// The gas category charged for the opcode, resolved against a
    /// [`Schedule`](crate::core::schedule::Schedule) at execution time.
    category: GasCategory,
}

impl OpCodeInfo {
    /// Creates a new opcode info with the given name and default values.
    pub const fn new(name: &'static str) -> Self {
        Self { name, inputs: 0, outputs: 0, terminating: false, category: GasCategory::Zero }
    }

    /// Returns the name of the opcode.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of stack inputs.
    #[inline]
    pub const fn inputs(&self) -> u8 {
        self.inputs
    }

    /// Returns the number of stack outputs.
    #[inline]
    pub const fn outputs(&self) -> u8 {
        self.outputs
    }

    /// Returns whether the opcode is terminating.
    #[inline]
    pub const fn terminating(&self) -> bool {
        self.terminating
    }

    /// Returns the gas category of the opcode.
    #[inline]
    pub const fn category(&self) -> GasCategory {
        self.category
    }
}

/// Sets the number of stack inputs and outputs.
#[inline]
pub const fn stack_io(mut op: OpCodeInfo, inputs: u8, outputs: u8) -> OpCodeInfo {
    op.inputs = inputs;
    op.outputs = outputs;
    op
}

/// Sets the terminating flag to true.
#[inline]
pub const fn terminating(mut op: OpCodeInfo) -> OpCodeInfo {
    op.terminating = true;
    op
}

/// Sets the gas category charged for the opcode.
#[inline]
pub const fn gas(mut op: OpCodeInfo, category: GasCategory) -> OpCodeInfo {
    op.category = category;
    op
}

macro_rules! opcodes {
    ($($val:literal => $name:ident => $($modifier:ident $(( $($modifier_arg:expr),* ))?),*);* $(;)?) => {
        // create a constant for each opcode
        $(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name),"\") opcode.")]
            pub const $name: u8 = $val;
        )*

        /// Maps each opcode to its info. `None` for opcodes outside the
        /// representative set.
        pub const OPCODE_INFO_TABLE: [Option<OpCodeInfo>; 256] = {
            let mut map = [None; 256];
            let mut prev: u8 = 0;
            $(
                let val: u8 = $val;
                assert!(val == 0 || val > prev, "opcodes must be sorted in ascending order");
                prev = val;
                let info = OpCodeInfo::new(
                    stringify!($name)
                );
                $(
                let info = $modifier(info, $($($modifier_arg),*)?);
                )*
                map[$val] = Some(info);
            )*
            let _ = prev;
            map
        };

        /// Maps each opcode to its name. (So we dont need to load [`OpCodeInfo`] to get the name)
        pub const OPCODE_NAME_TABLE: [&'static str; 256] = {
            let mut map = ["unknown"; 256];
            $(
                map[$val] = stringify!($name);
            )*
            map
        };
    }
}

/// Get the name of an opcode.
#[inline]
pub fn opcode_name(opcode: u8) -> &'static str {
    OPCODE_NAME_TABLE[opcode as usize]
}

/// Get the static info for an opcode, if it is part of the representative set.
#[inline]
pub fn opcode_info(opcode: u8) -> Option<OpCodeInfo> {
    OPCODE_INFO_TABLE[opcode as usize]
}

opcodes! {
    0x00 => STOP => terminating;

    0x01 => ADD => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x02 => MUL => stack_io(2, 1), gas(GasCategory::Low);
    0x03 => SUB => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x04 => DIV => stack_io(2, 1), gas(GasCategory::Low);
    0x06 => MOD => stack_io(2, 1), gas(GasCategory::Low);

    0x10 => LT => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x11 => GT => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x14 => EQ => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x15 => ISZERO => stack_io(1, 1), gas(GasCategory::VeryLow);
    0x16 => AND => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x17 => OR => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x18 => XOR => stack_io(2, 1), gas(GasCategory::VeryLow);
    0x19 => NOT => stack_io(1, 1), gas(GasCategory::VeryLow);

    0x50 => POP => stack_io(1, 0), gas(GasCategory::Base);
    0x58 => PC => stack_io(0, 1), gas(GasCategory::Base);

    0x5f => PUSH0 => stack_io(0, 1), gas(GasCategory::Base);
    0x60 => PUSH1 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x61 => PUSH2 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x62 => PUSH3 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x63 => PUSH4 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x64 => PUSH5 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x65 => PUSH6 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x66 => PUSH7 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x67 => PUSH8 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x68 => PUSH9 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x69 => PUSH10 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6a => PUSH11 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6b => PUSH12 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6c => PUSH13 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6d => PUSH14 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6e => PUSH15 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x6f => PUSH16 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x70 => PUSH17 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x71 => PUSH18 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x72 => PUSH19 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x73 => PUSH20 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x74 => PUSH21 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x75 => PUSH22 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x76 => PUSH23 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x77 => PUSH24 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x78 => PUSH25 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x79 => PUSH26 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7a => PUSH27 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7b => PUSH28 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7c => PUSH29 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7d => PUSH30 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7e => PUSH31 => stack_io(0, 1), gas(GasCategory::VeryLow);
    0x7f => PUSH32 => stack_io(0, 1), gas(GasCategory::VeryLow);

    0x80 => DUP1 => stack_io(1, 2), gas(GasCategory::VeryLow);
    0x81 => DUP2 => stack_io(2, 3), gas(GasCategory::VeryLow);
    0x82 => DUP3 => stack_io(3, 4), gas(GasCategory::VeryLow);
    0x83 => DUP4 => stack_io(4, 5), gas(GasCategory::VeryLow);
    0x84 => DUP5 => stack_io(5, 6), gas(GasCategory::VeryLow);
    0x85 => DUP6 => stack_io(6, 7), gas(GasCategory::VeryLow);
    0x86 => DUP7 => stack_io(7, 8), gas(GasCategory::VeryLow);
    0x87 => DUP8 => stack_io(8, 9), gas(GasCategory::VeryLow);
    0x88 => DUP9 => stack_io(9, 10), gas(GasCategory::VeryLow);
    0x89 => DUP10 => stack_io(10, 11), gas(GasCategory::VeryLow);
    0x8a => DUP11 => stack_io(11, 12), gas(GasCategory::VeryLow);
    0x8b => DUP12 => stack_io(12, 13), gas(GasCategory::VeryLow);
    0x8c => DUP13 => stack_io(13, 14), gas(GasCategory::VeryLow);
    0x8d => DUP14 => stack_io(14, 15), gas(GasCategory::VeryLow);
    0x8e => DUP15 => stack_io(15, 16), gas(GasCategory::VeryLow);
    0x8f => DUP16 => stack_io(16, 17), gas(GasCategory::VeryLow);

    0x90 => SWAP1 => stack_io(2, 2), gas(GasCategory::VeryLow);
    0x91 => SWAP2 => stack_io(3, 3), gas(GasCategory::VeryLow);
    0x92 => SWAP3 => stack_io(4, 4), gas(GasCategory::VeryLow);
    0x93 => SWAP4 => stack_io(5, 5), gas(GasCategory::VeryLow);
    0x94 => SWAP5 => stack_io(6, 6), gas(GasCategory::VeryLow);
    0x95 => SWAP6 => stack_io(7, 7), gas(GasCategory::VeryLow);
    0x96 => SWAP7 => stack_io(8, 8), gas(GasCategory::VeryLow);
    0x97 => SWAP8 => stack_io(9, 9), gas(GasCategory::VeryLow);
    0x98 => SWAP9 => stack_io(10, 10), gas(GasCategory::VeryLow);
    0x99 => SWAP10 => stack_io(11, 11), gas(GasCategory::VeryLow);
    0x9a => SWAP11 => stack_io(12, 12), gas(GasCategory::VeryLow);
    0x9b => SWAP12 => stack_io(13, 13), gas(GasCategory::VeryLow);
    0x9c => SWAP13 => stack_io(14, 14), gas(GasCategory::VeryLow);
    0x9d => SWAP14 => stack_io(15, 15), gas(GasCategory::VeryLow);
    0x9e => SWAP15 => stack_io(16, 16), gas(GasCategory::VeryLow);
    0x9f => SWAP16 => stack_io(17, 17), gas(GasCategory::VeryLow);
}

/// A single decoded instruction from the bytecode stream.
///
/// Produced by [`Instruction::decode`] (or an external decoder) and consumed
/// read-only by both execution paths. Push immediates stay in the program;
/// evaluators read them through
/// [`MachineState::bytecode`](crate::core::machine::MachineState) at effect
/// time, so the decoded form is just the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode value of the instruction.
    pub opcode: u8,
}

impl Instruction {
    /// Decode the instruction at `pc`. Returns `None` past the end of code,
    /// which the execute loop treats as an implicit STOP.
    pub fn decode(bytecode: &[u8], pc: usize) -> Option<Instruction> {
        bytecode.get(pc).map(|opcode| Instruction { opcode: *opcode })
    }

    /// The name of the instruction's opcode.
    #[inline]
    pub fn name(&self) -> &'static str {
        opcode_name(self.opcode)
    }

    /// The number of immediate operand bytes following the opcode.
    /// Nonzero only for PUSH1..PUSH32.
    #[inline]
    pub const fn push_width(&self) -> usize {
        if self.opcode >= PUSH1 && self.opcode <= PUSH32 {
            (self.opcode - PUSH0) as usize
        } else {
            0
        }
    }

    /// The full width of the instruction in bytes: the opcode byte plus any
    /// immediate operand bytes. The program counter advances by exactly this
    /// amount on a successful step.
    #[inline]
    pub const fn width(&self) -> usize {
        1 + self.push_width()
    }

    /// The one-indexed depth duplicated by DUP1..DUP16, or `None`.
    #[inline]
    pub const fn dup_depth(&self) -> Option<usize> {
        if self.opcode >= DUP1 && self.opcode <= DUP16 {
            Some((self.opcode - DUP1) as usize + 1)
        } else {
            None
        }
    }

    /// The one-indexed depth exchanged with the top by SWAP1..SWAP16, or `None`.
    #[inline]
    pub const fn swap_depth(&self) -> Option<usize> {
        if self.opcode >= SWAP1 && self.opcode <= SWAP16 {
            Some((self.opcode - SWAP1) as usize + 1)
        } else {
            None
        }
    }
}
