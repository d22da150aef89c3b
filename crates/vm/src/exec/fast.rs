//! Fused single-step evaluators and their registration table.
//!
//! Each fused rule collapses one opcode's fetch/validate/charge/mutate/advance
//! sequence into a single atomic transition. A rule only fires when its
//! applicability predicate holds; otherwise the instruction is deferred to the
//! baseline semantics, which re-derives the same checks and fails (or
//! succeeds) with the identical observable outcome.

use alloy::primitives::U256;
use hashbrown::HashMap;

use crate::{
    core::{
        machine::{GasMode, MachineState},
        opcodes::{self, Instruction},
        schedule::{GasCategory, HardFork, Schedule},
        stack::STACK_LIMIT,
    },
    error::Error,
};

/// The priority assigned to the built-in fused rules. Any rule registered
/// with a higher priority is consulted before these.
pub const DEFAULT_PRIORITY: u8 = 25;

/// The state transformation half of a fused rule.
///
/// Infallible once the rule's applicability predicate has held; the `Result`
/// is only there so effects can lean on the stack's checked API.
pub type Effect = fn(&Instruction, &mut MachineState) -> Result<(), Error>;

/// A fused single-step evaluator for one opcode.
#[derive(Debug, Clone, Copy)]
pub struct FastPath {
    /// Selection priority; higher wins when several rules share an opcode.
    pub priority: u8,
    /// Stack operand count required by the effect.
    pub inputs: usize,
    /// Stack words produced by the effect (operands included, as in the
    /// opcode info table).
    pub outputs: usize,
    /// The gas category charged for the step.
    pub category: GasCategory,
    /// The fused state transformation, including the pc advance.
    pub effect: Effect,
}

impl FastPath {
    /// The applicability predicate: sufficient stack depth, sufficient gas
    /// under the charge contract, and a post-effect stack size within the
    /// capacity bound. Side-effect free; mirrors the checks the baseline
    /// staged sequence performs for the same opcode.
    pub fn applies(&self, state: &MachineState, schedule: &Schedule, mode: GasMode) -> bool {
        let depth = state.stack.size();
        depth >= self.inputs &&
            depth - self.inputs + self.outputs <= STACK_LIMIT &&
            state.affordable(schedule.cost(self.category), mode)
    }

    /// Charge and apply the effect as one indivisible unit, returning the
    /// gas charged. Callers must have checked [`FastPath::applies`] first.
    pub fn apply(
        &self,
        instruction: &Instruction,
        state: &mut MachineState,
        schedule: &Schedule,
        mode: GasMode,
    ) -> Result<u128, Error> {
        let cost = schedule.cost(self.category);
        state.charge(cost, mode)?;
        (self.effect)(instruction, state)?;
        Ok(cost)
    }
}

/// The fused-rule registry consulted by the dispatcher.
///
/// Rules are keyed per opcode and kept sorted by descending priority. The
/// built-in registration is opcode-exclusive, so priorities never tie-break
/// at runtime, but external bootstrap code may register competing rules.
#[derive(Debug, Clone, Default)]
pub struct FastPathTable {
    rules: HashMap<u8, Vec<FastPath>>,
}

impl FastPathTable {
    /// Creates an empty table. A dispatcher built on an empty table defers
    /// every instruction to the baseline semantics.
    pub fn new() -> FastPathTable {
        FastPathTable { rules: HashMap::new() }
    }

    /// Creates a table holding the built-in fused rules: PUSH0 (Shanghai
    /// onwards), PUSH1..PUSH32, DUP1..DUP16, SWAP1..SWAP16, ADD, SUB, AND,
    /// LT and GT.
    pub fn with_defaults(fork: HardFork) -> FastPathTable {
        let mut table = FastPathTable::new();

        if fork.is_active(HardFork::Shanghai) {
            table.register(
                opcodes::PUSH0,
                FastPath {
                    priority: DEFAULT_PRIORITY,
                    inputs: 0,
                    outputs: 1,
                    category: GasCategory::Base,
                    effect: push_zero,
                },
            );
        }

        for opcode in opcodes::PUSH1..=opcodes::PUSH32 {
            table.register(
                opcode,
                FastPath {
                    priority: DEFAULT_PRIORITY,
                    inputs: 0,
                    outputs: 1,
                    category: GasCategory::VeryLow,
                    effect: push_immediate,
                },
            );
        }

        for (i, opcode) in (opcodes::DUP1..=opcodes::DUP16).enumerate() {
            table.register(
                opcode,
                FastPath {
                    priority: DEFAULT_PRIORITY,
                    inputs: i + 1,
                    outputs: i + 2,
                    category: GasCategory::VeryLow,
                    effect: dup,
                },
            );
        }

        for (i, opcode) in (opcodes::SWAP1..=opcodes::SWAP16).enumerate() {
            table.register(
                opcode,
                FastPath {
                    priority: DEFAULT_PRIORITY,
                    inputs: i + 2,
                    outputs: i + 2,
                    category: GasCategory::VeryLow,
                    effect: swap,
                },
            );
        }

        for (opcode, effect) in [
            (opcodes::ADD, add as Effect),
            (opcodes::SUB, sub as Effect),
            (opcodes::AND, and as Effect),
            (opcodes::LT, lt as Effect),
            (opcodes::GT, gt as Effect),
        ] {
            table.register(
                opcode,
                FastPath {
                    priority: DEFAULT_PRIORITY,
                    inputs: 2,
                    outputs: 1,
                    category: GasCategory::VeryLow,
                    effect,
                },
            );
        }

        table
    }

    /// Register a fused rule for an opcode, keeping the per-opcode rule list
    /// sorted by descending priority. Consumed at interpreter-construction
    /// time only, never during execution.
    pub fn register(&mut self, opcode: u8, rule: FastPath) {
        let rules = self.rules.entry(opcode).or_default();
        let at = rules.iter().position(|r| r.priority < rule.priority).unwrap_or(rules.len());
        rules.insert(at, rule);
    }

    /// The registered rules for an opcode, highest priority first.
    pub fn rules_for(&self, opcode: u8) -> &[FastPath] {
        self.rules.get(&opcode).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Select the highest-priority rule for the instruction whose
    /// applicability predicate holds, if any. Returning `None` is not a
    /// failure, only a deferral to the baseline semantics.
    pub fn select(
        &self,
        instruction: &Instruction,
        state: &MachineState,
        schedule: &Schedule,
        mode: GasMode,
    ) -> Option<&FastPath> {
        self.rules
            .get(&instruction.opcode)?
            .iter()
            .find(|rule| rule.applies(state, schedule, mode))
    }
}

fn push_zero(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    state.stack.push(U256::ZERO)?;
    state.pc += 1;
    Ok(())
}

fn push_immediate(instruction: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let n = instruction.push_width();
    let value = state.read_immediate(state.pc + 1, n);
    state.stack.push(value)?;
    state.pc += 1 + n;
    Ok(())
}

fn dup(instruction: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let n = instruction.dup_depth().ok_or(Error::UnsupportedOpcode(instruction.opcode))?;
    state.stack.dup(n)?;
    state.pc += 1;
    Ok(())
}

fn swap(instruction: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let n = instruction.swap_depth().ok_or(Error::UnsupportedOpcode(instruction.opcode))?;
    state.stack.swap(n)?;
    state.pc += 1;
    Ok(())
}

fn add(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.overflowing_add(b).0)?;
    state.pc += 1;
    Ok(())
}

fn sub(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a.overflowing_sub(b).0)?;
    state.pc += 1;
    Ok(())
}

fn and(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(a & b)?;
    state.pc += 1;
    Ok(())
}

fn lt(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(bool_to_word(a < b))?;
    state.pc += 1;
    Ok(())
}

fn gt(_: &Instruction, state: &mut MachineState) -> Result<(), Error> {
    let a = state.stack.pop()?;
    let b = state.stack.pop()?;
    state.stack.push(bool_to_word(a > b))?;
    state.pc += 1;
    Ok(())
}

#[inline]
fn bool_to_word(condition: bool) -> U256 {
    if condition {
        U256::from(1u8)
    } else {
        U256::ZERO
    }
}
