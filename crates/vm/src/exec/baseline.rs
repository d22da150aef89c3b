//! The reference multi-stage step semantics.
//!
//! Every instruction executes through the canonical sequence: fetch the
//! opcode's static info, validate stack depth and post-effect capacity,
//! charge gas, apply the stack effect, advance the program counter. All
//! checks precede any mutation, so a failed step leaves the prior state
//! unchanged. The fused fast path must stay bit-for-bit equivalent to this
//! module for every opcode it covers.

use alloy::primitives::U256;

use crate::{
    core::{
        machine::{GasMode, MachineState},
        opcodes::{self, opcode_info, Instruction},
        schedule::{HardFork, Schedule},
        stack::STACK_LIMIT,
    },
    error::Error,
};

/// The observable outcome of one baseline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineOutcome {
    /// The gas amount charged for the step (computed even when unmetered).
    pub gas_cost: u128,
    /// Whether the instruction terminates execution (STOP).
    pub halted: bool,
}

/// Execute a single instruction through the staged reference semantics.
///
/// Check order on failure: stack underflow, then post-effect overflow, then
/// gas. Opcodes outside the representative set fail with
/// [`Error::UnsupportedOpcode`] before any validation.
pub fn step(
    state: &mut MachineState,
    instruction: &Instruction,
    schedule: &Schedule,
    mode: GasMode,
) -> Result<BaselineOutcome, Error> {
    // fetch
    let opcode = instruction.opcode;
    let info = opcode_info(opcode).ok_or(Error::UnsupportedOpcode(opcode))?;
    if opcode == opcodes::PUSH0 && !schedule.fork.is_active(HardFork::Shanghai) {
        return Err(Error::UnsupportedOpcode(opcode));
    }

    // validate
    let depth = state.stack.size();
    let inputs = info.inputs() as usize;
    if depth < inputs {
        return Err(Error::StackUnderflow);
    }
    let resulting = depth - inputs + info.outputs() as usize;
    if resulting > STACK_LIMIT {
        return Err(Error::StackOverflow { size: resulting });
    }

    // charge
    let gas_cost = schedule.cost(info.category());
    state.charge(gas_cost, mode)?;

    // mutate
    let pc = state.pc;
    match opcode {
        opcodes::STOP => {}

        opcodes::ADD => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a.overflowing_add(b).0)?;
        }

        opcodes::MUL => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a.overflowing_mul(b).0)?;
        }

        opcodes::SUB => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a.overflowing_sub(b).0)?;
        }

        opcodes::DIV => {
            let numerator = state.stack.pop()?;
            let denominator = state.stack.pop()?;
            let result =
                if denominator.is_zero() { U256::ZERO } else { numerator / denominator };
            state.stack.push(result)?;
        }

        opcodes::MOD => {
            let a = state.stack.pop()?;
            let modulus = state.stack.pop()?;
            let result = if modulus.is_zero() { U256::ZERO } else { a % modulus };
            state.stack.push(result)?;
        }

        opcodes::LT => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            push_boolean(state, a < b)?;
        }

        opcodes::GT => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            push_boolean(state, a > b)?;
        }

        opcodes::EQ => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            push_boolean(state, a == b)?;
        }

        opcodes::ISZERO => {
            let a = state.stack.pop()?;
            push_boolean(state, a.is_zero())?;
        }

        opcodes::AND => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a & b)?;
        }

        opcodes::OR => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a | b)?;
        }

        opcodes::XOR => {
            let a = state.stack.pop()?;
            let b = state.stack.pop()?;
            state.stack.push(a ^ b)?;
        }

        opcodes::NOT => {
            let a = state.stack.pop()?;
            state.stack.push(!a)?;
        }

        opcodes::POP => {
            state.stack.pop()?;
        }

        opcodes::PC => {
            state.stack.push(U256::from(pc))?;
        }

        opcodes::PUSH0 => {
            state.stack.push(U256::ZERO)?;
        }

        opcodes::PUSH1..=opcodes::PUSH32 => {
            let n = instruction.push_width();
            let value = state.read_immediate(pc + 1, n);
            state.stack.push(value)?;
        }

        opcodes::DUP1..=opcodes::DUP16 => {
            // depth validated above via the opcode's input arity
            let n = (opcode - opcodes::DUP1) as usize + 1;
            state.stack.dup(n)?;
        }

        opcodes::SWAP1..=opcodes::SWAP16 => {
            let n = (opcode - opcodes::SWAP1) as usize + 1;
            state.stack.swap(n)?;
        }

        _ => return Err(Error::UnsupportedOpcode(opcode)),
    }

    // advance
    state.pc += instruction.width();

    Ok(BaselineOutcome { gas_cost, halted: info.terminating() })
}

fn push_boolean(state: &mut MachineState, condition: bool) -> Result<(), Error> {
    let value = if condition { U256::from(1u8) } else { U256::ZERO };
    state.stack.push(value)
}
