//! Dispatch between the fused fast path and the baseline semantics.

/// The reference multi-stage step semantics
pub mod baseline;

/// Fused single-step evaluators and their registration table
pub mod fast;

use tracing::{debug, trace};

use crate::{
    core::{
        machine::{GasMode, MachineState},
        opcodes::Instruction,
        schedule::Schedule,
    },
    error::Error,
    exec::fast::FastPathTable,
};

/// The observable outcome of one dispatched step. Returned by
/// [`Executor::step`] so callers can trace which strategy ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// The opcode that was executed.
    pub opcode: u8,
    /// Whether a fused rule handled the step (false: baseline).
    pub fast_path: bool,
    /// The gas amount charged for the step.
    pub gas_cost: u128,
    /// Whether the instruction terminated execution.
    pub halted: bool,
}

/// Summary of a completed execution driven by [`Executor::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Total instructions executed.
    pub steps: u64,
    /// Instructions handled by fused rules.
    pub fast_steps: u64,
    /// Instructions deferred to the baseline semantics.
    pub baseline_steps: u64,
    /// Gas left after execution completed.
    pub gas_remaining: u128,
}

/// The interpreter's step dispatcher.
///
/// Holds the fused-rule table, the resolved gas schedule and the gas mode
/// for one execution. The schedule is never mutated once execution begins.
/// Single-threaded: one executor drives exactly one [`MachineState`] at a
/// time, and each step runs to completion before the next is dispatched.
#[derive(Debug, Clone)]
pub struct Executor {
    /// The fused-rule registry consulted before every instruction.
    pub table: FastPathTable,

    /// The gas cost table for this execution's protocol version.
    pub schedule: Schedule,

    /// Whether gas is checked and deducted.
    pub mode: GasMode,

    /// Count of steps handled by fused rules.
    pub fast_steps: u64,

    /// Count of steps deferred to the baseline semantics.
    pub baseline_steps: u64,
}

impl Executor {
    /// Creates an executor with the built-in fused rules for the schedule's
    /// hard fork.
    pub fn new(schedule: Schedule, mode: GasMode) -> Executor {
        Executor::with_table(schedule, mode, FastPathTable::with_defaults(schedule.fork))
    }

    /// Creates an executor with an explicit fused-rule table. An empty table
    /// defers every instruction to the baseline semantics.
    pub fn with_table(schedule: Schedule, mode: GasMode, table: FastPathTable) -> Executor {
        Executor { table, schedule, mode, fast_steps: 0, baseline_steps: 0 }
    }

    /// Execute one instruction: apply the highest-priority applicable fused
    /// rule as a single atomic transition, or defer to the baseline staged
    /// semantics. No instruction is ever partially executed by both paths.
    ///
    /// A fused predicate returning false is not a failure; the baseline
    /// re-derives the same stack/gas/capacity checks and fails with the
    /// matching error if appropriate.
    pub fn step(
        &mut self,
        state: &mut MachineState,
        instruction: &Instruction,
    ) -> Result<StepInfo, Error> {
        if let Some(rule) =
            self.table.select(instruction, state, &self.schedule, self.mode).copied()
        {
            let pc = state.pc;
            let gas_cost = rule.apply(instruction, state, &self.schedule, self.mode)?;
            self.fast_steps += 1;
            trace!(pc, opcode = instruction.name(), ?gas_cost, "fused step");
            return Ok(StepInfo {
                opcode: instruction.opcode,
                fast_path: true,
                gas_cost,
                halted: false,
            });
        }

        let pc = state.pc;
        let outcome = baseline::step(state, instruction, &self.schedule, self.mode)?;
        self.baseline_steps += 1;
        trace!(pc, opcode = instruction.name(), gas_cost = ?outcome.gas_cost, "baseline step");
        Ok(StepInfo {
            opcode: instruction.opcode,
            fast_path: false,
            gas_cost: outcome.gas_cost,
            halted: outcome.halted,
        })
    }

    /// Drive the machine until STOP, the end of code (implicit STOP), or a
    /// terminal error. Cancellation between steps belongs to the caller.
    pub fn execute(&mut self, state: &mut MachineState) -> Result<ExecutionResult, Error> {
        while let Some(instruction) = Instruction::decode(&state.bytecode, state.pc) {
            let info = self.step(state, &instruction)?;
            if info.halted {
                break;
            }
        }

        let result = ExecutionResult {
            steps: self.fast_steps + self.baseline_steps,
            fast_steps: self.fast_steps,
            baseline_steps: self.baseline_steps,
            gas_remaining: state.gas_remaining,
        };
        debug!(
            steps = result.steps,
            fast_steps = result.fast_steps,
            baseline_steps = result.baseline_steps,
            gas_remaining = ?result.gas_remaining,
            "execution complete"
        );
        Ok(result)
    }
}
