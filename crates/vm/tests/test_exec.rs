//! Integration tests for the fused/baseline dispatch core: the two
//! strategies must be indistinguishable for every covered opcode and
//! pre-state.

use alloy::primitives::U256;
use fusevm_vm::{
    core::{
        machine::{GasMode, MachineState},
        opcodes::{self, Instruction},
        schedule::{HardFork, Schedule},
    },
    exec::{baseline, fast::FastPath, Executor},
    Error,
};

fn schedule() -> Schedule {
    Schedule::for_fork(HardFork::Latest)
}

/// Builds a machine state with the given words pushed bottom-to-top.
fn state_with_stack(bytecode: &[u8], gas: u128, words: &[U256]) -> MachineState {
    let mut state = MachineState::new(bytecode, gas);
    for word in words {
        state.stack.push(*word).expect("test stack within capacity");
    }
    state
}

/// Asserts that executing `bytecode[0]` via the fused path produces a machine
/// state bit-identical to the baseline staged semantics on the same
/// pre-state, and that the fused path was actually taken.
fn assert_equivalent(bytecode: &[u8], gas: u128, words: &[U256], mode: GasMode) {
    let pre = state_with_stack(bytecode, gas, words);
    let instruction = Instruction::decode(bytecode, 0).expect("bytecode not empty");

    let mut via_fast = pre.clone();
    let mut executor = Executor::new(schedule(), mode);
    let info = executor.step(&mut via_fast, &instruction).expect("fused step failed");
    assert!(info.fast_path, "expected {} to take the fast path", instruction.name());
    assert_eq!(executor.fast_steps, 1);
    assert_eq!(executor.baseline_steps, 0);

    let mut via_baseline = pre.clone();
    let outcome =
        baseline::step(&mut via_baseline, &instruction, &schedule(), mode).expect("baseline failed");

    assert_eq!(via_fast, via_baseline, "state diverged for {}", instruction.name());
    assert_eq!(info.gas_cost, outcome.gas_cost, "gas diverged for {}", instruction.name());
    assert_eq!(via_fast.stack.hash(), via_baseline.stack.hash());
}

#[test]
fn test_equivalence_push() {
    assert_equivalent(&[opcodes::PUSH0], 100, &[], GasMode::Metered);
    assert_equivalent(&[opcodes::PUSH1, 0x2a], 100, &[], GasMode::Metered);
    assert_equivalent(
        &[
            opcodes::PUSH32, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        ],
        100,
        &[],
        GasMode::Metered,
    );
    // truncated immediate, zero-padded past the end of code
    assert_equivalent(&[opcodes::PUSH2, 0x2a], 100, &[], GasMode::Metered);
    assert_equivalent(&[opcodes::PUSH0], 0, &[], GasMode::Unmetered);
}

#[test]
fn test_equivalence_dup_swap() {
    let sixteen = (1..=16).map(U256::from).collect::<Vec<U256>>();
    let seventeen = (1..=17).map(U256::from).collect::<Vec<U256>>();

    assert_equivalent(&[opcodes::DUP1], 100, &[U256::from(7)], GasMode::Metered);
    assert_equivalent(&[opcodes::DUP16], 100, &sixteen, GasMode::Metered);
    assert_equivalent(
        &[opcodes::SWAP1],
        100,
        &[U256::from(1), U256::from(2)],
        GasMode::Metered,
    );
    assert_equivalent(&[opcodes::SWAP16], 100, &seventeen, GasMode::Metered);
}

#[test]
fn test_equivalence_arithmetic_and_logic() {
    let pairs = [
        [U256::from(3), U256::from(7)],
        [U256::from(7), U256::from(3)],
        [U256::MAX, U256::from(2)],
        [U256::ZERO, U256::ZERO],
        [U256::from(0xf0f0u32), U256::from(0x0ff0u32)],
    ];
    for opcode in [opcodes::ADD, opcodes::SUB, opcodes::AND, opcodes::LT, opcodes::GT] {
        for pair in &pairs {
            assert_equivalent(&[opcode], 100, pair, GasMode::Metered);
            assert_equivalent(&[opcode], 0, pair, GasMode::Unmetered);
        }
    }
}

#[test]
fn test_scenario_pushzero_exact_gas() {
    // stack [], gas 2, metered, PUSH0: succeeds, stack [0], gas 0, pc+1
    let mut state = MachineState::new(&[opcodes::PUSH0], 2);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    let info =
        executor.step(&mut state, &Instruction { opcode: opcodes::PUSH0 }).expect("step failed");
    assert!(info.fast_path);
    assert_eq!(info.gas_cost, 2);
    assert_eq!(state.gas_remaining, 0);
    assert_eq!(state.pc, 1);
    assert_eq!(state.stack.size(), 1);
    assert_eq!(state.stack.peek(0).unwrap(), U256::ZERO);
}

#[test]
fn test_scenario_pushzero_out_of_gas() {
    // stack [], gas 1, metered, PUSH0: fails OutOfGas, state unchanged
    let mut state = MachineState::new(&[opcodes::PUSH0], 1);
    let before = state.clone();
    let mut executor = Executor::new(schedule(), GasMode::Metered);

    let result = executor.step(&mut state, &Instruction { opcode: opcodes::PUSH0 });
    assert_eq!(result, Err(Error::OutOfGas { needed: 2, remaining: 1 }));
    assert_eq!(state, before);
    // the fused predicate was false, so the failure came from the baseline
    assert_eq!(executor.fast_steps, 0);
}

#[test]
fn test_scenario_pushzero_stack_overflow() {
    // full stack, gas sufficient, PUSH0: fails StackOverflow, state unchanged
    let words = (0..1024).map(U256::from).collect::<Vec<U256>>();
    let mut state = state_with_stack(&[opcodes::PUSH0], 1_000, &words);
    let before = state.clone();
    let mut executor = Executor::new(schedule(), GasMode::Metered);

    let result = executor.step(&mut state, &Instruction { opcode: opcodes::PUSH0 });
    assert_eq!(result, Err(Error::StackOverflow { size: 1025 }));
    assert_eq!(state, before);
    assert_eq!(executor.fast_steps, 0);
}

#[test]
fn test_scenario_swap() {
    // stack [5, 10] (top = 5), SWAP1: stack [10, 5], pc+1, gas -3
    let mut state =
        state_with_stack(&[opcodes::SWAP1], 100, &[U256::from(10), U256::from(5)]);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.step(&mut state, &Instruction { opcode: opcodes::SWAP1 }).expect("step failed");
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(10));
    assert_eq!(state.stack.peek(1).unwrap(), U256::from(5));
    assert_eq!(state.pc, 1);
    assert_eq!(state.gas_remaining, 97);
}

#[test]
fn test_scenario_add_wraps() {
    // stack [2^256-1, 2], ADD: stack [1]
    let mut state = state_with_stack(&[opcodes::ADD], 100, &[U256::from(2), U256::MAX]);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.step(&mut state, &Instruction { opcode: opcodes::ADD }).expect("step failed");
    assert_eq!(state.stack.size(), 1);
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(1));
}

#[test]
fn test_scenario_lt_gt_duality() {
    // stack [3, 7] (top = 3): LT pops a=3, b=7, pushes 1; GT pushes 0
    let words = [U256::from(7), U256::from(3)];

    let mut state = state_with_stack(&[opcodes::LT], 100, &words);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.step(&mut state, &Instruction { opcode: opcodes::LT }).expect("step failed");
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(1));

    let mut state = state_with_stack(&[opcodes::GT], 100, &words);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.step(&mut state, &Instruction { opcode: opcodes::GT }).expect("step failed");
    assert_eq!(state.stack.peek(0).unwrap(), U256::ZERO);
}

#[test]
fn test_sub_wraps() {
    // 5 - 15 wraps mod 2^256
    let mut state = state_with_stack(&[opcodes::SUB], 100, &[U256::from(15), U256::from(5)]);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.step(&mut state, &Instruction { opcode: opcodes::SUB }).expect("step failed");
    assert_eq!(state.stack.peek(0).unwrap(), U256::MAX - U256::from(9));
}

#[test]
fn test_conservativity_by_counter() {
    // MUL has no fused rule: baseline runs, counters show it
    let mut state = state_with_stack(&[opcodes::MUL], 100, &[U256::from(3), U256::from(4)]);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    let info =
        executor.step(&mut state, &Instruction { opcode: opcodes::MUL }).expect("step failed");
    assert!(!info.fast_path);
    assert_eq!(executor.fast_steps, 0);
    assert_eq!(executor.baseline_steps, 1);
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(12));
}

#[test]
fn test_whole_program_fast_matches_baseline_only() {
    #[rustfmt::skip]
    let bytecode = [
        opcodes::PUSH1, 0x05,
        opcodes::PUSH1, 0x0a,
        opcodes::DUP2,
        opcodes::ADD,
        opcodes::SWAP1,
        opcodes::SUB,
        opcodes::PUSH1, 0x00,
        opcodes::LT,
        opcodes::STOP,
    ];

    let mut fast_state = MachineState::new(&bytecode, 1_000);
    let mut fast_executor = Executor::new(schedule(), GasMode::Metered);
    let fast_result = fast_executor.execute(&mut fast_state).expect("fused execution failed");

    let mut slow_state = MachineState::new(&bytecode, 1_000);
    let mut slow_executor = Executor::with_table(
        schedule(),
        GasMode::Metered,
        fusevm_vm::exec::fast::FastPathTable::new(),
    );
    let slow_result = slow_executor.execute(&mut slow_state).expect("baseline execution failed");

    assert_eq!(fast_state, slow_state);
    assert_eq!(fast_result.gas_remaining, slow_result.gas_remaining);
    assert_eq!(fast_result.steps, slow_result.steps);

    // 8 fusable instructions plus STOP on the baseline
    assert_eq!(fast_result.fast_steps, 8);
    assert_eq!(fast_result.baseline_steps, 1);
    assert_eq!(slow_result.fast_steps, 0);

    // 8 verylow instructions at 3 gas each, STOP free
    assert_eq!(fast_state.gas_remaining, 1_000 - 24);
    assert_eq!(fast_state.stack.size(), 1);
    // 0 < (5 - 15 mod 2^256)
    assert_eq!(fast_state.stack.peek(0).unwrap(), U256::from(1));
}

#[test]
fn test_unmetered_execution_never_touches_gas() {
    let bytecode =
        [opcodes::PUSH1, 0x01, opcodes::PUSH1, 0x02, opcodes::ADD, opcodes::STOP];
    let mut state = MachineState::new(&bytecode, 7);
    let mut executor = Executor::new(schedule(), GasMode::Unmetered);
    // metered execution would run out after two pushes
    let result = executor.execute(&mut state).expect("unmetered execution failed");
    assert_eq!(state.gas_remaining, 7);
    assert_eq!(result.gas_remaining, 7);
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(3));
}

#[test]
fn test_stack_bound_holds_across_steps() {
    // repeatedly DUP1 until the capacity bound rejects the step
    let mut state = state_with_stack(&[opcodes::DUP1], 100_000, &[U256::from(1)]);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    let instruction = Instruction { opcode: opcodes::DUP1 };

    for _ in 0..1023 {
        state.pc = 0;
        executor.step(&mut state, &instruction).expect("step failed");
        assert!(state.stack.size() <= 1024);
    }
    assert_eq!(state.stack.size(), 1024);

    state.pc = 0;
    let before = state.clone();
    let result = executor.step(&mut state, &instruction);
    assert_eq!(result, Err(Error::StackOverflow { size: 1025 }));
    assert_eq!(state, before);
}

#[test]
fn test_implicit_stop_at_end_of_code() {
    let bytecode = [opcodes::PUSH1, 0x2a];
    let mut state = MachineState::new(&bytecode, 100);
    let mut executor = Executor::new(schedule(), GasMode::Metered);
    let result = executor.execute(&mut state).expect("execution failed");
    assert_eq!(result.steps, 1);
    assert_eq!(state.pc, 2);
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(0x2a));
}

#[test]
fn test_registered_rule_shadows_builtin() {
    fn forty_two(
        _: &Instruction,
        state: &mut MachineState,
    ) -> Result<(), Error> {
        state.stack.pop()?;
        state.stack.pop()?;
        state.stack.push(U256::from(42))?;
        state.pc += 1;
        Ok(())
    }

    let mut executor = Executor::new(schedule(), GasMode::Metered);
    executor.table.register(
        opcodes::ADD,
        FastPath {
            priority: 50,
            inputs: 2,
            outputs: 1,
            category: fusevm_vm::core::schedule::GasCategory::VeryLow,
            effect: forty_two,
        },
    );

    let mut state = state_with_stack(&[opcodes::ADD], 100, &[U256::from(1), U256::from(2)]);
    executor.step(&mut state, &Instruction { opcode: opcodes::ADD }).expect("step failed");
    assert_eq!(state.stack.peek(0).unwrap(), U256::from(42));
}
