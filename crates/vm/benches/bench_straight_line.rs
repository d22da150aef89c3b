//! Benchmark comparing fused fast-path execution against the baseline
//! staged semantics on a straight-line program.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fusevm_vm::{
    core::{
        machine::{GasMode, MachineState},
        opcodes,
        schedule::{HardFork, Schedule},
    },
    exec::{fast::FastPathTable, Executor},
};

/// 2048 PUSH1/ADD pairs followed by STOP.
fn straight_line_program() -> Vec<u8> {
    let mut bytecode = vec![opcodes::PUSH1, 0x01];
    for _ in 0..2048 {
        bytecode.extend_from_slice(&[opcodes::PUSH1, 0x01, opcodes::ADD]);
    }
    bytecode.push(opcodes::STOP);
    bytecode
}

fn bench_straight_line(c: &mut Criterion) {
    let bytecode = straight_line_program();
    let schedule = Schedule::for_fork(HardFork::Latest);

    let mut group = c.benchmark_group("fusevm_vm");
    group.sample_size(200);

    group.bench_function(BenchmarkId::from_parameter("fused"), |b| {
        b.iter(|| {
            let mut state = MachineState::new(&bytecode, u128::MAX);
            let mut executor = Executor::new(schedule, GasMode::Metered);
            let result = executor.execute(&mut state).expect("execution failed");
            assert_eq!(result.baseline_steps, 1);
            result
        });
    });

    group.bench_function(BenchmarkId::from_parameter("baseline"), |b| {
        b.iter(|| {
            let mut state = MachineState::new(&bytecode, u128::MAX);
            let mut executor =
                Executor::with_table(schedule, GasMode::Metered, FastPathTable::new());
            let result = executor.execute(&mut state).expect("execution failed");
            assert_eq!(result.fast_steps, 0);
            result
        });
    });

    group.finish();
}

criterion_group!(benches, bench_straight_line);
criterion_main!(benches);
