//! Core machine model shared by the fused and baseline execution paths.

/// Machine state and gas charging
pub mod machine;

/// Opcode constants, the opcode info table, and decoded instructions
pub mod opcodes;

/// Versioned gas cost schedules
pub mod schedule;

/// The bounded EVM word stack
pub mod stack;
