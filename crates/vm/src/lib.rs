//! Fused fast-path execution core for an EVM bytecode interpreter.
//!
//! This crate recognizes common single-opcode execution steps and collapses
//! the multi-stage reference semantics (fetch, validate, charge gas, mutate
//! state, advance the program counter) into one atomic transition, while
//! staying behaviorally identical to the unoptimized baseline semantics.

/// Machine model: word stack, gas schedule, opcode table, machine state
pub mod core;

/// Error types for the execution core
pub mod error;

/// Execution: fused evaluators, baseline semantics, and the dispatch loop
pub mod exec;

pub use error::Error;
