//! Execution core errors

/// Terminal outcomes for a single execution step.
///
/// Every variant leaves the pre-step [`MachineState`](crate::core::machine::MachineState)
/// unchanged; the enclosing interpreter loop decides whether a failed step
/// halts or reverts its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The stack does not hold enough operands for the opcode.
    #[error("stack underflow")]
    StackUnderflow,
    /// The opcode's effect would grow the stack past its hard capacity.
    #[error("stack overflow: size {size} exceeds limit")]
    StackOverflow {
        /// The stack size the rejected operation would have produced.
        size: usize,
    },
    /// Metered execution with insufficient gas remaining for the step.
    #[error("out of gas: needed {needed}, have {remaining}")]
    OutOfGas {
        /// The gas amount the step would have charged.
        needed: u128,
        /// The gas remaining before the step.
        remaining: u128,
    },
    /// A DUP/SWAP depth or peek index beyond the current stack size.
    #[error("invalid stack index {index} for stack of size {size}")]
    InvalidIndex {
        /// The requested zero-indexed-from-top position.
        index: usize,
        /// The stack size at the time of the access.
        size: usize,
    },
    /// An opcode outside the representative instruction set.
    #[error("unsupported opcode: {0:#04x}")]
    UnsupportedOpcode(u8),
}
