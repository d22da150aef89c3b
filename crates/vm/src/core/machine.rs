use alloy::primitives::U256;

use super::stack::Stack;
use crate::error::Error;

/// Whether gas is actually checked and deducted during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasMode {
    /// Costs are checked against `gas_remaining` and deducted per step.
    #[default]
    Metered,
    /// Costs are computed for observability only; gas deficiency is never
    /// signaled and `gas_remaining` is never mutated.
    Unmetered,
}

/// The state of the machine between two instructions.
///
/// Owned exclusively by one executor; mutated only by opcode evaluators
/// (fused or baseline), never aliased concurrently. `Clone + PartialEq` so
/// the two execution strategies can be compared state-for-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    /// The current program counter, a byte offset into `bytecode`.
    pub pc: usize,

    /// The machine's word stack.
    pub stack: Stack,

    /// The amount of gas remaining for execution. Ignored (and untouched)
    /// under [`GasMode::Unmetered`].
    pub gas_remaining: u128,

    /// The compiled bytecode being executed. Immutable once execution begins.
    pub bytecode: Vec<u8>,
}

impl MachineState {
    /// Creates a fresh machine state positioned at the start of `bytecode`
    /// with the given gas allowance.
    pub fn new(bytecode: &[u8], gas_limit: u128) -> MachineState {
        MachineState {
            pc: 0,
            stack: Stack::new(),
            gas_remaining: gas_limit,
            bytecode: bytecode.to_vec(),
        }
    }

    /// Whether a charge of `amount` would succeed, without performing it.
    ///
    /// The side-effect-free half of the charge contract, used by fast-path
    /// applicability predicates.
    #[inline]
    pub const fn affordable(&self, amount: u128, mode: GasMode) -> bool {
        match mode {
            GasMode::Metered => amount <= self.gas_remaining,
            GasMode::Unmetered => true,
        }
    }

    /// Deduct `amount` gas units, all-or-nothing.
    ///
    /// Metered: fails with [`Error::OutOfGas`] iff `amount > gas_remaining`,
    /// leaving the state untouched; otherwise subtracts. Unmetered: always
    /// succeeds and deducts nothing.
    pub fn charge(&mut self, amount: u128, mode: GasMode) -> Result<(), Error> {
        match mode {
            GasMode::Metered => {
                if amount > self.gas_remaining {
                    return Err(Error::OutOfGas { needed: amount, remaining: self.gas_remaining });
                }
                self.gas_remaining -= amount;
                Ok(())
            }
            GasMode::Unmetered => Ok(()),
        }
    }

    /// Read `size` immediate bytes starting at `offset`, zero-padded past
    /// the end of code, as a big-endian word. Used by PUSH evaluators.
    pub fn read_immediate(&self, offset: usize, size: usize) -> U256 {
        let end_offset = offset.saturating_add(size).min(self.bytecode.len());
        let mut value = self.bytecode.get(offset..end_offset).unwrap_or(&[]).to_owned();
        if value.len() < size {
            value.resize(size, 0u8);
        }
        U256::from_be_slice(&value)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::{GasMode, MachineState};
    use crate::error::Error;

    #[test]
    fn test_charge_metered() {
        let mut state = MachineState::new(&[], 5);
        state.charge(3, GasMode::Metered).unwrap();
        assert_eq!(state.gas_remaining, 2);

        assert_eq!(
            state.charge(3, GasMode::Metered),
            Err(Error::OutOfGas { needed: 3, remaining: 2 })
        );
        // failed charge deducts nothing
        assert_eq!(state.gas_remaining, 2);

        state.charge(2, GasMode::Metered).unwrap();
        assert_eq!(state.gas_remaining, 0);
    }

    #[test]
    fn test_charge_unmetered() {
        let mut state = MachineState::new(&[], 1);
        state.charge(1000, GasMode::Unmetered).unwrap();
        assert_eq!(state.gas_remaining, 1);
        assert!(state.affordable(u128::MAX, GasMode::Unmetered));
        assert!(!state.affordable(2, GasMode::Metered));
    }

    #[test]
    fn test_read_immediate_pads_past_end_of_code() {
        let state = MachineState::new(&[0x60, 0x2a], 0);
        assert_eq!(state.read_immediate(1, 1), U256::from(0x2a));
        // PUSH2 at offset 0 would read one real byte and one padding byte
        assert_eq!(state.read_immediate(1, 2), U256::from(0x2a00));
        assert_eq!(state.read_immediate(5, 4), U256::ZERO);
    }
}
