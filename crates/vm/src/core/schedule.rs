use serde::{Deserialize, Serialize};

/// Ethereum hard forks in chronological order.
///
/// Each hard fork may change the gas cost table. A [`Schedule`] is resolved
/// from a hard fork once, before execution begins, and is never mutated
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum HardFork {
    /// Initial Ethereum release (July 2015)
    Frontier = 0,
    /// First planned hard fork (March 2016)
    Homestead = 1,
    /// First of Metropolis series (October 2017)
    Byzantium = 3,
    /// Second of Metropolis series (February 2019)
    Constantinople = 4,
    /// October 2019 fork
    Istanbul = 6,
    /// December 2020 fork
    Berlin = 8,
    /// August 2021 fork
    London = 9,
    /// The Merge (September 2022)
    Paris = 12,
    /// March 2023 fork - introduces PUSH0
    Shanghai = 13,
    /// March 2024 fork
    Cancun = 14,
    /// Latest hard fork (default)
    #[default]
    Latest = 255,
}

impl HardFork {
    /// Returns the effective hard fork, resolving `Latest` to the actual latest fork.
    #[inline]
    pub const fn effective(self) -> Self {
        match self {
            Self::Latest => Self::Cancun,
            other => other,
        }
    }

    /// Returns true if `self` is at or after `other`.
    #[inline]
    pub const fn is_active(self, other: Self) -> bool {
        self.effective() as u8 >= other as u8
    }
}

/// A named gas cost category.
///
/// Opcodes reference schedule entries through these stable keys rather than
/// hardcoded amounts, so the same evaluator serves every protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GasCategory {
    /// Free operations (STOP).
    Zero,
    /// Quick operations (POP, PC, PUSH0).
    Base,
    /// The cheapest priced tier (most stack and arithmetic operations).
    VeryLow,
    /// MUL, DIV, MOD and friends.
    Low,
}

/// The gas cost table for one protocol version.
///
/// Immutable once execution begins; shared by reference across all steps of
/// one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// The hard fork this table was resolved for.
    pub fork: HardFork,
    /// Cost of [`GasCategory::Zero`] operations.
    pub zero: u128,
    /// Cost of [`GasCategory::Base`] operations.
    pub base: u128,
    /// Cost of [`GasCategory::VeryLow`] operations.
    pub verylow: u128,
    /// Cost of [`GasCategory::Low`] operations.
    pub low: u128,
}

impl Schedule {
    /// Resolves the cost table for the given hard fork.
    ///
    /// The categories covered by this core have kept their Frontier pricing
    /// through every fork to date; forks still matter for opcode
    /// availability (PUSH0 activates at Shanghai).
    pub const fn for_fork(fork: HardFork) -> Self {
        Schedule { fork, zero: 0, base: 2, verylow: 3, low: 5 }
    }

    /// Pure cost lookup for a gas category. Total over [`GasCategory`];
    /// an unknown category is unrepresentable.
    #[inline]
    pub const fn cost(&self, category: GasCategory) -> u128 {
        match category {
            GasCategory::Zero => self.zero,
            GasCategory::Base => self.base,
            GasCategory::VeryLow => self.verylow,
            GasCategory::Low => self.low,
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::for_fork(HardFork::Latest)
    }
}
