use std::{collections::VecDeque, fmt::Display, hash::BuildHasher};

use alloy::primitives::U256;
use hashbrown::hash_map::DefaultHashBuilder;

use crate::error::Error;

/// The hard capacity of the EVM stack.
pub const STACK_LIMIT: usize = 1024;

/// The [`Stack`] struct represents the EVM stack.
/// It is a LIFO data structure holding a VecDeque of [`U256`] words, with a
/// hard capacity of [`STACK_LIMIT`] elements.
///
/// The front of the deque represents the top of the stack. Every mutating
/// operation validates its preconditions before touching the deque, so a
/// failed call leaves the stack exactly as it was.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Stack {
    stack: VecDeque<U256>,
}

impl Stack {
    /// Creates a new, empty [`Stack`].
    ///
    /// ```
    /// use fusevm_vm::core::stack::Stack;
    ///
    /// let stack = Stack::new();
    /// assert_eq!(stack.size(), 0);
    /// ```
    pub fn new() -> Stack {
        Stack { stack: VecDeque::with_capacity(16) }
    }

    /// Push a word onto the stack.
    ///
    /// Fails with [`Error::StackOverflow`] if the stack already holds
    /// [`STACK_LIMIT`] words.
    ///
    /// ```
    /// use fusevm_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("push failed");
    /// assert_eq!(stack.size(), 1);
    /// ```
    pub fn push(&mut self, value: U256) -> Result<(), Error> {
        if self.stack.len() >= STACK_LIMIT {
            return Err(Error::StackOverflow { size: self.stack.len() + 1 });
        }
        self.stack.push_front(value);
        Ok(())
    }

    /// Pop the top word off the stack.
    ///
    /// Fails with [`Error::StackUnderflow`] if the stack is empty.
    ///
    /// ```
    /// use fusevm_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x01)).expect("push failed");
    /// assert_eq!(stack.pop().expect("pop failed"), U256::from(0x01));
    /// ```
    pub fn pop(&mut self) -> Result<U256, Error> {
        self.stack.pop_front().ok_or(Error::StackUnderflow)
    }

    /// Peek at the word `index` positions from the top of the stack, without
    /// removing it. Zero-indexed: `peek(0)` is the top of the stack.
    ///
    /// Fails with [`Error::InvalidIndex`] if `index >= size`.
    pub fn peek(&self, index: usize) -> Result<U256, Error> {
        self.stack
            .get(index)
            .copied()
            .ok_or(Error::InvalidIndex { index, size: self.stack.len() })
    }

    /// Overwrite the word `index` positions from the top of the stack.
    /// Zero-indexed like [`Stack::peek`].
    ///
    /// Fails with [`Error::InvalidIndex`] if `index >= size`.
    pub fn set(&mut self, index: usize, value: U256) -> Result<(), Error> {
        let size = self.stack.len();
        match self.stack.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::InvalidIndex { index, size }),
        }
    }

    /// Swap the top word and the nth word on the stack.
    ///
    /// ```
    /// use fusevm_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("push failed");
    /// stack.push(U256::from(0x01)).expect("push failed");
    ///
    /// // stack is now [0x01, 0x00]
    /// stack.swap(1).expect("swap failed");
    ///
    /// // stack is now [0x00, 0x01]
    /// assert_eq!(stack.pop().expect("pop failed"), U256::from(0x00));
    /// assert_eq!(stack.pop().expect("pop failed"), U256::from(0x01));
    /// ```
    pub fn swap(&mut self, n: usize) -> Result<(), Error> {
        if self.stack.get(n).is_none() {
            return Err(Error::InvalidIndex { index: n, size: self.stack.len() });
        }
        self.stack.swap(0, n);
        Ok(())
    }

    /// Duplicate the nth word on the stack, pushing the copy on top.
    /// One-indexed: `dup(1)` duplicates the top of the stack.
    ///
    /// ```
    /// use fusevm_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("push failed");
    /// stack.dup(1).expect("dup failed");
    /// assert_eq!(stack.size(), 2);
    /// ```
    pub fn dup(&mut self, n: usize) -> Result<(), Error> {
        let value = self.peek(n - 1)?;
        self.push(value)
    }

    /// Get the size of the stack.
    pub fn size(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// A simple hash of the stack contents. Used to cheaply assert that two
    /// execution strategies arrived at the same stack.
    pub fn hash(&self) -> u64 {
        DefaultHashBuilder::default().hash_one(&self.stack)
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stack = String::new();
        for value in self.stack.iter() {
            stack.push_str(&format!("{value:#x}, "));
        }
        write!(f, "[{stack}]")
    }
}
